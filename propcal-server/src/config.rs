//! Server configuration.
//!
//! Layered as: built-in defaults, then ~/.config/propcal/config.toml (if
//! present), then `PROPCAL_*` environment variables.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File, Map};
use propcal_core::constants::DEFAULT_FETCH_TIMEOUT_SECS;
use serde::Deserialize;

static DEFAULT_DATA_DIR: &str = "~/propcal";
const DEFAULT_PORT: u16 = 4096;

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding one `<property_id>.json` event file per property.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default)]
    pub json_logs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            json_logs: false,
        }
    }
}

impl ServerConfig {
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("propcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from an explicit config file. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::load_layered(path, None)
    }

    /// `env` replaces the process environment as the `PROPCAL_*` source when given.
    fn load_layered(path: &Path, env: Option<Map<String, String>>) -> Result<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("PROPCAL")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .with_context(|| format!("Could not read config from {}", path.display()))?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// `data_dir` with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned())
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            ServerConfig::load_layered(&dir.path().join("absent.toml"), env(&[])).unwrap();

        assert_eq!(config.port, 4096);
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert!(!config.json_logs);
    }

    #[test]
    fn test_file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "port = 8080\ndata_dir = \"/srv/propcal\"\nfetch_timeout_secs = 3\njson_logs = true\n",
        )
        .unwrap();

        let config = ServerConfig::load_layered(&path, env(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_path(), PathBuf::from("/srv/propcal"));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(3));
        assert!(config.json_logs);
        assert_eq!(config.addr().port(), 8080);
    }

    #[test]
    fn test_invalid_value_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "port = \"not a port\"\n").unwrap();

        assert!(ServerConfig::load_layered(&path, env(&[])).is_err());
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "port = 8080\nfetch_timeout_secs = 3\n").unwrap();

        let config = ServerConfig::load_layered(
            &path,
            env(&[
                ("PROPCAL_PORT", "9090"),
                ("PROPCAL_JSON_LOGS", "true"),
                ("PROPCAL_HOST", "0.0.0.0"),
                ("PROPCAL_DATA_DIR", "/var/lib/propcal"),
            ]),
        )
        .unwrap();

        assert_eq!(config.port, 9090);
        assert!(config.json_logs);
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.data_path(), PathBuf::from("/var/lib/propcal"));
        // Untouched by the environment, so the file value stands.
        assert_eq!(config.fetch_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_environment_value_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert!(ServerConfig::load_layered(&path, env(&[("PROPCAL_PORT", "70000")])).is_err());
    }

    #[test]
    fn test_tilde_is_expanded() {
        let config = ServerConfig::default();
        assert!(!config.data_path().to_string_lossy().starts_with('~'));
    }
}
