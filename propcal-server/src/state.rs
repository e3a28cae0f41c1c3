use std::sync::Arc;

use propcal_core::{ObservedSource, TracingObserver};

use crate::config::ServerConfig;
use crate::source::DirSource;

pub type Source = ObservedSource<DirSource, TracingObserver>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<Source>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let source = ObservedSource::new(DirSource::new(config.data_path()), TracingObserver);
        AppState {
            source: Arc::new(source),
            config: Arc::new(config),
        }
    }
}
