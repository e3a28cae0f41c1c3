//! Directory-backed event source: one JSON array of records per property.

use std::path::PathBuf;

use propcal_core::source::filter_to_range;
use propcal_core::{CalendarError, CalendarResult, DateRange, EventSource, RawEventRecord};

#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: PathBuf) -> Self {
        DirSource { root }
    }

    /// Property ids map straight to file names, so only a safe alphabet is allowed.
    fn path_for(&self, property_id: &str) -> CalendarResult<PathBuf> {
        let valid = !property_id.is_empty()
            && property_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if !valid {
            return Err(CalendarError::InvalidPropertyId(property_id.to_string()));
        }
        Ok(self.root.join(format!("{}.json", property_id)))
    }
}

impl EventSource for DirSource {
    async fn fetch_events(
        &self,
        property_id: &str,
        range: DateRange,
    ) -> CalendarResult<Vec<RawEventRecord>> {
        let path = self.path_for(property_id)?;

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CalendarError::PropertyNotFound(property_id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let records: Vec<RawEventRecord> = serde_json::from_str(&content).map_err(|e| {
            CalendarError::Serialization(format!("{}: {}", path.display(), e))
        })?;

        Ok(filter_to_range(records, &range))
    }
}
