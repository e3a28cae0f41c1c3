//! Error types for the propcal engine.

use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while loading or laying out a calendar.
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Event is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Invalid {field} date '{value}'. Expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    #[error("Event '{id}' checks out before it checks in ({check_in} > {check_out})")]
    InvertedRange {
        id: String,
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("Duplicate event id '{0}'")]
    DuplicateId(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Fetch timed out after {0:?}")]
    FetchTimeout(Duration),

    #[error("Property not found: {0}")]
    PropertyNotFound(String),

    #[error("Invalid property id '{0}'")]
    InvalidPropertyId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CalendarError {
    /// Whether this error came from the data source rather than from a single bad record.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            CalendarError::Fetch(_)
                | CalendarError::FetchTimeout(_)
                | CalendarError::PropertyNotFound(_)
                | CalendarError::InvalidPropertyId(_)
                | CalendarError::Io(_)
                | CalendarError::Serialization(_)
        )
    }
}

/// Result type alias for propcal operations.
pub type CalendarResult<T> = Result<T, CalendarError>;
