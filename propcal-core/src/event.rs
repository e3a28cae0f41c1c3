//! Event records as delivered by the data source, and their validated form.
//!
//! Sources hand over `RawEventRecord`s exactly as fetched. Only the
//! distribution engine turns them into `EventRecord`s, so a single bad record
//! can be reported and skipped without failing the whole batch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date_range::{DateRange, parse_date};
use crate::error::{CalendarError, CalendarResult};
use crate::kind::EventKind;

/// Arbitrary per-event data passed through to the rendering layer untouched.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// An event record in wire form. Every field is optional here; validation
/// decides what is actually required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEventRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub check_in: Option<String>,
    #[serde(default)]
    pub check_out: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

/// A validated event: dates parsed and `check_in <= check_out`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub title: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: String,
    pub metadata: Metadata,
}

impl RawEventRecord {
    /// Parse a raw record. Fails on a missing id or dates, an unparseable
    /// date, or a check-out before the check-in.
    pub fn validate(&self) -> CalendarResult<EventRecord> {
        let id = self
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(CalendarError::MissingField("id"))?;

        let check_in = parse_date(
            "check_in",
            self.check_in
                .as_deref()
                .ok_or(CalendarError::MissingField("check_in"))?,
        )?;
        let check_out = parse_date(
            "check_out",
            self.check_out
                .as_deref()
                .ok_or(CalendarError::MissingField("check_out"))?,
        )?;

        if check_in > check_out {
            return Err(CalendarError::InvertedRange {
                id: id.to_string(),
                check_in,
                check_out,
            });
        }

        let kind = self
            .kind
            .as_deref()
            .map(EventKind::from_tag)
            .unwrap_or_default();

        let title = self
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| kind.presentation().label.to_string());

        Ok(EventRecord {
            id: id.to_string(),
            kind,
            title,
            check_in,
            check_out,
            status: self.status.clone().unwrap_or_default(),
            metadata: self.metadata.clone(),
        })
    }

    /// Dates of this record if both parse and are in order.
    pub fn range(&self) -> Option<DateRange> {
        let check_in = parse_date("check_in", self.check_in.as_deref()?).ok()?;
        let check_out = parse_date("check_out", self.check_out.as_deref()?).ok()?;
        DateRange::new(check_in, check_out)
    }
}

impl EventRecord {
    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.check_in,
            end: self.check_out,
        }
    }

    /// Number of calendar days the event covers, counting both ends.
    pub fn days(&self) -> i64 {
        self.range().days()
    }
}
