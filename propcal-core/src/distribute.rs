//! Event distribution: places events onto the day cells of a window and
//! packs them into rows per month.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::CalendarError;
use crate::event::{EventRecord, RawEventRecord};
use crate::grid::CalendarWindow;
use crate::kind::EventKind;
use crate::rows::{RowAssignment, pack_rows};

/// The slice of an event that falls on a single day cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventFragment {
    pub event_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub status: String,
    pub is_start: bool,
    pub is_end: bool,
    pub is_continuation: bool,
}

/// A record that was skipped during distribution.
#[derive(Debug, Serialize)]
pub struct RecordWarning {
    /// Position of the record in the input batch.
    pub index: usize,
    pub event_id: Option<String>,
    pub message: String,
    #[serde(skip)]
    pub error: CalendarError,
}

/// Result of distributing a batch of records over a window.
#[derive(Debug, Serialize)]
pub struct Distribution {
    pub window: CalendarWindow,
    /// One assignment per month, in window order.
    pub rows: Vec<RowAssignment>,
    /// Accepted events in distribution order.
    pub events: Vec<EventRecord>,
    /// Input position of the record each accepted event was built from.
    #[serde(skip)]
    pub sources: HashMap<String, usize>,
    pub warnings: Vec<RecordWarning>,
}

impl EventFragment {
    fn new(event: &EventRecord, date: chrono::NaiveDate) -> Self {
        let is_start = date == event.check_in;
        let is_end = date == event.check_out;
        EventFragment {
            event_id: event.id.clone(),
            title: event.title.clone(),
            kind: event.kind.clone(),
            status: event.status.clone(),
            is_start,
            is_end,
            is_continuation: !is_start && !is_end,
        }
    }
}

/// Validate `records` and lay them out over `window`.
///
/// Malformed records are skipped and reported in `warnings`; they never stop
/// the remaining records from being placed. Events outside the window are
/// accepted but produce no fragments.
pub fn distribute(mut window: CalendarWindow, records: &[RawEventRecord]) -> Distribution {
    let Validated {
        mut events,
        sources,
        warnings,
    } = validate_records(records);

    // start asc, longest first on ties, id for full determinism
    events.sort_by(|a, b| {
        a.check_in
            .cmp(&b.check_in)
            .then_with(|| b.days().cmp(&a.days()))
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut fragments = 0usize;
    for month in &mut window.months {
        let shown = month.displayed_range();
        for event in &events {
            let Some(visible) = event.range().intersect(&shown) else {
                continue;
            };
            for date in visible.iter_days() {
                if let Some(cell) = shown.offset_of(date).and_then(|i| month.days.get_mut(i)) {
                    cell.events.push(EventFragment::new(event, date));
                    fragments += 1;
                }
            }
        }
    }

    let rows = window
        .months
        .iter()
        .map(|month| pack_rows(month, &events))
        .collect();

    debug!(
        "Distributed {} events ({} fragments, {} skipped) over window anchored at {}",
        events.len(),
        fragments,
        warnings.len(),
        window.anchor
    );

    Distribution {
        window,
        rows,
        events,
        sources,
        warnings,
    }
}

struct Validated {
    events: Vec<EventRecord>,
    sources: HashMap<String, usize>,
    warnings: Vec<RecordWarning>,
}

/// The first valid record for an id wins; malformed records never claim an id.
fn validate_records(records: &[RawEventRecord]) -> Validated {
    let mut events = Vec::with_capacity(records.len());
    let mut sources = HashMap::new();
    let mut warnings = Vec::new();

    for (index, raw) in records.iter().enumerate() {
        let result = raw.validate().and_then(|event| {
            if sources.contains_key(&event.id) {
                Err(CalendarError::DuplicateId(event.id))
            } else {
                sources.insert(event.id.clone(), index);
                Ok(event)
            }
        });

        match result {
            Ok(event) => events.push(event),
            Err(error) => {
                warn!(
                    "Skipping event record #{} ({}): {}",
                    index,
                    raw.id.as_deref().unwrap_or("<no id>"),
                    error
                );
                warnings.push(RecordWarning {
                    index,
                    event_id: raw.id.clone(),
                    message: error.to_string(),
                    error,
                });
            }
        }
    }

    Validated {
        events,
        sources,
        warnings,
    }
}

impl Distribution {
    /// Row assignment for a zero-based (year, month).
    pub fn rows_for(&self, year: i32, month: u32) -> Option<&RowAssignment> {
        self.rows
            .iter()
            .find(|r| r.year == year && r.month == month)
    }

    /// Input position of the record that was accepted for `event_id`.
    pub fn source_index(&self, event_id: &str) -> Option<usize> {
        self.sources.get(event_id).copied()
    }
}
