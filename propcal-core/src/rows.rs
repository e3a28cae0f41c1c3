//! Row packing: assigns overlapping events to separate visual rows.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::date_range::DateRange;
use crate::event::EventRecord;
use crate::grid::MonthGrid;

/// Row index per event for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowAssignment {
    pub year: i32,
    /// Zero-based month (0 = January).
    pub month: u32,
    pub rows: BTreeMap<String, usize>,
    /// Number of rows in use.
    pub row_count: usize,
}

impl RowAssignment {
    pub fn row_of(&self, event_id: &str) -> Option<usize> {
        self.rows.get(event_id).copied()
    }
}

/// Greedy first-fit packing of the events visible in `month`.
///
/// Event ranges are clamped to the month's displayed span, ordered by start
/// (longest first on ties, then id), and each takes the lowest row whose
/// occupant has already ended.
pub fn pack_rows(month: &MonthGrid, events: &[EventRecord]) -> RowAssignment {
    let shown = month.displayed_range();

    let mut visible: Vec<(&str, DateRange)> = events
        .iter()
        .filter_map(|e| e.range().intersect(&shown).map(|r| (e.id.as_str(), r)))
        .collect();

    visible.sort_by(|(a_id, a), (b_id, b)| {
        a.start
            .cmp(&b.start)
            .then_with(|| b.days().cmp(&a.days()))
            .then_with(|| a_id.cmp(b_id))
    });

    // Last occupied date per row. Starts are sorted, so a row is free for an
    // event's whole span exactly when its occupant ended before the event starts.
    let mut row_ends: Vec<chrono::NaiveDate> = Vec::new();
    let mut rows = BTreeMap::new();

    for (id, range) in visible {
        let row = match row_ends.iter().position(|end| *end < range.start) {
            Some(row) => row,
            None => {
                row_ends.push(range.end);
                row_ends.len() - 1
            }
        };
        row_ends[row] = range.end;
        rows.insert(id.to_string(), row);
    }

    RowAssignment {
        year: month.year,
        month: month.month,
        rows,
        row_count: row_ends.len(),
    }
}
