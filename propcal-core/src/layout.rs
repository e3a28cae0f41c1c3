//! Grid coordinates for event bars.
//!
//! Cell positions are 1-based grid lines over the 42 cells of a month, so
//! they can be used directly with exclusive-end grid systems such as CSS grid.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::constants::DAYS_PER_WEEK;
use crate::event::EventRecord;
use crate::grid::MonthGrid;
use crate::kind::Presentation;
use crate::rows::RowAssignment;

/// Where an event sits within one month's real (non-padding) days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSpan {
    pub event_id: String,
    pub display_start: NaiveDate,
    pub display_end: NaiveDate,
    /// 1-based cell line where the bar starts.
    pub start_cell: u32,
    /// Cell line one past the last covered cell.
    pub end_cell_exclusive: u32,
    /// The event's real check-in falls in this month.
    pub is_check_in_in_month: bool,
    /// The event's real check-out falls in this month.
    pub is_check_out_in_month: bool,
}

/// Portion of a span that fits on one week row of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekSegment {
    /// 0-based week row within the month grid.
    pub week: u32,
    /// 1-based column line (1 = Sunday).
    pub start_column: u32,
    pub end_column_exclusive: u32,
    /// Draw the check-in edge (partial first day) on this segment.
    pub rounded_start: bool,
    /// Draw the check-out edge (partial last day) on this segment.
    pub rounded_end: bool,
}

/// A span plus everything the renderer needs to draw it.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedEvent {
    pub span: EventSpan,
    pub row: usize,
    pub segments: Vec<WeekSegment>,
    pub presentation: Presentation,
}

/// Clamp `event` to the real days of `month` and compute its cell span.
/// Returns None when the event does not touch the month.
pub fn event_span(month: &MonthGrid, event: &EventRecord) -> Option<EventSpan> {
    let visible = event.range().intersect(&month.month_range())?;
    let offset = month.first_weekday_offset;

    Some(EventSpan {
        event_id: event.id.clone(),
        display_start: visible.start,
        display_end: visible.end,
        start_cell: offset + visible.start.day(),
        end_cell_exclusive: offset + visible.end.day() + 1,
        is_check_in_in_month: visible.start == event.check_in,
        is_check_out_in_month: visible.end == event.check_out,
    })
}

impl EventSpan {
    /// Number of cells covered.
    pub fn len(&self) -> u32 {
        self.end_cell_exclusive - self.start_cell
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Split the span at week boundaries.
    pub fn week_segments(&self) -> Vec<WeekSegment> {
        let per_week = DAYS_PER_WEEK as u32;
        let first = self.start_cell - 1;
        let last = self.end_cell_exclusive - 2;

        (first / per_week..=last / per_week)
            .map(|week| {
                let row_first = week * per_week;
                let row_last = row_first + per_week - 1;
                let seg_first = first.max(row_first);
                let seg_last = last.min(row_last);

                WeekSegment {
                    week,
                    start_column: seg_first - row_first + 1,
                    end_column_exclusive: seg_last - row_first + 2,
                    rounded_start: self.is_check_in_in_month && seg_first == first,
                    rounded_end: self.is_check_out_in_month && seg_last == last,
                }
            })
            .collect()
    }
}

/// Place every event that touches `month`, using its packed row.
///
/// Events are returned in row order, then by start.
pub fn month_layout(
    month: &MonthGrid,
    events: &[EventRecord],
    rows: &RowAssignment,
) -> Vec<PlacedEvent> {
    let mut placed: Vec<PlacedEvent> = events
        .iter()
        .filter_map(|event| {
            let span = event_span(month, event)?;
            let row = rows.row_of(&event.id)?;
            Some(PlacedEvent {
                segments: span.week_segments(),
                span,
                row,
                presentation: event.kind.presentation(),
            })
        })
        .collect();

    placed.sort_by(|a, b| {
        a.row
            .cmp(&b.row)
            .then_with(|| a.span.start_cell.cmp(&b.span.start_cell))
    });
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RawEventRecord;
    use crate::grid::build_month;
    use crate::rows::pack_rows;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn event(id: &str, check_in: &str, check_out: &str) -> EventRecord {
        RawEventRecord {
            id: Some(id.into()),
            kind: Some("reservation".into()),
            check_in: Some(check_in.into()),
            check_out: Some(check_out.into()),
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    // August 2025 starts on a Friday: offset 5.
    fn august() -> MonthGrid {
        build_month(2025, 7, d("2025-08-01"))
    }

    #[test]
    fn test_span_inside_month() {
        let span = event_span(&august(), &event("A", "2025-08-01", "2025-08-03")).unwrap();

        assert_eq!(span.start_cell, 6);
        assert_eq!(span.end_cell_exclusive, 9);
        assert_eq!(span.len(), 3);
        assert!(span.is_check_in_in_month);
        assert!(span.is_check_out_in_month);
    }

    #[test]
    fn test_span_clamped_to_month_edges() {
        let span = event_span(&august(), &event("X", "2025-07-25", "2025-09-03")).unwrap();

        assert_eq!(span.display_start, d("2025-08-01"));
        assert_eq!(span.display_end, d("2025-08-31"));
        assert_eq!(span.start_cell, 6);
        assert_eq!(span.end_cell_exclusive, 5 + 31 + 1);
        assert!(!span.is_check_in_in_month);
        assert!(!span.is_check_out_in_month);
    }

    #[test]
    fn test_padding_only_event_has_no_span() {
        assert!(event_span(&august(), &event("P", "2025-07-27", "2025-07-31")).is_none());
        assert!(event_span(&august(), &event("Q", "2025-09-01", "2025-09-02")).is_none());
    }

    #[test]
    fn test_week_segments_split_at_saturday() {
        // Aug 1 (Fri) .. Aug 12 (Tue): cells 6..=17 -> weeks 0, 1, 2
        let span = event_span(&august(), &event("A", "2025-08-01", "2025-08-12")).unwrap();
        let segments = span.week_segments();

        assert_eq!(
            segments,
            vec![
                WeekSegment {
                    week: 0,
                    start_column: 6,
                    end_column_exclusive: 8,
                    rounded_start: true,
                    rounded_end: false,
                },
                WeekSegment {
                    week: 1,
                    start_column: 1,
                    end_column_exclusive: 8,
                    rounded_start: false,
                    rounded_end: false,
                },
                WeekSegment {
                    week: 2,
                    start_column: 1,
                    end_column_exclusive: 4,
                    rounded_start: false,
                    rounded_end: true,
                },
            ]
        );
    }

    #[test]
    fn test_clamped_span_has_square_edges() {
        let span = event_span(&august(), &event("X", "2025-08-30", "2025-09-02")).unwrap();
        let segments = span.week_segments();

        assert_eq!(segments.len(), 2);
        assert!(segments[0].rounded_start);
        assert!(!segments[1].rounded_end);
        assert_eq!(segments[1].end_column_exclusive, 2);
    }

    #[test]
    fn test_single_day_segment() {
        let span = event_span(&august(), &event("S", "2025-08-09", "2025-08-09")).unwrap();
        let segments = span.week_segments();

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start_column, 7);
        assert_eq!(segments[0].end_column_exclusive, 8);
        assert!(segments[0].rounded_start && segments[0].rounded_end);
    }

    #[test]
    fn test_month_layout_uses_rows() {
        let month = august();
        let events = vec![
            event("A", "2025-08-01", "2025-08-03"),
            event("B", "2025-08-02", "2025-08-04"),
            event("P", "2025-07-28", "2025-07-29"),
        ];
        let rows = pack_rows(&month, &events);
        let placed = month_layout(&month, &events, &rows);

        let ids: Vec<_> = placed.iter().map(|p| (p.span.event_id.as_str(), p.row)).collect();
        // P only touches padding days, so it gets a row but no in-month span
        assert_eq!(ids, vec![("A", 0), ("B", 1)]);
        assert_eq!(rows.row_of("P"), Some(0));
        assert_eq!(placed[0].presentation.css_class, "event-reservation");
    }
}
