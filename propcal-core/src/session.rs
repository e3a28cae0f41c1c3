//! Per-view calendar state.
//!
//! A `CalendarSession` belongs to exactly one view. Every navigation issues a
//! new `LoadRequest` tagged with an increasing generation; results are only
//! accepted for the newest generation, so a slow response for a month the
//! user already left can never overwrite what is on screen.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::date_range::DateRange;
use crate::distribute::{Distribution, RecordWarning, distribute};
use crate::error::{CalendarError, CalendarResult};
use crate::event::{EventRecord, RawEventRecord};
use crate::grid::{CalendarWindow, build_window, shift_date_by_months, window_range};
use crate::layout::{PlacedEvent, month_layout};
use crate::rows::RowAssignment;
use crate::source::EventSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Previous,
    Next,
    /// Jump to the month containing the given date.
    To(NaiveDate),
}

/// Everything needed to fetch one window's events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub generation: u64,
    pub property_id: String,
    pub anchor: NaiveDate,
    pub range: DateRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// A newer request was issued after this one; the result was dropped.
    Stale,
}

/// A fully populated window ready for the rendering layer.
#[derive(Debug, Serialize)]
pub struct RenderedCalendar {
    pub property_id: String,
    pub generation: u64,
    pub window: CalendarWindow,
    pub rows: Vec<RowAssignment>,
    /// Placed event bars per month, in window order.
    pub layout: Vec<Vec<PlacedEvent>>,
    pub events: Vec<EventRecord>,
    /// Records exactly as fetched, for detail views.
    #[serde(skip)]
    pub records: Vec<RawEventRecord>,
    #[serde(skip)]
    sources: HashMap<String, usize>,
    pub warnings: Vec<RecordWarning>,
}

impl RenderedCalendar {
    /// Build, distribute and lay out one window.
    pub fn build(
        property_id: &str,
        generation: u64,
        anchor: NaiveDate,
        today: NaiveDate,
        records: Vec<RawEventRecord>,
    ) -> Self {
        let Distribution {
            window,
            rows,
            events,
            sources,
            warnings,
        } = distribute(build_window(anchor, today), &records);

        let layout = window
            .months
            .iter()
            .zip(&rows)
            .map(|(month, month_rows)| month_layout(month, &events, month_rows))
            .collect();

        RenderedCalendar {
            property_id: property_id.to_string(),
            generation,
            window,
            rows,
            layout,
            events,
            records,
            sources,
            warnings,
        }
    }

    /// The record for `event_id` exactly as the source returned it.
    ///
    /// For an event on the grid this is the record it was built from. An id
    /// that was never accepted resolves to the first record carrying it, so
    /// skipped records can still be inspected.
    pub fn event_detail(&self, event_id: &str) -> Option<&RawEventRecord> {
        match self.sources.get(event_id) {
            Some(&index) => self.records.get(index),
            None => self
                .records
                .iter()
                .find(|r| r.id.as_deref().map(str::trim) == Some(event_id)),
        }
    }
}

/// Explicit calendar state owned by a single view.
#[derive(Debug)]
pub struct CalendarSession {
    property_id: String,
    anchor: NaiveDate,
    generation: u64,
    current: Option<Arc<RenderedCalendar>>,
}

impl CalendarSession {
    pub fn new(property_id: &str, anchor: NaiveDate) -> Self {
        CalendarSession {
            property_id: property_id.to_string(),
            anchor,
            generation: 0,
            current: None,
        }
    }

    pub fn property_id(&self) -> &str {
        &self.property_id
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    /// Generation of the newest request issued.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The last window that was successfully applied.
    pub fn current(&self) -> Option<&RenderedCalendar> {
        self.current.as_deref()
    }

    /// Shared handle to the last applied window.
    pub fn current_shared(&self) -> Option<Arc<RenderedCalendar>> {
        self.current.clone()
    }

    /// Request the current anchor again (e.g. after a failed fetch).
    pub fn reload(&mut self) -> LoadRequest {
        self.generation += 1;
        LoadRequest {
            generation: self.generation,
            property_id: self.property_id.clone(),
            anchor: self.anchor,
            range: window_range(self.anchor),
        }
    }

    pub fn navigate(&mut self, nav: Navigation) -> LoadRequest {
        self.anchor = match nav {
            Navigation::Previous => shift_date_by_months(self.anchor, -1),
            Navigation::Next => shift_date_by_months(self.anchor, 1),
            Navigation::To(date) => date,
        };
        self.reload()
    }

    /// Show a different property. The previous render stays visible until
    /// the new one is applied.
    pub fn switch_property(&mut self, property_id: &str) -> LoadRequest {
        self.property_id = property_id.to_string();
        self.reload()
    }

    pub fn is_current(&self, request: &LoadRequest) -> bool {
        request.generation == self.generation
    }

    /// Accept the fetched records for `request` if it is still the newest.
    pub fn apply(
        &mut self,
        request: &LoadRequest,
        records: Vec<RawEventRecord>,
        today: NaiveDate,
    ) -> ApplyOutcome {
        if !self.is_current(request) {
            debug!(
                "Dropping stale calendar load (generation {} < {})",
                request.generation, self.generation
            );
            return ApplyOutcome::Stale;
        }

        self.current = Some(Arc::new(RenderedCalendar::build(
            &request.property_id,
            request.generation,
            request.anchor,
            today,
            records,
        )));
        ApplyOutcome::Applied
    }

    /// Event detail from the applied window, unchanged from the fetch.
    pub fn event_detail(&self, event_id: &str) -> Option<&RawEventRecord> {
        self.current.as_deref()?.event_detail(event_id)
    }
}

/// Fetch `request`'s records with a timeout.
pub async fn fetch_for<S: EventSource>(
    source: &S,
    request: &LoadRequest,
    timeout: Duration,
) -> CalendarResult<Vec<RawEventRecord>> {
    tokio::time::timeout(
        timeout,
        source.fetch_events(&request.property_id, request.range),
    )
    .await
    .map_err(|_| CalendarError::FetchTimeout(timeout))?
}

/// One-shot load without session bookkeeping.
pub async fn load_calendar<S: EventSource>(
    source: &S,
    property_id: &str,
    anchor: NaiveDate,
    today: NaiveDate,
    timeout: Duration,
) -> CalendarResult<RenderedCalendar> {
    let request = CalendarSession::new(property_id, anchor).reload();
    let records = fetch_for(source, &request, timeout).await?;
    Ok(RenderedCalendar::build(
        property_id,
        request.generation,
        anchor,
        today,
        records,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn raw(id: &str, check_in: &str, check_out: &str) -> RawEventRecord {
        RawEventRecord {
            id: Some(id.into()),
            kind: Some("reservation".into()),
            check_in: Some(check_in.into()),
            check_out: Some(check_out.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_navigation_moves_anchor_and_bumps_generation() {
        let mut session = CalendarSession::new("villa", d("2025-01-31"));

        let next = session.navigate(Navigation::Next);
        assert_eq!(next.anchor, d("2025-02-28"));
        assert_eq!(next.generation, 1);
        assert_eq!(next.range, window_range(d("2025-02-28")));

        let prev = session.navigate(Navigation::Previous);
        assert_eq!(prev.anchor, d("2025-01-28"));
        assert_eq!(prev.generation, 2);

        let jump = session.navigate(Navigation::To(d("2025-12-20")));
        assert_eq!(session.anchor(), d("2025-12-20"));
        assert_eq!(jump.generation, 3);
    }

    #[test]
    fn test_last_request_wins_regardless_of_completion_order() {
        let mut session = CalendarSession::new("villa", d("2025-08-15"));
        let first = session.navigate(Navigation::Next);
        let second = session.navigate(Navigation::Next);

        let today = d("2025-08-15");
        assert_eq!(
            session.apply(&second, vec![raw("b", "2025-10-01", "2025-10-02")], today),
            ApplyOutcome::Applied
        );
        // The older request finishing late is discarded.
        assert_eq!(
            session.apply(&first, vec![raw("a", "2025-09-01", "2025-09-02")], today),
            ApplyOutcome::Stale
        );

        let current = session.current().unwrap();
        assert_eq!(current.generation, second.generation);
        assert_eq!(current.window.anchor, d("2025-10-15"));
        assert!(session.event_detail("b").is_some());
        assert!(session.event_detail("a").is_none());
    }

    #[test]
    fn test_switch_property_keeps_previous_render_until_applied() {
        let mut session = CalendarSession::new("villa", d("2025-08-15"));
        let first = session.reload();
        session.apply(&first, vec![raw("v1", "2025-08-01", "2025-08-02")], d("2025-08-15"));

        let switch = session.switch_property("cabin");
        assert_eq!(switch.property_id, "cabin");
        assert_eq!(session.current().unwrap().property_id, "villa");

        session.apply(&switch, vec![], d("2025-08-15"));
        let current = session.current().unwrap();
        assert_eq!(current.property_id, "cabin");
        assert!(current.events.is_empty());
    }

    #[test]
    fn test_rendered_calendar_layout_matches_months() {
        let rendered = RenderedCalendar::build(
            "villa",
            1,
            d("2025-08-15"),
            d("2025-08-15"),
            vec![
                raw("A", "2025-08-01", "2025-08-03"),
                raw("B", "2025-08-02", "2025-08-04"),
                raw("bad", "2025-08-09", "2025-08-01"),
            ],
        );

        assert_eq!(rendered.layout.len(), rendered.window.months.len());
        assert_eq!(rendered.warnings.len(), 1);

        let august = &rendered.layout[3];
        let rows: Vec<_> = august.iter().map(|p| (p.span.event_id.as_str(), p.row)).collect();
        assert_eq!(rows, vec![("A", 0), ("B", 1)]);

        // The malformed record is still available verbatim for detail views.
        let detail = rendered.event_detail("bad").unwrap();
        assert_eq!(detail.check_in.as_deref(), Some("2025-08-09"));
    }

    #[test]
    fn test_event_detail_is_the_rendered_record() {
        let broken = RawEventRecord {
            title: Some("broken".into()),
            ..raw("X", "nope", "2025-08-02")
        };
        let real = RawEventRecord {
            title: Some("real".into()),
            ..raw("X", "2025-08-01", "2025-08-02")
        };
        let rendered = RenderedCalendar::build(
            "villa",
            1,
            d("2025-08-15"),
            d("2025-08-15"),
            vec![broken, real],
        );

        assert_eq!(rendered.events[0].title, "real");
        let detail = rendered.event_detail("X").unwrap();
        assert_eq!(detail.title.as_deref(), Some("real"));
        assert_eq!(detail.check_in.as_deref(), Some("2025-08-01"));
    }

    struct Hanging;

    impl EventSource for Hanging {
        async fn fetch_events(
            &self,
            _property_id: &str,
            _range: DateRange,
        ) -> CalendarResult<Vec<RawEventRecord>> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sub_second_timeout_is_reported_exactly() {
        let request = CalendarSession::new("villa", d("2025-08-15")).reload();
        let err = fetch_for(&Hanging, &request, Duration::from_millis(250))
            .await
            .unwrap_err();

        assert!(matches!(err, CalendarError::FetchTimeout(t) if t == Duration::from_millis(250)));
        assert_eq!(err.to_string(), "Fetch timed out after 250ms");
    }

    #[tokio::test]
    async fn test_load_calendar_from_source() {
        let source = MemorySource::new()
            .with_property("villa", vec![raw("A", "2025-08-01", "2025-08-03")]);

        let rendered = load_calendar(
            &source,
            "villa",
            d("2025-08-15"),
            d("2025-08-15"),
            Duration::from_secs(1),
        )
        .await
        .unwrap();
        assert_eq!(rendered.events.len(), 1);

        let err = load_calendar(
            &source,
            "cabin",
            d("2025-08-15"),
            d("2025-08-15"),
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();
        assert!(err.is_fetch_error());
    }
}
