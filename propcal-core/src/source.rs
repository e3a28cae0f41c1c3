//! The event data boundary.
//!
//! The engine never talks to a task tracker or the network itself. It asks an
//! `EventSource` for the raw records of one property within a date range, and
//! anything that wants to watch those calls wraps the source in an
//! `ObservedSource` instead of patching it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::date_range::DateRange;
use crate::error::{CalendarError, CalendarResult};
use crate::event::RawEventRecord;

/// Supplies raw event records for a property.
pub trait EventSource: Send + Sync {
    fn fetch_events(
        &self,
        property_id: &str,
        range: DateRange,
    ) -> impl Future<Output = CalendarResult<Vec<RawEventRecord>>> + Send;
}

impl<S: EventSource> EventSource for Arc<S> {
    fn fetch_events(
        &self,
        property_id: &str,
        range: DateRange,
    ) -> impl Future<Output = CalendarResult<Vec<RawEventRecord>>> + Send {
        (**self).fetch_events(property_id, range)
    }
}

/// In-memory source keyed by property id.
///
/// Records whose dates parse and fall entirely outside the requested range
/// are filtered out; anything unparseable is returned so the engine can
/// report it.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    properties: HashMap<String, Vec<RawEventRecord>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, property_id: &str, records: Vec<RawEventRecord>) -> Self {
        self.insert(property_id, records);
        self
    }

    pub fn insert(&mut self, property_id: &str, records: Vec<RawEventRecord>) {
        self.properties.insert(property_id.to_string(), records);
    }
}

/// Keep records that overlap `range`, plus any whose dates cannot be read.
pub fn filter_to_range(records: Vec<RawEventRecord>, range: &DateRange) -> Vec<RawEventRecord> {
    records
        .into_iter()
        .filter(|r| r.range().is_none_or(|own| own.overlaps(range)))
        .collect()
}

impl EventSource for MemorySource {
    async fn fetch_events(
        &self,
        property_id: &str,
        range: DateRange,
    ) -> CalendarResult<Vec<RawEventRecord>> {
        let records = self
            .properties
            .get(property_id)
            .cloned()
            .ok_or_else(|| CalendarError::PropertyNotFound(property_id.to_string()))?;
        Ok(filter_to_range(records, &range))
    }
}

/// Receives notifications about every fetch made through an `ObservedSource`.
pub trait FetchObserver: Send + Sync {
    fn on_request(&self, _property_id: &str, _range: &DateRange) {}

    fn on_response(&self, _property_id: &str, _records: &[RawEventRecord], _elapsed: Duration) {}

    fn on_error(&self, _property_id: &str, _error: &CalendarError, _elapsed: Duration) {}
}

/// Logs fetches through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl FetchObserver for TracingObserver {
    fn on_request(&self, property_id: &str, range: &DateRange) {
        debug!("Fetching events for {} in {}", property_id, range);
    }

    fn on_response(&self, property_id: &str, records: &[RawEventRecord], elapsed: Duration) {
        debug!(
            "Fetched {} events for {} in {}ms",
            records.len(),
            property_id,
            elapsed.as_millis()
        );
    }

    fn on_error(&self, property_id: &str, error: &CalendarError, elapsed: Duration) {
        warn!(
            "Fetching events for {} failed after {}ms: {}",
            property_id,
            elapsed.as_millis(),
            error
        );
    }
}

/// Wraps a source and reports each call to an observer.
/// Records pass through unchanged.
#[derive(Debug, Clone)]
pub struct ObservedSource<S, O> {
    inner: S,
    observer: O,
}

impl<S: EventSource, O: FetchObserver> ObservedSource<S, O> {
    pub fn new(inner: S, observer: O) -> Self {
        ObservedSource { inner, observer }
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }
}

impl<S: EventSource, O: FetchObserver> EventSource for ObservedSource<S, O> {
    async fn fetch_events(
        &self,
        property_id: &str,
        range: DateRange,
    ) -> CalendarResult<Vec<RawEventRecord>> {
        self.observer.on_request(property_id, &range);
        let started = Instant::now();

        let result = self.inner.fetch_events(property_id, range).await;
        match &result {
            Ok(records) => self
                .observer
                .on_response(property_id, records, started.elapsed()),
            Err(e) => self.observer.on_error(property_id, e, started.elapsed()),
        }
        result
    }
}
