//! Async driver for a `CalendarSession`.
//!
//! The controller serialises loads for one calendar instance: starting a new
//! load aborts the one in flight, and results are published only if they
//! belong to the newest request. A failed or cancelled load leaves the last
//! published render in place.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::constants::DEFAULT_FETCH_TIMEOUT_SECS;
use crate::grid;
use crate::session::{
    ApplyOutcome, CalendarSession, LoadRequest, Navigation, RenderedCalendar, fetch_for,
};
use crate::source::EventSource;

/// What a view should display right now.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// The last successfully applied window.
    pub rendered: Option<Arc<RenderedCalendar>>,
    /// Generation of the load in flight, if any.
    pub loading: Option<u64>,
    /// Failure of the most recent load, cleared by the next success.
    pub error: Option<String>,
}

pub struct CalendarController<S> {
    source: Arc<S>,
    session: Arc<Mutex<CalendarSession>>,
    state: Arc<watch::Sender<ViewState>>,
    in_flight: Option<JoinHandle<()>>,
    fetch_timeout: Duration,
    today: Option<NaiveDate>,
}

impl<S: EventSource + 'static> CalendarController<S> {
    pub fn new(source: Arc<S>, property_id: &str, anchor: NaiveDate) -> Self {
        let (state, _) = watch::channel(ViewState::default());
        CalendarController {
            source,
            session: Arc::new(Mutex::new(CalendarSession::new(property_id, anchor))),
            state: Arc::new(state),
            in_flight: None,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            today: None,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Pin "today" instead of reading the local clock on every load.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn view(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn anchor(&self) -> NaiveDate {
        lock(&self.session).anchor()
    }

    pub fn property_id(&self) -> String {
        lock(&self.session).property_id().to_string()
    }

    /// Reload the current anchor.
    pub fn refresh(&mut self) {
        let request = lock(&self.session).reload();
        self.start(request);
    }

    pub fn navigate(&mut self, nav: Navigation) {
        let request = lock(&self.session).navigate(nav);
        self.start(request);
    }

    pub fn switch_property(&mut self, property_id: &str) {
        let request = lock(&self.session).switch_property(property_id);
        self.start(request);
    }

    /// Abort the load in flight, if any. The current render is kept.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
        self.state.send_modify(|s| s.loading = None);
    }

    /// Wait for the load in flight to finish (or be aborted).
    pub async fn settled(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            let _ = handle.await;
        }
    }

    fn start(&mut self, request: LoadRequest) {
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }

        let generation = request.generation;
        self.state.send_modify(|s| s.loading = Some(generation));

        let source = Arc::clone(&self.source);
        let session = Arc::clone(&self.session);
        let state = Arc::clone(&self.state);
        let timeout = self.fetch_timeout;
        let today = self.today;

        self.in_flight = Some(tokio::spawn(async move {
            let result = fetch_for(source.as_ref(), &request, timeout).await;
            let today = today.unwrap_or_else(grid::today);

            let mut guard = lock(&session);
            match result {
                Ok(records) => {
                    if guard.apply(&request, records, today) == ApplyOutcome::Applied {
                        let rendered = guard.current_shared();
                        state.send_modify(|s| {
                            s.rendered = rendered;
                            s.loading = None;
                            s.error = None;
                        });
                    }
                }
                Err(e) => {
                    if guard.is_current(&request) {
                        warn!(
                            "Calendar load for {} (generation {}) failed: {}",
                            request.property_id, request.generation, e
                        );
                        state.send_modify(|s| {
                            s.loading = None;
                            s.error = Some(e.to_string());
                        });
                    }
                }
            }
        }));
    }
}

impl<S> Drop for CalendarController<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

fn lock(session: &Mutex<CalendarSession>) -> MutexGuard<'_, CalendarSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}
