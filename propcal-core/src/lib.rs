//! Calendar layout engine for property dashboards.
//!
//! This crate turns a reference date and a batch of date-ranged events into
//! a render-ready structure:
//! - `grid` builds a seven-month window of 42-cell month grids
//! - `distribute` places events onto day cells and packs them into rows (`rows`)
//! - `layout` computes grid coordinates for each event bar
//! - `session` and `controller` hold per-view state and serialise loads
//!   against an `EventSource`

pub mod constants;
pub mod controller;
pub mod date_range;
pub mod distribute;
pub mod error;
pub mod event;
pub mod grid;
pub mod kind;
pub mod layout;
pub mod rows;
pub mod session;
pub mod source;

pub use controller::{CalendarController, ViewState};
pub use date_range::DateRange;
pub use distribute::{Distribution, EventFragment, RecordWarning, distribute};
pub use error::{CalendarError, CalendarResult};
pub use event::{EventRecord, Metadata, RawEventRecord};
pub use grid::{CalendarWindow, DayCell, MonthGrid, build_window};
pub use kind::{EventKind, Presentation};
pub use layout::{EventSpan, PlacedEvent, WeekSegment, event_span, month_layout};
pub use rows::{RowAssignment, pack_rows};
pub use session::{
    ApplyOutcome, CalendarSession, LoadRequest, Navigation, RenderedCalendar, load_calendar,
};
pub use source::{EventSource, FetchObserver, MemorySource, ObservedSource, TracingObserver};
