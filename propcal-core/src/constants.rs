/// Months shown before the anchor month.
pub const MONTHS_BEFORE: i32 = 3;

/// Months shown after the anchor month.
pub const MONTHS_AFTER: i32 = 3;

/// Total months held in a calendar window.
pub const WINDOW_MONTHS: usize = (MONTHS_BEFORE + 1 + MONTHS_AFTER) as usize;

pub const DAYS_PER_WEEK: usize = 7;

pub const GRID_WEEKS: usize = 6;

/// Cells in every month grid (6 full Sunday-first weeks).
pub const GRID_CELLS: usize = DAYS_PER_WEEK * GRID_WEEKS;

/// How long a controller waits on the event source before giving up.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
