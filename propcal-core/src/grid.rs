//! Calendar grid construction.
//!
//! A `CalendarWindow` is a rolling run of seven contiguous months centred on
//! an anchor date. Each month is a fixed 6x7 Sunday-first grid whose padding
//! cells are real dates borrowed from the neighbouring months.

use chrono::{Datelike, Days, Local, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::constants::{DAYS_PER_WEEK, GRID_CELLS, MONTHS_AFTER, MONTHS_BEFORE};
use crate::date_range::DateRange;
use crate::distribute::EventFragment;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One square of a month grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub day: u32,
    /// 0 = Sunday .. 6 = Saturday
    pub weekday: u32,
    pub is_current_month: bool,
    pub is_today: bool,
    pub is_past: bool,
    pub events: Vec<EventFragment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    /// Zero-based month (0 = January).
    pub month: u32,
    pub label: String,
    /// Number of leading padding cells (weekday of the 1st).
    pub first_weekday_offset: u32,
    pub days: Vec<DayCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarWindow {
    pub anchor: NaiveDate,
    pub today: NaiveDate,
    pub months: Vec<MonthGrid>,
}

/// The current local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Move a zero-based (year, month) pair by `delta` months.
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let total = i64::from(year) * 12 + i64::from(month) + i64::from(delta);
    let year = i32::try_from(total.div_euclid(12))
        .unwrap_or(if total < 0 { i32::MIN } else { i32::MAX });
    (year, total.rem_euclid(12) as u32)
}

/// First and last zero-based months whose whole 42-cell grid is representable.
fn month_bounds() -> ((i32, u32), (i32, u32)) {
    (
        shift_month(NaiveDate::MIN.year(), NaiveDate::MIN.month0(), 1),
        shift_month(NaiveDate::MAX.year(), NaiveDate::MAX.month0(), -1),
    )
}

/// Normalize `month` into 0..12 and keep the pair inside the supported range.
fn clamp_month(year: i32, month: u32) -> (i32, u32) {
    let (lo, hi) = month_bounds();
    shift_month(year, month % 12, (month / 12) as i32).clamp(lo, hi)
}

/// Anchors whose window would run past the representable dates are pulled
/// back to the nearest anchor whose window fits.
pub fn clamp_anchor(anchor: NaiveDate) -> NaiveDate {
    let (lo, hi) = month_bounds();
    let first = shift_month(lo.0, lo.1, MONTHS_BEFORE);
    let last = shift_month(hi.0, hi.1, -MONTHS_AFTER);
    let current = (anchor.year(), anchor.month0());

    if current < first {
        first_of_month(first.0, first.1)
    } else if current > last {
        last_of_month(last.0, last.1)
    } else {
        anchor
    }
}

/// Move a date by `delta` months, keeping the day of month where possible.
/// Jan 31 + 1 month lands on the last day of February.
pub fn shift_date_by_months(date: NaiveDate, delta: i32) -> NaiveDate {
    let (year, month) = shift_month(date.year(), date.month0(), delta);
    let (year, month) = clamp_month(year, month);
    let last = days_in_month(year, month);
    first_of_month(year, month)
        .checked_add_days(Days::new(u64::from(date.day().min(last) - 1)))
        .unwrap_or(date)
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    let (year, month) = clamp_month(year, month);
    NaiveDate::from_ymd_opt(year, month + 1, 1).unwrap_or(NaiveDate::MIN)
}

fn last_of_month(year: i32, month: u32) -> NaiveDate {
    let (year, month) = clamp_month(year, month);
    let first = first_of_month(year, month);
    first
        .checked_add_days(Days::new(u64::from(days_in_month(year, month) - 1)))
        .unwrap_or(first)
}

/// Number of days in a zero-based month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = shift_month(year, month, 1);
    NaiveDate::from_ymd_opt(next_year, next_month + 1, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}

/// Build the 42-cell grid for one zero-based month.
///
/// A `month` of 12 or more rolls over into the following years.
pub fn build_month(year: i32, month: u32, today: NaiveDate) -> MonthGrid {
    let (year, month) = clamp_month(year, month);
    let first = first_of_month(year, month);
    let offset = first.weekday().num_days_from_sunday();
    let grid_start = first
        .checked_sub_days(Days::new(u64::from(offset)))
        .unwrap_or(first);

    let days = grid_start
        .iter_days()
        .take(GRID_CELLS)
        .map(|date| DayCell {
            date,
            day: date.day(),
            weekday: date.weekday().num_days_from_sunday(),
            is_current_month: date.year() == year && date.month0() == month,
            is_today: date == today,
            is_past: date < today,
            events: Vec::new(),
        })
        .collect();

    MonthGrid {
        year,
        month,
        label: format!("{} {}", MONTH_NAMES[month as usize], year),
        first_weekday_offset: offset,
        days,
    }
}

/// Build the seven-month window around `anchor` with empty event lists.
/// Anchors within four months of the representable date limits are clamped.
pub fn build_window(anchor: NaiveDate, today: NaiveDate) -> CalendarWindow {
    let anchor = clamp_anchor(anchor);
    let months: Vec<MonthGrid> = (-MONTHS_BEFORE..=MONTHS_AFTER)
        .map(|delta| {
            let (year, month) = shift_month(anchor.year(), anchor.month0(), delta);
            build_month(year, month, today)
        })
        .collect();

    debug!(
        "Built calendar window: anchor={}, months={}",
        anchor,
        months.len()
    );

    CalendarWindow {
        anchor,
        today,
        months,
    }
}

/// Date span covered by the window built for `anchor`, padding included.
pub fn window_range(anchor: NaiveDate) -> DateRange {
    let anchor = clamp_anchor(anchor);
    let (first_year, first_month) = shift_month(anchor.year(), anchor.month0(), -MONTHS_BEFORE);
    let (last_year, last_month) = shift_month(anchor.year(), anchor.month0(), MONTHS_AFTER);

    let first = first_of_month(first_year, first_month);
    let start = first
        .checked_sub_days(Days::new(u64::from(first.weekday().num_days_from_sunday())))
        .unwrap_or(first);

    let last_first = first_of_month(last_year, last_month);
    let last_start = last_first
        .checked_sub_days(Days::new(u64::from(
            last_first.weekday().num_days_from_sunday(),
        )))
        .unwrap_or(last_first);
    let end = last_start
        .checked_add_days(Days::new(GRID_CELLS as u64 - 1))
        .unwrap_or(last_start);

    DateRange { start, end }
}

impl MonthGrid {
    /// The 1st of the month.
    pub fn first_day(&self) -> NaiveDate {
        first_of_month(self.year, self.month)
    }

    /// The last real day of the month.
    pub fn last_day(&self) -> NaiveDate {
        last_of_month(self.year, self.month)
    }

    /// Real days of the month, without padding.
    pub fn month_range(&self) -> DateRange {
        DateRange {
            start: self.first_day(),
            end: self.last_day(),
        }
    }

    /// Every date shown in the grid, padding included.
    pub fn displayed_range(&self) -> DateRange {
        match (self.days.first(), self.days.last()) {
            (Some(first), Some(last)) => DateRange {
                start: first.date,
                end: last.date,
            },
            _ => self.month_range(),
        }
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&DayCell> {
        self.displayed_range()
            .offset_of(date)
            .and_then(|i| self.days.get(i))
    }

    /// Cells grouped into the six display weeks.
    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.days.chunks(DAYS_PER_WEEK)
    }
}

impl CalendarWindow {
    /// Date span covered by the window, padding included.
    pub fn range(&self) -> DateRange {
        match (self.months.first(), self.months.last()) {
            (Some(first), Some(last)) => DateRange {
                start: first.displayed_range().start,
                end: last.displayed_range().end,
            },
            _ => DateRange::single(self.anchor),
        }
    }

    /// The grid for a zero-based (year, month), if it is part of the window.
    pub fn month(&self, year: i32, month: u32) -> Option<&MonthGrid> {
        self.months
            .iter()
            .find(|m| m.year == year && m.month == month)
    }
}
