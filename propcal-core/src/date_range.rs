//! Inclusive calendar-date ranges.
//!
//! All event dates are naive calendar dates. They are never converted to
//! instants, so there is no timezone or time-of-day component to get wrong.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, CalendarResult};

/// Closed date range: both `start` and `end` are included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, returning None when `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(DateRange { start, end })
    }

    pub fn single(date: NaiveDate) -> Self {
        DateRange {
            start: date,
            end: date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Closed-interval overlap: sharing a single day counts.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    /// The part of `self` that lies inside `other`, if any.
    pub fn intersect(&self, other: &DateRange) -> Option<DateRange> {
        DateRange::new(self.start.max(other.start), self.end.min(other.end))
    }

    /// Number of days covered, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Offset of `date` from the start of the range, in days.
    pub fn offset_of(&self, date: NaiveDate) -> Option<usize> {
        self.contains(date)
            .then(|| (date - self.start).num_days() as usize)
    }

    /// Date `n` days after the start of the range.
    pub fn nth_day(&self, n: usize) -> Option<NaiveDate> {
        self.start
            .checked_add_days(Days::new(n as u64))
            .filter(|d| *d <= self.end)
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Parse a YYYY-MM-DD date.
pub fn parse_date(field: &'static str, s: &str) -> CalendarResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| CalendarError::InvalidDate {
        field,
        value: s.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_new_rejects_inverted_range() {
        assert!(DateRange::new(d("2025-08-03"), d("2025-08-01")).is_none());
        assert!(DateRange::new(d("2025-08-01"), d("2025-08-01")).is_some());
    }

    #[test]
    fn test_overlap_is_closed_interval() {
        let a = DateRange::new(d("2025-08-01"), d("2025-08-03")).unwrap();
        let b = DateRange::new(d("2025-08-03"), d("2025-08-05")).unwrap();
        let c = DateRange::new(d("2025-08-04"), d("2025-08-05")).unwrap();

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_intersect_and_days() {
        let a = DateRange::new(d("2025-07-28"), d("2025-08-03")).unwrap();
        let august = DateRange::new(d("2025-08-01"), d("2025-08-31")).unwrap();

        let clipped = a.intersect(&august).unwrap();
        assert_eq!(clipped.start, d("2025-08-01"));
        assert_eq!(clipped.end, d("2025-08-03"));
        assert_eq!(clipped.days(), 3);
        assert_eq!(a.days(), 7);

        let september = DateRange::new(d("2025-09-01"), d("2025-09-30")).unwrap();
        assert!(a.intersect(&september).is_none());
    }

    #[test]
    fn test_iter_days_crosses_year_boundary() {
        let r = DateRange::new(d("2024-12-30"), d("2025-01-02")).unwrap();
        let days: Vec<_> = r.iter_days().collect();
        assert_eq!(
            days,
            vec![d("2024-12-30"), d("2024-12-31"), d("2025-01-01"), d("2025-01-02")]
        );
    }

    #[test]
    fn test_offsets() {
        let r = DateRange::new(d("2025-02-01"), d("2025-02-28")).unwrap();
        assert_eq!(r.offset_of(d("2025-02-01")), Some(0));
        assert_eq!(r.offset_of(d("2025-02-28")), Some(27));
        assert_eq!(r.offset_of(d("2025-03-01")), None);
        assert_eq!(r.nth_day(27), Some(d("2025-02-28")));
        assert_eq!(r.nth_day(28), None);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("check_in", "2025-08-01").unwrap(), d("2025-08-01"));
        assert_eq!(parse_date("check_in", " 2025-08-01 ").unwrap(), d("2025-08-01"));

        let err = parse_date("check_out", "08/01/2025").unwrap_err();
        assert!(matches!(
            err,
            CalendarError::InvalidDate { field: "check_out", .. }
        ));
        assert!(parse_date("check_out", "2025-02-30").is_err());
    }
}
