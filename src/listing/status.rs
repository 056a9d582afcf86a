//! Derived borrow status.
//!
//! Status is never stored: it is recomputed from the due date, the return
//! date and an explicit `now` every time a list is derived.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

/// Borrows due within this many days (inclusive) are "Due Soon".
pub const DUE_SOON_DAYS: i64 = 3;

const MILLIS_PER_DAY: i64 = 86_400_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorrowStatus {
    Returned,
    Overdue,
    DueSoon,
    Active,
}

impl BorrowStatus {
    pub fn label(&self) -> &'static str {
        match self {
            BorrowStatus::Returned => "Returned",
            BorrowStatus::Overdue => "Overdue",
            BorrowStatus::DueSoon => "Due Soon",
            BorrowStatus::Active => "Active",
        }
    }
}

impl fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Whole days until the due date, rounded up. Due dates start at midnight UTC.
pub fn days_remaining(due_date: NaiveDate, now: DateTime<Utc>) -> i64 {
    let due = due_date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
    let diff = (due - now).num_milliseconds();
    // ceil(diff / day) for a positive divisor
    -((-diff).div_euclid(MILLIS_PER_DAY))
}

pub fn derive_status(
    due_date: NaiveDate,
    return_date: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> BorrowStatus {
    if return_date.is_some() {
        return BorrowStatus::Returned;
    }

    match days_remaining(due_date, now) {
        d if d < 0 => BorrowStatus::Overdue,
        d if d <= DUE_SOON_DAYS => BorrowStatus::DueSoon,
        _ => BorrowStatus::Active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_days_remaining_rounds_up() {
        let now = at(2026, 10, 19, 12);
        assert_eq!(days_remaining(date(2026, 10, 20), now), 1);
        assert_eq!(days_remaining(date(2026, 10, 23), now), 4);
        // Due at midnight today, noon now: -0.5 days rounds up to 0
        assert_eq!(days_remaining(date(2026, 10, 19), now), 0);
        assert_eq!(days_remaining(date(2026, 10, 18), now), -1);
        assert_eq!(days_remaining(date(2026, 10, 10), now), -9);
    }

    #[test]
    fn test_exact_day_boundary() {
        let now = at(2026, 10, 19, 0);
        assert_eq!(days_remaining(date(2026, 10, 22), now), 3);
        assert_eq!(days_remaining(date(2026, 10, 19), now), 0);
    }

    #[test]
    fn test_status_thresholds() {
        let now = at(2026, 10, 19, 9);
        assert_eq!(derive_status(date(2026, 10, 18), None, now), BorrowStatus::Overdue);
        assert_eq!(derive_status(date(2026, 10, 19), None, now), BorrowStatus::DueSoon);
        assert_eq!(derive_status(date(2026, 10, 22), None, now), BorrowStatus::DueSoon);
        assert_eq!(derive_status(date(2026, 10, 23), None, now), BorrowStatus::Active);
    }

    #[test]
    fn test_returned_wins_regardless_of_due_date() {
        let now = at(2026, 10, 19, 9);
        let returned = Some(date(2026, 10, 1));
        for due in [date(2020, 1, 1), date(2026, 10, 19), date(2030, 1, 1)] {
            assert_eq!(derive_status(due, returned, now), BorrowStatus::Returned);
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(BorrowStatus::DueSoon.to_string(), "Due Soon");
        assert_eq!(BorrowStatus::Overdue.label(), "Overdue");
    }
}
