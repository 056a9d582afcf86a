//! The reader's own profile: details, current loans, fines.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use tracing::error;

use crate::api::LibraryApi;
use crate::models::{CurrentLoan, Profile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanStanding {
    OnTime,
    Overdue,
}

impl fmt::Display for LoanStanding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanStanding::OnTime => f.pad("On Time"),
            LoanStanding::Overdue => f.pad("Overdue"),
        }
    }
}

/// On time while the due date (midnight UTC) is still ahead of `now`.
pub fn loan_standing(due_date: NaiveDate, now: DateTime<Utc>) -> LoanStanding {
    let due = due_date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
    if due > now {
        LoanStanding::OnTime
    } else {
        LoanStanding::Overdue
    }
}

pub fn current_loans(profile: &Profile, now: DateTime<Utc>) -> Vec<(&CurrentLoan, LoanStanding)> {
    profile
        .books_borrowed
        .currently_borrowed
        .iter()
        .map(|loan| (loan, loan_standing(loan.due_date, now)))
        .collect()
}

/// Fetch the profile. A failure is logged and rendered as "not found".
pub async fn load_profile(api: &dyn LibraryApi) -> Option<Profile> {
    match api.profile().await {
        Ok(profile) => Some(profile),
        Err(e) => {
            error!(error = %e, "Failed to load profile");
            None
        }
    }
}
