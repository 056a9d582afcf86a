//! Borrow list and due-date screens.

use chrono::{DateTime, Days, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;
use tracing::info;

use super::{patch_where, LoadOutcome, MutationOutcome, Screen};
use crate::api::LibraryApi;
use crate::forms::{validate_extra_days, FieldErrors};
use crate::listing::{days_remaining, derive_status, BorrowStatus, ListState, RecordFilter, Searchable};
use crate::models::{Borrow, ExtendDueDateRequest, RecordId};

pub const NO_BORROWS_MESSAGE: &str = "No borrows found";

impl Searchable for Borrow {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.book.title.as_str(), self.user.username.as_str()]
    }
}

impl Borrow {
    pub fn status(&self, now: DateTime<Utc>) -> BorrowStatus {
        derive_status(self.due_date, self.return_date, now)
    }
}

/// Status filter on the borrow list. `Active` covers "Due Soon" too.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BorrowFilter {
    #[default]
    All,
    Active,
    Returned,
    Overdue,
}

impl RecordFilter<Borrow> for BorrowFilter {
    fn matches(&self, borrow: &Borrow, now: DateTime<Utc>) -> bool {
        let status = borrow.status(now);
        match self {
            BorrowFilter::All => true,
            BorrowFilter::Active => {
                !matches!(status, BorrowStatus::Overdue | BorrowStatus::Returned)
            }
            BorrowFilter::Returned => status == BorrowStatus::Returned,
            BorrowFilter::Overdue => status == BorrowStatus::Overdue,
        }
    }
}

impl FromStr for BorrowFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(BorrowFilter::All),
            "active" => Ok(BorrowFilter::Active),
            "returned" => Ok(BorrowFilter::Returned),
            "overdue" => Ok(BorrowFilter::Overdue),
            other => Err(format!(
                "Unknown status '{}', expected all, active, returned or overdue",
                other
            )),
        }
    }
}

impl fmt::Display for BorrowFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BorrowFilter::All => "all",
            BorrowFilter::Active => "active",
            BorrowFilter::Returned => "returned",
            BorrowFilter::Overdue => "overdue",
        };
        f.write_str(s)
    }
}

/// Status filter on the due-date screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DueDateFilter {
    #[default]
    All,
    Borrowed,
    Returned,
    Overdue,
}

impl RecordFilter<Borrow> for DueDateFilter {
    fn matches(&self, borrow: &Borrow, now: DateTime<Utc>) -> bool {
        let out = borrow.return_date.is_none();
        match self {
            DueDateFilter::All => true,
            DueDateFilter::Borrowed => out,
            DueDateFilter::Returned => !out,
            DueDateFilter::Overdue => out && days_remaining(borrow.due_date, now) < 0,
        }
    }
}

impl FromStr for DueDateFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(DueDateFilter::All),
            "borrowed" => Ok(DueDateFilter::Borrowed),
            "returned" => Ok(DueDateFilter::Returned),
            "overdue" => Ok(DueDateFilter::Overdue),
            other => Err(format!(
                "Unknown status '{}', expected all, borrowed, returned or overdue",
                other
            )),
        }
    }
}

pub type BorrowScreen = Screen<Borrow, BorrowFilter>;
pub type DueDateScreen = Screen<Borrow, DueDateFilter>;

pub fn borrow_screen(page_size: usize) -> BorrowScreen {
    Screen::new(ListState::new(page_size))
}

pub fn due_date_screen(page_size: usize) -> DueDateScreen {
    Screen::new(ListState::new(page_size))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BorrowStats {
    pub total: usize,
    pub returned: usize,
    pub overdue: usize,
    pub due_soon: usize,
    pub active: usize,
}

pub fn borrow_stats(borrows: &[Borrow], now: DateTime<Utc>) -> BorrowStats {
    let mut stats = BorrowStats {
        total: borrows.len(),
        ..Default::default()
    };
    for borrow in borrows {
        match borrow.status(now) {
            BorrowStatus::Returned => stats.returned += 1,
            BorrowStatus::Overdue => stats.overdue += 1,
            BorrowStatus::DueSoon => stats.due_soon += 1,
            BorrowStatus::Active => stats.active += 1,
        }
    }
    stats
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DueDateStats {
    pub total: usize,
    pub borrowed: usize,
    pub returned: usize,
    pub overdue: usize,
}

pub fn due_date_stats(borrows: &[Borrow], now: DateTime<Utc>) -> DueDateStats {
    let borrowed = borrows.iter().filter(|b| b.return_date.is_none()).count();
    let overdue = borrows
        .iter()
        .filter(|b| b.return_date.is_none() && days_remaining(b.due_date, now) < 0)
        .count();
    DueDateStats {
        total: borrows.len(),
        borrowed,
        returned: borrows.len() - borrowed,
        overdue,
    }
}

/// Badge on the due-date screen, with the day count for late and near loans.
pub fn due_badge(borrow: &Borrow, now: DateTime<Utc>) -> String {
    let days = days_remaining(borrow.due_date, now);
    match borrow.status(now) {
        BorrowStatus::Overdue => format!("Overdue ({} days)", days.abs()),
        BorrowStatus::DueSoon => format!("Due Soon ({} days)", days),
        status => status.label().to_string(),
    }
}

pub fn mark_returned(borrows: Vec<Borrow>, id: RecordId, today: NaiveDate) -> Vec<Borrow> {
    patch_where(
        borrows,
        |b| b.id == id,
        |b| Borrow {
            return_date: Some(today),
            ..b
        },
    )
}

pub fn extend_due(borrows: Vec<Borrow>, id: RecordId, extra_days: u32) -> Vec<Borrow> {
    patch_where(
        borrows,
        |b| b.id == id,
        |b| Borrow {
            due_date: b
                .due_date
                .checked_add_days(Days::new(u64::from(extra_days)))
                .unwrap_or(b.due_date),
            ..b
        },
    )
}

pub async fn load_borrows<F>(screen: &mut Screen<Borrow, F>, api: &dyn LibraryApi) -> LoadOutcome {
    let activation = screen.activate();
    let result = api.list_borrows().await;
    screen.finish_load(activation, result)
}

/// Return a book; the local copy gets today's date (UTC) as its return date.
pub async fn return_book<F>(
    screen: &mut Screen<Borrow, F>,
    api: &dyn LibraryApi,
    borrow_id: RecordId,
    now: DateTime<Utc>,
) -> MutationOutcome {
    let Some(ticket) = screen.begin_mutation(borrow_id) else {
        return MutationOutcome::Busy;
    };

    let result = api.return_book(borrow_id).await;
    let today = now.date_naive();
    let outcome = screen.finish_mutation(ticket, result, "Return failed", |borrows, ()| {
        mark_returned(borrows, borrow_id, today)
    });
    if outcome.is_applied() {
        info!(borrow_id, "Book returned");
    }
    outcome
}

pub async fn extend_due_date<F>(
    screen: &mut Screen<Borrow, F>,
    api: &dyn LibraryApi,
    borrow_id: RecordId,
    extra_days: Option<i64>,
) -> MutationOutcome {
    let extra_days = match validate_extra_days(extra_days) {
        Ok(days) => days,
        Err(errors) => return MutationOutcome::Invalid(errors),
    };
    let out_of_range = screen
        .records()
        .iter()
        .find(|b| b.id == borrow_id)
        .is_some_and(|b| {
            b.due_date
                .checked_add_days(Days::new(u64::from(extra_days)))
                .is_none()
        });
    if out_of_range {
        let mut errors = FieldErrors::new();
        errors.add("extraDays", "Please enter valid number of days");
        return MutationOutcome::Invalid(errors);
    }
    let Some(ticket) = screen.begin_mutation(borrow_id) else {
        return MutationOutcome::Busy;
    };

    let request = ExtendDueDateRequest {
        borrow_id,
        extra_days,
    };
    let result = api.extend_due_date(&request).await;
    let outcome = screen.finish_mutation(ticket, result, "Error extending due date", |borrows, ()| {
        extend_due(borrows, borrow_id, extra_days)
    });
    if outcome.is_applied() {
        info!(borrow_id, extra_days, "Due date extended");
    }
    outcome
}
