use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::RecordId;

/// Borrow record from `GET /admin/borrows`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Borrow {
    pub id: RecordId,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub return_date: Option<NaiveDate>,
    pub book: BorrowedBookRef,
    pub user: BorrowerRef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BorrowedBookRef {
    #[serde(default)]
    pub id: Option<RecordId>,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BorrowerRef {
    #[serde(default)]
    pub id: Option<RecordId>,
    pub username: String,
}

/// Body of `POST /admin/extend-due-date`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendDueDateRequest {
    pub borrow_id: RecordId,
    pub extra_days: u32,
}
