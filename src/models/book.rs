use serde::{Deserialize, Serialize};

use super::RecordId;

/// Catalog entry as returned by `GET /books` and `GET /admin/books`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub book_place: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub available: bool,
}

impl Book {
    pub fn genre(&self) -> &str {
        self.genre.as_deref().unwrap_or("")
    }
}

/// Body of `POST /admin/addbook` and `PUT /admin/books/{id}`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    pub title: String,
    pub author: String,
    pub book_place: String,
    pub genre: String,
    pub description: String,
}

/// Body of `POST /admin/borrow`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    pub username: String,
    pub book_id: RecordId,
}
