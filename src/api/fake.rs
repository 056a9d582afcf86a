//! In-memory `LibraryApi` for screen tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;

use super::{ApiError, ApiResult, LibraryApi};
use crate::models::{
    Book, BookPayload, Borrow, ExtendDueDateRequest, IssueRequest, LoginRequest, LoginResponse,
    Profile, RecordId, RegisterRequest, UserRecord, UserUpdate,
};

#[derive(Default)]
pub(crate) struct FakeLibraryApi {
    pub books: Mutex<Vec<Book>>,
    pub borrows: Mutex<Vec<Borrow>>,
    pub users: Mutex<Vec<UserRecord>>,
    pub profile: Mutex<Option<Profile>>,
    pub login_response: Mutex<Option<LoginResponse>>,
    /// When set, every call fails with this status and body
    pub failure: Mutex<Option<(StatusCode, String)>>,
    calls: Mutex<Vec<String>>,
}

impl FakeLibraryApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, status: StatusCode, body: &str) {
        *self.failure.lock() = Some((status, body.to_string()));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: impl Into<String>) -> ApiResult<()> {
        self.calls.lock().push(call.into());
        match &*self.failure.lock() {
            Some((status, body)) => Err(ApiError::rejected(*status, body)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl LibraryApi for FakeLibraryApi {
    async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
        self.record(format!("login {}", request.username))?;
        self.login_response
            .lock()
            .clone()
            .ok_or(ApiError::InvalidCredentials)
    }

    async fn register(&self, request: &RegisterRequest) -> ApiResult<()> {
        self.record(format!("register {}", request.username))
    }

    async fn search_books(&self, search: &str) -> ApiResult<Vec<Book>> {
        self.record(format!("search_books {}", search))?;
        let needle = search.to_lowercase();
        Ok(self
            .books
            .lock()
            .iter()
            .filter(|b| b.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn list_all_books(&self) -> ApiResult<Vec<Book>> {
        self.record("list_all_books")?;
        Ok(self.books.lock().clone())
    }

    async fn add_book(&self, book: &BookPayload) -> ApiResult<()> {
        self.record(format!("add_book {}", book.title))
    }

    async fn update_book(&self, id: RecordId, _book: &BookPayload) -> ApiResult<()> {
        self.record(format!("update_book {}", id))
    }

    async fn delete_book(&self, id: RecordId) -> ApiResult<()> {
        self.record(format!("delete_book {}", id))
    }

    async fn issue_book(&self, request: &IssueRequest) -> ApiResult<()> {
        self.record(format!("issue_book {} {}", request.book_id, request.username))
    }

    async fn list_borrows(&self) -> ApiResult<Vec<Borrow>> {
        self.record("list_borrows")?;
        Ok(self.borrows.lock().clone())
    }

    async fn return_book(&self, borrow_id: RecordId) -> ApiResult<()> {
        self.record(format!("return_book {}", borrow_id))
    }

    async fn extend_due_date(&self, request: &ExtendDueDateRequest) -> ApiResult<()> {
        self.record(format!(
            "extend_due_date {} {}",
            request.borrow_id, request.extra_days
        ))
    }

    async fn list_users(&self) -> ApiResult<Vec<UserRecord>> {
        self.record("list_users")?;
        Ok(self.users.lock().clone())
    }

    async fn update_user(&self, id: RecordId, _update: &UserUpdate) -> ApiResult<()> {
        self.record(format!("update_user {}", id))
    }

    async fn profile(&self) -> ApiResult<Profile> {
        self.record("profile")?;
        self.profile
            .lock()
            .clone()
            .ok_or_else(|| ApiError::rejected(StatusCode::NOT_FOUND, "Profile not found"))
    }
}
