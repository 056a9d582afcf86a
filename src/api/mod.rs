//! REST client for the library backend.
//!
//! `LibraryApi` is the seam between screens and the network: the HTTP
//! implementation talks to the real backend, tests substitute a fake.

mod client;
pub mod error;
#[cfg(test)]
pub(crate) mod fake;

pub use client::HttpLibraryApi;
pub use error::ApiError;

use async_trait::async_trait;

use crate::models::{
    Book, BookPayload, Borrow, ExtendDueDateRequest, IssueRequest, LoginRequest, LoginResponse,
    Profile, RecordId, RegisterRequest, UserRecord, UserUpdate,
};

pub type ApiResult<T> = Result<T, ApiError>;

#[async_trait]
pub trait LibraryApi: Send + Sync {
    /// POST /auth/login
    async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse>;

    /// POST /auth/register
    async fn register(&self, request: &RegisterRequest) -> ApiResult<()>;

    /// GET /books?search=
    async fn search_books(&self, search: &str) -> ApiResult<Vec<Book>>;

    /// GET /admin/books
    async fn list_all_books(&self) -> ApiResult<Vec<Book>>;

    /// POST /admin/addbook
    async fn add_book(&self, book: &BookPayload) -> ApiResult<()>;

    /// PUT /admin/books/{id}
    async fn update_book(&self, id: RecordId, book: &BookPayload) -> ApiResult<()>;

    /// DELETE /admin/{id}
    async fn delete_book(&self, id: RecordId) -> ApiResult<()>;

    /// POST /admin/borrow
    async fn issue_book(&self, request: &IssueRequest) -> ApiResult<()>;

    /// GET /admin/borrows
    async fn list_borrows(&self) -> ApiResult<Vec<Borrow>>;

    /// POST /borrow/return/{id}
    async fn return_book(&self, borrow_id: RecordId) -> ApiResult<()>;

    /// POST /admin/extend-due-date
    async fn extend_due_date(&self, request: &ExtendDueDateRequest) -> ApiResult<()>;

    /// GET /admin/users
    async fn list_users(&self) -> ApiResult<Vec<UserRecord>>;

    /// PUT /admin/users/{id}
    async fn update_user(&self, id: RecordId, update: &UserUpdate) -> ApiResult<()>;

    /// GET /profile
    async fn profile(&self) -> ApiResult<Profile>;
}
