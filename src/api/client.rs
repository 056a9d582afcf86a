use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{ApiError, ApiResult, LibraryApi};
use crate::config::ApiConfig;
use crate::models::{
    Book, BookPayload, Borrow, ExtendDueDateRequest, IssueRequest, LoginRequest, LoginResponse,
    Profile, RecordId, RegisterRequest, UserRecord, UserUpdate,
};
use crate::session::SessionStore;

/// `LibraryApi` over HTTP/JSON.
///
/// The bearer token is read from the session store on every request, so a
/// login or logout takes effect on the next call without rebuilding the
/// client.
pub struct HttpLibraryApi {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl HttpLibraryApi {
    pub fn new(config: &ApiConfig, session: Arc<SessionStore>) -> ApiResult<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("libradesk/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "Backend request");
        let builder = self.client.request(method, url);
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(%status, body = %body, "Backend rejected request");
        Err(ApiError::rejected(status, &body))
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let response = self.send(builder).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn unit(&self, builder: RequestBuilder) -> ApiResult<()> {
        self.send(builder).await.map(|_| ())
    }

    async fn unit_with<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ApiResult<()> {
        self.unit(self.request(method, path).json(body)).await
    }
}

#[async_trait]
impl LibraryApi for HttpLibraryApi {
    async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
        let builder = self.request(Method::POST, "/auth/login").json(request);
        match self.json(builder).await {
            Err(ApiError::Rejected { status, .. }) if status == StatusCode::FORBIDDEN => {
                Err(ApiError::InvalidCredentials)
            }
            other => other,
        }
    }

    async fn register(&self, request: &RegisterRequest) -> ApiResult<()> {
        self.unit_with(Method::POST, "/auth/register", request).await
    }

    async fn search_books(&self, search: &str) -> ApiResult<Vec<Book>> {
        let builder = self
            .request(Method::GET, "/books")
            .query(&[("search", search)]);
        self.json(builder).await
    }

    async fn list_all_books(&self) -> ApiResult<Vec<Book>> {
        self.json(self.request(Method::GET, "/admin/books")).await
    }

    async fn add_book(&self, book: &BookPayload) -> ApiResult<()> {
        self.unit_with(Method::POST, "/admin/addbook", book).await
    }

    async fn update_book(&self, id: RecordId, book: &BookPayload) -> ApiResult<()> {
        self.unit_with(Method::PUT, &format!("/admin/books/{}", id), book)
            .await
    }

    async fn delete_book(&self, id: RecordId) -> ApiResult<()> {
        self.unit(self.request(Method::DELETE, &format!("/admin/{}", id)))
            .await
    }

    async fn issue_book(&self, request: &IssueRequest) -> ApiResult<()> {
        self.unit_with(Method::POST, "/admin/borrow", request).await
    }

    async fn list_borrows(&self) -> ApiResult<Vec<Borrow>> {
        self.json(self.request(Method::GET, "/admin/borrows")).await
    }

    async fn return_book(&self, borrow_id: RecordId) -> ApiResult<()> {
        self.unit(self.request(Method::POST, &format!("/borrow/return/{}", borrow_id)))
            .await
    }

    async fn extend_due_date(&self, request: &ExtendDueDateRequest) -> ApiResult<()> {
        self.unit_with(Method::POST, "/admin/extend-due-date", request)
            .await
    }

    async fn list_users(&self) -> ApiResult<Vec<UserRecord>> {
        self.json(self.request(Method::GET, "/admin/users")).await
    }

    async fn update_user(&self, id: RecordId, update: &UserUpdate) -> ApiResult<()> {
        self.unit_with(Method::PUT, &format!("/admin/users/{}", id), update)
            .await
    }

    async fn profile(&self) -> ApiResult<Profile> {
        self.json(self.request(Method::GET, "/profile")).await
    }
}
