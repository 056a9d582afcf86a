//! `HttpLibraryApi` against a fake backend served by axum.

use axum::extract::{Path, Query};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use libradesk::api::{ApiError, HttpLibraryApi, LibraryApi};
use libradesk::config::ApiConfig;
use libradesk::models::{ExtendDueDateRequest, LoginRequest};
use libradesk::session::{MemoryStorage, SessionStore};

const TOKEN: &str = "tok-123";

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == "secret" {
        Json(json!({
            "token": TOKEN,
            "username": body["username"],
            "roles": ["ROLE_ADMIN"]
        }))
        .into_response()
    } else {
        (StatusCode::FORBIDDEN, "Bad credentials").into_response()
    }
}

fn catalog() -> Value {
    json!([
        {"id": 1, "title": "Dune", "author": "Frank Herbert", "genre": "Sci-Fi", "bookPlace": "A-12", "available": true},
        {"id": 2, "title": "Emma", "author": "Jane Austen", "genre": "Classic", "bookPlace": "C-03", "available": false}
    ])
}

async fn search_books(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let needle = params.get("search").cloned().unwrap_or_default().to_lowercase();
    let books: Vec<Value> = catalog()
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter(|b| {
            b["title"]
                .as_str()
                .unwrap_or_default()
                .to_lowercase()
                .contains(&needle)
        })
        .collect();
    Json(Value::Array(books))
}

async fn all_books(headers: HeaderMap) -> Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v == format!("Bearer {}", TOKEN));
    if authorized {
        Json(catalog()).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, "Missing token").into_response()
    }
}

async fn delete_book(Path(id): Path<i64>) -> Response {
    if id == 2 {
        (StatusCode::BAD_REQUEST, "Book is currently borrowed").into_response()
    } else {
        StatusCode::OK.into_response()
    }
}

async fn extend(Json(body): Json<Value>) -> Response {
    if body["borrowId"] == 7 && body["extraDays"] == 5 {
        StatusCode::OK.into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Invalid extension"})),
        )
            .into_response()
    }
}

async fn return_book() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/books", get(search_books))
        .route("/admin/books", get(all_books))
        .route("/admin/:id", delete(delete_book))
        .route("/admin/extend-due-date", post(extend))
        .route("/borrow/return/:id", post(return_book));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base_url: &str) -> (HttpLibraryApi, Arc<SessionStore>) {
    let session = Arc::new(SessionStore::open(MemoryStorage::new()));
    let config = ApiConfig {
        base_url: base_url.to_string(),
        request_timeout_secs: Some(5),
    };
    let api = HttpLibraryApi::new(&config, session.clone()).unwrap();
    (api, session)
}

fn credentials(password: &str) -> LoginRequest {
    LoginRequest {
        username: "mira".into(),
        password: password.into(),
    }
}

#[tokio::test]
async fn test_forbidden_login_is_invalid_credentials() {
    let base = spawn_backend().await;
    let (api, _) = client(&base);

    let err = api.login(&credentials("wrong")).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidCredentials));
    assert_eq!(err.to_string(), "Invalid username or password");
}

#[tokio::test]
async fn test_bearer_token_follows_session() {
    let base = spawn_backend().await;
    let (api, session) = client(&base);

    let err = api.list_all_books().await.unwrap_err();
    assert_eq!(err.status(), Some(reqwest::StatusCode::UNAUTHORIZED));
    assert_eq!(err.message_or("x"), "Missing token");

    let response = api.login(&credentials("secret")).await.unwrap();
    assert_eq!(response.roles, vec!["ROLE_ADMIN"]);
    session.login(&response);

    let books = api.list_all_books().await.unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0].book_place.as_deref(), Some("A-12"));

    session.logout();
    assert!(api.list_all_books().await.is_err());
}

#[tokio::test]
async fn test_search_term_sent_as_query() {
    let base = spawn_backend().await;
    let (api, _) = client(&base);

    let books = api.search_books("dune").await.unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Dune");

    assert_eq!(api.search_books("").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_plain_text_error_is_verbatim() {
    let base = spawn_backend().await;
    let (api, _) = client(&base);

    assert!(api.delete_book(1).await.is_ok());
    let err = api.delete_book(2).await.unwrap_err();
    assert_eq!(err.message_or("Error deleting book"), "Book is currently borrowed");
}

#[tokio::test]
async fn test_json_error_message_extracted() {
    let base = spawn_backend().await;
    let (api, _) = client(&base);

    let ok = ExtendDueDateRequest {
        borrow_id: 7,
        extra_days: 5,
    };
    assert!(api.extend_due_date(&ok).await.is_ok());

    let bad = ExtendDueDateRequest {
        borrow_id: 7,
        extra_days: 30,
    };
    let err = api.extend_due_date(&bad).await.unwrap_err();
    assert_eq!(err.message_or("Error extending due date"), "Invalid extension");
}

#[tokio::test]
async fn test_empty_error_body_uses_fallback() {
    let base = spawn_backend().await;
    let (api, _) = client(&base);

    let err = api.return_book(3).await.unwrap_err();
    assert_eq!(err.status(), Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(err.message_or("Return failed"), "Return failed");
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (api, _) = client(&format!("http://{}", addr));
    let err = api.list_users().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.message_or("Failed to load users"), "Failed to load users");
}
