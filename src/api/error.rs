//! Errors returned by the library backend client.
//!
//! Backend messages are surfaced to the user verbatim; when the backend
//! gives nothing usable each screen supplies its own fallback text.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Login rejected with 403
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Any other non-success response
    #[error("Server returned {status}: {message}")]
    Rejected { status: StatusCode, message: String },

    /// The request never got a response
    #[error("Failed to reach the library server: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response whose body could not be read
    #[error("Failed to parse server response: {0}")]
    Decode(String),
}

/// JSON error envelope some backend handlers produce instead of plain text.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
    error: Option<String>,
}

impl ApiError {
    /// Build a `Rejected` error from a status and raw response body.
    pub fn rejected(status: StatusCode, body: &str) -> Self {
        ApiError::Rejected {
            status,
            message: extract_message(body),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::InvalidCredentials => Some(StatusCode::FORBIDDEN),
            ApiError::Rejected { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            ApiError::Decode(_) => None,
        }
    }

    /// The backend's own message if it sent one, otherwise `fallback`.
    pub fn message_or(&self, fallback: &str) -> String {
        match self {
            ApiError::InvalidCredentials => self.to_string(),
            ApiError::Rejected { message, .. } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

fn extract_message(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.starts_with('{') {
        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(trimmed) {
            if let Some(message) = envelope.message.or(envelope.error) {
                return message;
            }
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_body_kept_verbatim() {
        let err = ApiError::rejected(StatusCode::BAD_REQUEST, "Book is already borrowed\n");
        assert_eq!(err.message_or("Error issuing book"), "Book is already borrowed");
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_json_envelope_message_extracted() {
        let err = ApiError::rejected(
            StatusCode::NOT_FOUND,
            r#"{"message":"User not found","status":404}"#,
        );
        assert_eq!(err.message_or("Update failed"), "User not found");

        let err = ApiError::rejected(StatusCode::CONFLICT, r#"{"error":"Duplicate title"}"#);
        assert_eq!(err.message_or("Error adding book"), "Duplicate title");
    }

    #[test]
    fn test_empty_body_uses_fallback() {
        let err = ApiError::rejected(StatusCode::INTERNAL_SERVER_ERROR, "   ");
        assert_eq!(err.message_or("Return failed"), "Return failed");

        let err = ApiError::Decode("eof".into());
        assert_eq!(err.message_or("Return failed"), "Return failed");
    }

    #[test]
    fn test_unrecognized_json_kept_whole() {
        let err = ApiError::rejected(StatusCode::BAD_REQUEST, r#"{"detail":"nope"}"#);
        assert_eq!(err.message_or("x"), r#"{"detail":"nope"}"#);
    }
}
