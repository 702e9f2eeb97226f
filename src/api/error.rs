//! Client-side error taxonomy for calls to the order platform API.
//!
//! Every call either resolves with a decoded body or fails with one of the
//! kinds below. Nothing here is retried; the caller surfaces the error where
//! it happened.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::forms::FieldErrors;

/// Coarse error kinds, mirrored by the CLI exit message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 401/403, the local session has been torn down
    Unauthorized,
    /// Client-side required-field checks failed, nothing was sent
    Validation,
    /// 404 for a product, order or user
    NotFound,
    /// Transport failure, server error or undecodable body
    RequestFailed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Validation => "validation_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::RequestFailed => "request_failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error("Session expired or access denied (HTTP {status}). Please log in again.")]
    Unauthorized { status: u16 },
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Request failed{}: {message}", status_suffix(.status))]
    RequestFailed { status: Option<u16>, message: String },
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Unauthorized { .. } => ErrorKind::Unauthorized,
            ClientError::Validation(_) => ErrorKind::Validation,
            ClientError::NotFound(_) => ErrorKind::NotFound,
            ClientError::RequestFailed { .. } => ErrorKind::RequestFailed,
        }
    }

    pub fn request_failed(message: impl Into<String>) -> Self {
        ClientError::RequestFailed {
            status: None,
            message: message.into(),
        }
    }

    /// Map a non-success status and its body to an error kind.
    ///
    /// 401 and 403 both end the session; the server uses 403 for tokens it
    /// refuses as well as for role mismatches.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = server_message(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unexpected response")
                .to_string()
        });

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Unauthorized {
                status: status.as_u16(),
            },
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            _ => ClientError::RequestFailed {
                status: Some(status.as_u16()),
                message,
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized { .. })
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "Request timed out".to_string()
        } else if err.is_connect() {
            "Could not reach the server".to_string()
        } else if err.is_decode() {
            format!("Unexpected response body: {}", err)
        } else {
            err.to_string()
        };

        ClientError::RequestFailed {
            status: err.status().map(|s| s.as_u16()),
            message,
        }
    }
}

impl From<FieldErrors> for ClientError {
    fn from(errors: FieldErrors) -> Self {
        ClientError::Validation(errors)
    }
}

/// Error envelope variants the backend is known to send
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<ErrorField>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Text(String),
    Body { message: String },
}

/// Extract a human-readable message from an error response body
fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<ErrorEnvelope>(trimmed) {
        Ok(envelope) => envelope.message.or(match envelope.error {
            Some(ErrorField::Text(text)) => Some(text),
            Some(ErrorField::Body { message }) => Some(message),
            None => None,
        }),
        Err(_) if !trimmed.starts_with('{') && trimmed.len() <= 200 => Some(trimmed.to_string()),
        Err(_) => None,
    }
}
