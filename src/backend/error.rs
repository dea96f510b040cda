//! Backend error types

use thiserror::Error;

/// Backend error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Unavailable, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::NotFound, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Rejected, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::InvalidResponse, message)
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            404 => Self::not_found(format!("Not found: {body}")),
            500..=599 => Self::unavailable(format!("Server error {status}: {body}")),
            _ => Self::rejected(format!("HTTP {status}: {body}")),
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::unavailable(format!("Request timeout: {e}"))
        } else if e.is_connect() {
            Self::unavailable(format!("Connection failed: {e}"))
        } else if e.is_decode() {
            Self::invalid_response(format!("Failed to parse response: {e}"))
        } else {
            Self::unavailable(format!("Request failed: {e}"))
        }
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Transport failure or 5xx
    Unavailable,
    /// 404, e.g. an unknown enrollment
    NotFound,
    /// Any other 4xx
    Rejected,
    /// The body could not be decoded
    InvalidResponse,
}
