//! Auth error taxonomy.
//!
//! ERROR HANDLING
//! ==============
//! Every failure of the credential flow is a typed variant carrying the
//! message shown to the user. Route handlers translate variants to HTTP
//! statuses; the UI re-prompts instead of retrying.

use axum::http::StatusCode;

/// Grepable error code and retryable flag for structured error responses.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Local pre-check failed; no request was sent.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    InvalidCredentials(String),
    #[error("{0}")]
    UserNotFound(String),
    #[error("{0}")]
    ServerError(String),
    #[error("{0}")]
    Timeout(String),
    #[error("{0}")]
    Unexpected(String),
    /// A newer login, signup, or logout started before this one finished.
    #[error("request superseded by a newer sign-in attempt")]
    Superseded,
}

impl AuthError {
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Human-readable message for the UI.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
            Self::UserNotFound(_) => StatusCode::NOT_FOUND,
            Self::ServerError(_) => StatusCode::BAD_GATEWAY,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Superseded => StatusCode::CONFLICT,
            Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ErrorCode for AuthError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::InvalidCredentials(_) => "E_INVALID_CREDENTIALS",
            Self::UserNotFound(_) => "E_USER_NOT_FOUND",
            Self::ServerError(_) => "E_SERVER_ERROR",
            Self::Timeout(_) => "E_TIMEOUT",
            Self::Unexpected(_) => "E_UNEXPECTED",
            Self::Superseded => "E_SUPERSEDED",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ServerError(_) | Self::Timeout(_))
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
