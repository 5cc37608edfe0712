//! Relay error types with HTTP status code mapping.
//!
//! [`RelayError`] is the central error type. The consumer loop converts
//! persistence errors into outcome signals rather than propagating
//! them; the HTTP read path maps them to structured JSON responses.
//! A store miss is never an error; it is an empty/`None` result.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// { "error": "persistence error during get for key \"a\": ..." }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// Central error enum for the relay.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// A persistence operation failed, tagged with the operation name
    /// and the content key it was working on.
    #[error("persistence error during {operation} for key \"{key}\": {message}")]
    Persistence {
        /// Gateway operation that failed (`set`, `get`, `get_by_path`,
        /// `del`, `get_all`, `connect`, `migrate`).
        operation: &'static str,
        /// Content key involved; empty for key-less operations.
        key: String,
        /// Backend error message.
        message: String,
    },

    /// The initial database connection exhausted its retry budget.
    ///
    /// The store is a mandatory dependency, so the top-level caller is
    /// expected to terminate the process and let the orchestrator
    /// restart it.
    #[error("database connection failed after {attempts} attempts: {last_error}")]
    ConnectionExhausted {
        /// Total attempts made, including the first.
        attempts: u32,
        /// Error from the final attempt.
        last_error: String,
    },

    /// A broker message failed structural validation.
    #[error("malformed message: {0}")]
    Decode(String),

    /// The broker transport failed to deliver or commit.
    #[error("transport error: {0}")]
    Transport(String),

    /// Invalid or missing configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RelayError {
    /// Builds a [`RelayError::Persistence`] from any displayable cause.
    pub fn persistence(
        operation: &'static str,
        key: impl Into<String>,
        cause: impl std::fmt::Display,
    ) -> Self {
        Self::Persistence {
            operation,
            key: key.into(),
            message: cause.to_string(),
        }
    }

    /// Returns the HTTP status code for this variant.
    ///
    /// Only persistence errors can reach the read path in practice;
    /// everything else maps to 500 as a safety net.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
