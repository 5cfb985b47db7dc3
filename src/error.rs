//! HTTP error responses.
//!
//! Every service error enum implements [`ErrorCode`]; the routes layer picks a
//! status for it and wraps both into an [`ApiError`], which renders the shared
//! `{ "code", "message" }` body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use records::ErrorBody;

/// Stable machine-readable code for an error.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into() }
    }

    /// Build from a coded service error. Server-side failures are logged here
    /// and their detail replaced with a generic message.
    #[must_use]
    pub fn from_coded(status: StatusCode, err: &(impl ErrorCode + ?Sized)) -> Self {
        if status.is_server_error() {
            tracing::error!(code = err.error_code(), error = %err, "request failed");
            return Self::new(status, err.error_code(), "internal error");
        }
        Self::new(status, err.error_code(), err.to_string())
    }

    /// Log an uncoded failure and hide its detail.
    #[must_use]
    pub fn internal(context: &'static str, err: &dyn std::fmt::Display) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "store/unavailable", "internal error")
    }

    #[must_use]
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "auth/unauthenticated", "sign in required")
    }

    #[must_use]
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    #[must_use]
    pub fn body(&self) -> ErrorBody {
        ErrorBody { code: self.code.to_owned(), message: self.message.clone() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
