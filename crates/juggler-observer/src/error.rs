//! Error types for the control surface.
//!
//! [`ObserverError`] unifies all request-level failures into a single enum
//! that converts into a JSON HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use juggler_core::ControlError;

/// Errors that can occur in the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The start parameters were rejected by the control contract.
    #[error("{0}")]
    InvalidParameters(String),

    /// The request body could not be decoded.
    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

impl ObserverError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidParameters(_) | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<ControlError> for ObserverError {
    fn from(err: ControlError) -> Self {
        match err {
            ControlError::InvalidParameters(msg) => Self::InvalidParameters(msg),
        }
    }
}

impl From<JsonRejection> for ObserverError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_errors_are_bad_requests() {
        let err = ObserverError::from(ControlError::InvalidParameters(String::from(
            "balls and time must be positive",
        )));
        assert_eq!(err.to_string(), "balls and time must be positive");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn body_errors_are_bad_requests() {
        let err = ObserverError::InvalidBody(String::from("expected value"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().starts_with("invalid request body"));
    }
}
