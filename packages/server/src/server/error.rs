//! Handler error type.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failures a handler reports to the caller.
///
/// The wrapped error is logged, never sent over the wire.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("failed to persist submission")]
    Persistence(anyhow::Error),

    #[error("failed to load statistics")]
    Stats(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Persistence(_) | ApiError::Stats(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let cause = match &self {
            ApiError::Persistence(e) | ApiError::Stats(e) => e,
        };
        tracing::error!(error = ?cause, "{}", self);

        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
