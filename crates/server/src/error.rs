//! Request-time errors.
//!
//! Load-time problems are `data_loader::DataLoadError`. Everything a single
//! request can run into is one of the variants below, and the HTTP layer is
//! the only place they are turned into status codes and JSON.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Errors returned by the ranking orchestrator
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RankError {
    /// Bad anchor combination, non-positive id, malformed input
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Referenced movie (or user, where that matters) does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// No feature data is loaded
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl RankError {
    /// Machine-readable variant name used in error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            RankError::InvalidRequest(_) => "invalid_request",
            RankError::NotFound(_) => "not_found",
            RankError::Unavailable(_) => "unavailable",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RankError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RankError::NotFound(_) => StatusCode::NOT_FOUND,
            RankError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn message(&self) -> &str {
        match self {
            RankError::InvalidRequest(msg)
            | RankError::NotFound(msg)
            | RankError::Unavailable(msg) => msg,
        }
    }
}

impl IntoResponse for RankError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message(),
            "kind": self.kind(),
        }));

        (self.status_code(), body).into_response()
    }
}

pub type RankResult<T> = Result<T, RankError>;
