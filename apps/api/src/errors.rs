use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Errors a scanner can surface to its caller.
///
/// A backend that answers with unusable text is not an error: the result parser
/// absorbs it into a fallback `ScoreResult`.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Scoring backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Scoring timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },
}

impl From<LlmError> for ScoringError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Timeout { after_ms } => ScoringError::Timeout { after_ms },
            other => ScoringError::BackendUnavailable(other.to_string()),
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Too many scoring requests, slow down".to_string(),
            ),
            AppError::Scoring(ScoringError::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Scoring(ScoringError::BackendUnavailable(msg)) => {
                tracing::error!("Scoring backend error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "BACKEND_UNAVAILABLE",
                    "The scoring backend could not be reached".to_string(),
                )
            }
            AppError::Scoring(e @ ScoringError::Timeout { .. }) => {
                tracing::error!("{e}");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "SCORING_TIMEOUT",
                    "The scoring backend did not answer in time".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
