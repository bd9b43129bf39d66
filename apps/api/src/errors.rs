use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extract::UnreadableFileError;
use crate::screening::validation::PreconditionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    UnreadableFile(#[from] UnreadableFileError),

    #[error("Analysis completed but returned incomplete data. Please try again.")]
    InvalidScreeningResult,

    #[error("{0}")]
    RemoteScoring(String),

    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Machine-readable error code, as sent in the `error.code` field.
    pub fn code(&self) -> &'static str {
        self.status_and_code().1
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::UnreadableFile(_) => (StatusCode::UNPROCESSABLE_ENTITY, "UNREADABLE_FILE"),
            AppError::InvalidScreeningResult => (StatusCode::BAD_GATEWAY, "INVALID_SCREENING_RESULT"),
            AppError::RemoteScoring(_) => (StatusCode::BAD_GATEWAY, "REMOTE_SCORING_ERROR"),
            AppError::Precondition(_) => (StatusCode::BAD_REQUEST, "PRECONDITION_FAILED"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            AppError::Unauthorized => "Authentication required".to_string(),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                "A database error occurred".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
            AppError::RemoteScoring(msg) => {
                tracing::warn!("Remote scoring error: {msg}");
                msg.clone()
            }
            AppError::Validation(msg) | AppError::NotFound(msg) => msg.clone(),
            other => other.to_string(),
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
