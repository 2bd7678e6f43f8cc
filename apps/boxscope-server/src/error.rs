//! Error types for the Boxscope server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::extraction::InvalidOcrMode;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unparsable PDF '{name}': {reason}")]
    UnparsablePdf { name: String, reason: String },

    #[error("Invalid OCR mode: {0} (expected off, auto or full)")]
    InvalidOcrMode(String),

    #[error("Extraction failed for '{document}' page {page}: {reason}")]
    ExtractionFailure {
        document: String,
        page: usize,
        reason: String,
    },

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<InvalidOcrMode> for AppError {
    fn from(e: InvalidOcrMode) -> Self {
        AppError::InvalidOcrMode(e.0)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("Worker task failed: {}", e))
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::UnparsablePdf { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "unparsable_pdf"),
            AppError::InvalidOcrMode(_) => (StatusCode::BAD_REQUEST, "invalid_ocr_mode"),
            AppError::ExtractionFailure { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "extraction_failure")
            }
            AppError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "session_not_found"),
            AppError::DocumentNotFound(_) => (StatusCode::NOT_FOUND, "document_not_found"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_kind();

        let message = match &self {
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            AppError::ExtractionFailure { .. } | AppError::UnparsablePdf { .. } => {
                tracing::warn!("{}", self);
                self.to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details: if cfg!(debug_assertions) {
                Some(format!("{:?}", self))
            } else {
                None
            },
        });

        (status, body).into_response()
    }
}
