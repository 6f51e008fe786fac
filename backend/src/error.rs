//! Error handling for the Fragrance Production Engine
//!
//! Maps service failures to consistent JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{TransitionError, ValidationErrors};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Order has validation errors: {0}")]
    OrderInvalid(ValidationErrors),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // Business logic errors
    #[error("Transition refused: {0}")]
    TransitionRefused(#[from] TransitionError),

    // Store errors
    #[error("Store error: {0}")]
    Store(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Field → message map for order validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ValidationErrors>,
}

impl ErrorDetail {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
            details: None,
        }
    }
}

impl AppError {
    fn status_and_detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    field: Some(field.clone()),
                    ..ErrorDetail::new("VALIDATION_ERROR", message.clone())
                },
            ),
            AppError::OrderInvalid(errors) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    details: Some(errors.clone()),
                    ..ErrorDetail::new("ORDER_INVALID", "The order has validation errors")
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorDetail::new("CONFLICT", msg.clone()),
            ),
            AppError::TransitionRefused(err) => {
                let detail = match err {
                    TransitionError::ValidationFailed { errors, .. } => ErrorDetail {
                        details: Some(errors.clone()),
                        ..ErrorDetail::new("INVALID_STATE_TRANSITION", err.to_string())
                    },
                    TransitionError::InsufficientStock { .. } => {
                        ErrorDetail::new("INSUFFICIENT_INVENTORY", err.to_string())
                    }
                    TransitionError::Terminal { .. } | TransitionError::IllegalTarget { .. } => {
                        ErrorDetail::new("INVALID_STATE_TRANSITION", err.to_string())
                    }
                };
                (StatusCode::UNPROCESSABLE_ENTITY, detail)
            }
            AppError::Store(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail::new("STORE_ERROR", format!("Store error: {}", msg)),
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("DATABASE_ERROR", "A database error occurred"),
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", "An internal server error occurred"),
            ),
        }
    }

    /// HTTP status this error maps to
    pub fn status_code(&self) -> StatusCode {
        self.status_and_detail().0
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.status_and_detail();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
