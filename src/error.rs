//! Unified API error handling
//!
//! Provides consistent error responses across all endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::ai::TransportError;

/// A single rejected request field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("AI service error: {0}")]
    AiService(#[from] TransportError),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::AiService(_) | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::AiService(_) => "AI_SERVICE_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Forbidden(msg) | Self::NotFound(msg) => msg.clone(),
            Self::Validation(_) => "Validation failed".to_string(),
            // Don't leak provider or internal details
            Self::AiService(_) => "AI service temporarily unavailable".to_string(),
            Self::Database(_) => "Database operation failed".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::AiService(e) => {
                tracing::error!(error = %e, "AI provider failure");
            }
            Self::Database(e) => {
                tracing::error!(error = ?e, "Database error");
            }
            _ => {
                tracing::warn!(error = %self, "API error");
            }
        }

        let status = self.status_code();
        let mut body = ErrorResponse::new(self.error_code(), self.public_message());
        if let Self::Validation(fields) = self {
            body.details = Some(fields);
        }

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
