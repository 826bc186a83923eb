//! Standard API response types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

/// Helper for creating responses with status codes
pub struct Created<T: Serialize>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

/// 500 carrying a displayable substitute payload after unusable model output.
#[derive(Debug, Serialize)]
pub struct FallbackResponse {
    pub error: &'static str,
    pub message: String,
    pub fallback_data: Value,
}

impl FallbackResponse {
    pub fn new(error: &'static str, message: impl Into<String>, fallback_data: Value) -> Self {
        Self {
            error,
            message: message.into(),
            fallback_data,
        }
    }
}

impl IntoResponse for FallbackResponse {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}
