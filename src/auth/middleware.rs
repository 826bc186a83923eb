use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::AuthContext;
use crate::app::AppState;
use crate::error::ErrorResponse;

/// Extractor that requires authentication
///
/// A missing token is rejected with 401, a token that fails verification
/// with 403.
///
/// ```ignore
/// async fn protected_route(auth: RequireAuth) -> impl IntoResponse {
///     format!("Hello, user {}", auth.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthContext);

impl std::ops::Deref for RequireAuth {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Extractor for routes where a token is welcome but not needed.
///
/// Missing or unverifiable tokens yield `None` instead of a rejection.
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<AuthContext>);

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Access token required",
            ),
            AuthError::InvalidToken(reason) => {
                tracing::debug!(%reason, "Rejecting bearer token");
                (
                    StatusCode::FORBIDDEN,
                    "INVALID_TOKEN",
                    "The provided token is invalid or expired",
                )
            }
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

/// `Authorization: Bearer <token>`; anything else counts as no token.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

async fn authenticate(state: &AppState, token: &str) -> Result<AuthContext, AuthError> {
    let claims = state.verifier.verify(token).await.map_err(|e| {
        tracing::warn!(error = %e, "JWT verification failed");
        AuthError::InvalidToken(e.to_string())
    })?;

    AuthContext::from_claims(&claims).map_err(|e| {
        tracing::warn!(error = %e, "Failed to build auth context");
        AuthError::InvalidToken(e.to_string())
    })
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireAuth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;
        authenticate(state, token).await.map(RequireAuth)
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(OptionalAuth(None));
        };
        Ok(OptionalAuth(authenticate(state, token).await.ok()))
    }
}
