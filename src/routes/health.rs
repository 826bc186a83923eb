use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
    pub services: ServiceHealth,
}

#[derive(Serialize)]
pub struct ServiceHealth {
    pub database: &'static str,
    pub design_model: String,
    pub scoring_model: String,
}

/// Health check endpoint - public
///
/// Model providers are reported by name only; probing them would spend quota.
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let db_result = state.store.health_check().await;
    if let Err(e) = &db_result {
        tracing::warn!(error = %e, "Database health check failed");
    }

    let (status, status_code, database) = match db_result {
        Ok(()) => ("healthy", StatusCode::OK, "ok"),
        Err(_) => ("unhealthy", StatusCode::SERVICE_UNAVAILABLE, "error"),
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now(),
            services: ServiceHealth {
                database,
                design_model: state.design_runner.provider().to_string(),
                scoring_model: state.scoring_runner.provider().to_string(),
            },
        }),
    )
}
