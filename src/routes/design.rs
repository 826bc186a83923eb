//! Design generation endpoints.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::ai::TaskResult;
use crate::api::{FallbackResponse, Paginated, PaginationParams};
use crate::app::AppState;
use crate::auth::{OptionalAuth, RequireAuth};
use crate::domain::{
    DesignDetailResponse, DesignMeta, DesignRecord, GenerateDesignRequest,
    GenerateDesignResponse,
};
use crate::error::{ApiError, ApiResult};
use crate::middleware::RequestIdExt;
use crate::services::spawn_detached;

/// POST /api/design/generate
///
/// Signed-in callers get the session saved in the background; the response
/// does not wait for it.
pub async fn generate_designs(
    OptionalAuth(auth): OptionalAuth,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateDesignRequest>,
) -> ApiResult<Response> {
    req.validate()?;

    tracing::info!(
        request_id = headers.request_id(),
        user_id = auth.as_ref().map(|a| a.user_id.to_string()),
        category = %req.category(),
        "Generating designs"
    );

    let (data, generated_at) = match state.design_runner.run(&req.to_input()).await? {
        TaskResult::Success { data, generated_at } => (data, generated_at),
        TaskResult::Fallback { error, fallback } => {
            return Ok(
                FallbackResponse::new("Design generation failed", error, fallback).into_response(),
            );
        }
    };

    let designs = data.get("designs").cloned().unwrap_or(Value::Null);
    let sustainability_tips = data
        .get("sustainability_tips")
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));
    let total_designs = designs.as_array().map_or(0, Vec::len);

    let session_id = auth.map(|auth| {
        let record = DesignRecord::generated(auth.user_id, &req, designs.clone());
        let id = record.id;
        let store = state.store.clone();
        spawn_detached("design", async move { store.insert_design(&record).await });
        id
    });

    Ok(Json(GenerateDesignResponse {
        message: "Designs generated successfully",
        designs,
        sustainability_tips,
        session_id,
        generated_at,
        meta: DesignMeta {
            prompt: req.prompt.trim().to_string(),
            category: req.category(),
            total_designs,
        },
    })
    .into_response())
}

/// GET /api/design/history
pub async fn design_history(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Paginated<DesignRecord>> {
    params.validate()?;

    let (designs, total) = state
        .store
        .list_designs(auth.user_id, params.page_request())
        .await?;

    Ok(Paginated::new(designs, &params, total))
}

/// GET /api/design/:design_id
pub async fn get_design(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(design_id): Path<Uuid>,
) -> ApiResult<Json<DesignDetailResponse>> {
    let design = state
        .store
        .get_design(auth.user_id, design_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(
                "The requested design does not exist or you do not have access to it".to_string(),
            )
        })?;

    Ok(Json(DesignDetailResponse { design }))
}
