//! Material sustainability scoring endpoints.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::ai::{compare_material_sets, TaskResult};
use crate::api::{FallbackResponse, Paginated, PaginationParams};
use crate::app::AppState;
use crate::auth::{OptionalAuth, RequireAuth};
use crate::domain::{
    CompareMaterialsRequest, CompareMaterialsResponse, MaterialScoreRecord, ScoreMaterialsRequest,
    ScoreMaterialsResponse, ScoreMeta,
};
use crate::error::ApiResult;
use crate::services::spawn_detached;

/// POST /api/materials/score
pub async fn score_materials(
    OptionalAuth(auth): OptionalAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScoreMaterialsRequest>,
) -> ApiResult<Response> {
    req.validate()?;

    tracing::info!(
        materials = req.materials.len(),
        product_type = %req.product_type(),
        "Scoring materials"
    );

    let (score, analyzed_at) = match state.scoring_runner.run(&req.to_input()).await? {
        TaskResult::Success { data, generated_at } => (data, generated_at),
        TaskResult::Fallback { error, fallback } => {
            return Ok(FallbackResponse::new("Sustainability scoring failed", error, fallback)
                .into_response());
        }
    };

    let score_id = auth.map(|auth| {
        let record = MaterialScoreRecord::scored(auth.user_id, &req, score.clone());
        let id = record.id;
        let store = state.store.clone();
        spawn_detached("material_score", async move {
            store.insert_material_score(&record).await
        });
        id
    });

    Ok(Json(ScoreMaterialsResponse {
        message: "Sustainability score generated successfully",
        score,
        score_id,
        analyzed_at,
        meta: ScoreMeta {
            materials_count: req.materials.len(),
            product_type: req.product_type(),
            design_id: req.design_id,
        },
    })
    .into_response())
}

/// POST /api/materials/compare
///
/// Per-set failures are reported inside the result, so this always answers 200
/// once the request is valid.
pub async fn compare_materials(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CompareMaterialsRequest>,
) -> ApiResult<Json<CompareMaterialsResponse>> {
    req.validate()?;

    let product_type = req.product_type();
    tracing::info!(sets = req.material_sets.len(), %product_type, "Comparing material sets");

    let comparison =
        compare_material_sets(&state.scoring_runner, req.material_sets, product_type).await;

    let best_option = comparison.best_option().cloned();
    let summary = comparison.summary();

    Ok(Json(CompareMaterialsResponse {
        message: "Material comparison completed",
        comparison_results: comparison.entries,
        best_option,
        summary,
        analyzed_at: Utc::now(),
    }))
}

/// GET /api/materials/history
pub async fn score_history(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Paginated<MaterialScoreRecord>> {
    params.validate()?;

    let (scores, total) = state
        .store
        .list_material_scores(auth.user_id, params.page_request())
        .await?;

    Ok(Paginated::new(scores, &params, total))
}

#[cfg(test)]
mod tests {
    use crate::ai::runner::testing::ScriptedModel;
    use crate::ai::{AiTask, SustainabilityTask, TransportError};
    use crate::routes::testing::{settle, Harness, TOKEN};
    use axum::http::StatusCode;
    use serde_json::json;

    fn scorecard(score: f64) -> String {
        format!(
            r#"Analysis: {{"overall_score": {score}, "grade": "B", "categories": {{"carbon_footprint": {{"score": {score}}}}}}}"#
        )
    }

    #[tokio::test]
    async fn score_uses_low_temperature_and_saves_for_signed_in_users() {
        let harness = Harness::new(
            ScriptedModel::unreachable(),
            ScriptedModel::replying(&scorecard(8.2)),
        );
        let (status, body) = harness
            .send(
                "POST",
                "/api/materials/score",
                Some(TOKEN),
                Some(json!({"materials": [{"name": "Recycled PET", "percentage": 60}], "product_type": "bags"})),
            )
            .await;
        settle().await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"]["overall_score"], 8.2);
        assert_eq!(body["meta"]["materials_count"], 1);
        assert_eq!(body["meta"]["product_type"], "bags");

        let scores = harness.store.scores.lock();
        assert_eq!(scores.len(), 1);
        assert_eq!(body["score_id"], scores[0].id.to_string());

        let calls = harness.scoring_model.calls.lock();
        assert_eq!(calls[0].1.temperature, Some(0.3));
        assert_eq!(calls[0].1.max_tokens, Some(1000));
        assert!(calls[0].0.contains(r#""percentage":60"#));
    }

    #[tokio::test]
    async fn score_fallback_is_a_500_with_the_default_scorecard() {
        let harness = Harness::new(
            ScriptedModel::unreachable(),
            ScriptedModel::replying(r#"{"overall_score": "high"}"#),
        );
        let (status, body) = harness
            .send(
                "POST",
                "/api/materials/score",
                None,
                Some(json!({"materials": [{"name": "Hemp"}]})),
            )
            .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Sustainability scoring failed");
        assert_eq!(body["fallback_data"], SustainabilityTask.fallback());
    }

    #[tokio::test]
    async fn compare_isolates_failures_and_picks_the_best() {
        let scoring = ScriptedModel::new(|prompt| {
            if prompt.contains("Cork") {
                Err(TransportError::Network {
                    provider: "scripted",
                    message: "reset".to_string(),
                })
            } else if prompt.contains("Hemp") {
                Ok(scorecard(9.0))
            } else {
                Ok(scorecard(7.0))
            }
        });
        let harness = Harness::new(ScriptedModel::unreachable(), scoring);

        let (status, body) = harness
            .send(
                "POST",
                "/api/materials/compare",
                None,
                Some(json!({
                    "material_sets": [
                        [{"name": "Cotton"}],
                        [{"name": "Cork"}],
                        [{"name": "Hemp"}]
                    ],
                    "product_type": "clothing"
                })),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        let results = body["comparison_results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[1]["success"], false);
        assert!(results[1]["error"].is_string());
        assert_eq!(body["best_option"]["set_index"], 2);
        assert_eq!(body["summary"]["total_sets"], 3);
        assert_eq!(body["summary"]["successful_analyses"], 2);
        assert_eq!(body["summary"]["best_score"], 9.0);
    }

    #[tokio::test]
    async fn compare_with_one_set_is_rejected() {
        let harness = Harness::offline();
        let (status, _) = harness
            .send(
                "POST",
                "/api/materials/compare",
                None,
                Some(json!({"material_sets": [[{"name": "Hemp"}]]})),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn history_requires_a_token() {
        let harness = Harness::offline();
        let (status, _) = harness.send("GET", "/api/materials/history", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = harness
            .send("GET", "/api/materials/history", Some(TOKEN), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["limit"], 10);
    }
}
