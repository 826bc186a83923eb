pub mod design;
pub mod health;
pub mod materials;
pub mod me;
pub mod orders;

use axum::{
    http::{Method, StatusCode, Uri},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;

/// Endpoints advertised to clients that hit an unknown path.
pub const AVAILABLE_ENDPOINTS: [&str; 7] = [
    "GET /api/auth/profile",
    "POST /api/design/generate",
    "POST /api/materials/score",
    "POST /api/materials/compare",
    "POST /api/order/submit",
    "GET /api/order/history",
    "GET /health",
];

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        // Identity
        .route("/api/auth/profile", get(me::get_profile))
        // Designs
        .route("/api/design/generate", post(design::generate_designs))
        .route("/api/design/history", get(design::design_history))
        .route("/api/design/:design_id", get(design::get_design))
        // Materials
        .route("/api/materials/score", post(materials::score_materials))
        .route("/api/materials/compare", post(materials::compare_materials))
        .route("/api/materials/history", get(materials::score_history))
        // Orders
        .route("/api/order/submit", post(orders::submit_order))
        .route("/api/order/history", get(orders::order_history))
        .route("/api/order/:order_id", get(orders::get_order))
        .route("/api/order/:order_id/status", patch(orders::update_order_status))
}

#[derive(Serialize)]
pub struct NotFoundResponse {
    pub error: &'static str,
    pub message: String,
    pub available_endpoints: [&'static str; 7],
    pub timestamp: DateTime<Utc>,
}

/// Fallback for unmatched paths
pub async fn not_found(method: Method, uri: Uri) -> (StatusCode, Json<NotFoundResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            error: "Route not found",
            message: format!("The requested endpoint {method} {uri} does not exist"),
            available_endpoints: AVAILABLE_ENDPOINTS,
            timestamp: Utc::now(),
        }),
    )
}

#[cfg(test)]
pub(crate) mod testing {
    //! Router harness wired to scripted models and in-memory storage.

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::ai::runner::testing::ScriptedModel;
    use crate::ai::{DesignTask, ExtractionStrategy, SustainabilityTask, TaskRunner};
    use crate::app::{create_app, AppState};
    use crate::auth::testing::StaticVerifier;
    use crate::config::Settings;
    use crate::services::store::testing::MemoryStore;

    pub const TOKEN: &str = "valid-token";

    pub struct Harness {
        pub app: Router,
        pub store: Arc<MemoryStore>,
        pub design_model: Arc<ScriptedModel>,
        pub scoring_model: Arc<ScriptedModel>,
        pub user_id: Uuid,
    }

    impl Harness {
        pub fn new(design_model: ScriptedModel, scoring_model: ScriptedModel) -> Self {
            let user_id = Uuid::new_v4();
            let store = Arc::new(MemoryStore::default());
            let design_model = Arc::new(design_model);
            let scoring_model = Arc::new(scoring_model);

            let state = AppState::new(
                Settings::for_tests(),
                Arc::new(StaticVerifier::default().with_user(TOKEN, user_id)),
                store.clone(),
                TaskRunner::new(DesignTask, design_model.clone(), ExtractionStrategy::default()),
                TaskRunner::new(
                    SustainabilityTask,
                    scoring_model.clone(),
                    ExtractionStrategy::default(),
                ),
            );

            Self {
                app: create_app(state),
                store,
                design_model,
                scoring_model,
                user_id,
            }
        }

        /// Harness whose models must never be called.
        pub fn offline() -> Self {
            Self::new(ScriptedModel::unreachable(), ScriptedModel::unreachable())
        }

        pub async fn send(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.app.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };
            (status, json)
        }
    }

    /// Let detached writes run on the current-thread test runtime.
    pub async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::Harness;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn unknown_paths_list_endpoints() {
        let harness = Harness::offline();
        let (status, body) = harness.send("GET", "/api/nowhere", None, None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Route not found");
        assert_eq!(
            body["message"],
            "The requested endpoint GET /api/nowhere does not exist"
        );
        assert!(body["available_endpoints"]
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e == "POST /api/design/generate"));
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;

        let harness = Harness::offline();
        let response = harness
            .app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.headers().contains_key("x-request-id"));
    }
}
