//! Manufacturing order endpoints. All of them require a signed-in user.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{Created, Paginated, PaginationParams};
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::{
    estimate_delivery, OrderDetailResponse, OrderRecord, OrderStatus, OrderSummary,
    OrderUpdatedResponse, SubmitOrderRequest, SubmitOrderResponse, UpdateOrderStatusRequest,
    NEXT_STEPS,
};
use crate::error::{ApiError, ApiResult};

const ORDER_NOT_FOUND: &str =
    "The requested order does not exist or you do not have access to it";

/// Query for order history
#[derive(Debug, Deserialize)]
pub struct OrderHistoryQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<OrderStatus>,
}

impl OrderHistoryQuery {
    fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// POST /api/order/submit
pub async fn submit_order(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitOrderRequest>,
) -> ApiResult<Created<SubmitOrderResponse>> {
    req.validate()?;

    let now = Utc::now();
    let order = OrderRecord::pending(auth.user_id, &req, now);
    state.store.insert_order(&order).await?;

    tracing::info!(
        user_id = %auth.user_id,
        order_id = %order.id,
        order_number = %order.order_number,
        "Order submitted"
    );

    Ok(Created(SubmitOrderResponse {
        message: "Order submitted successfully",
        order: OrderSummary::from(&order),
        next_steps: NEXT_STEPS,
        estimated_delivery: estimate_delivery(&req.preferences(), now),
    }))
}

/// GET /api/order/history
pub async fn order_history(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(query): Query<OrderHistoryQuery>,
) -> ApiResult<Paginated<OrderRecord>> {
    let params = query.pagination();
    params.validate()?;

    let (orders, total) = state
        .store
        .list_orders(auth.user_id, query.status, params.page_request())
        .await?;

    Ok(Paginated::new(orders, &params, total))
}

/// GET /api/order/:order_id
pub async fn get_order(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
) -> ApiResult<Json<OrderDetailResponse>> {
    let order = state
        .store
        .get_order(auth.user_id, order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(ORDER_NOT_FOUND.to_string()))?;

    Ok(Json(OrderDetailResponse { order }))
}

/// PATCH /api/order/:order_id/status
///
/// Customers may only cancel; every other transition belongs to operations.
pub async fn update_order_status(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> ApiResult<Json<OrderUpdatedResponse>> {
    if !req.status.is_customer_settable() {
        return Err(ApiError::Forbidden(
            "You are not authorized to update to this status".to_string(),
        ));
    }
    req.validate()?;

    let order = state
        .store
        .update_order_status(auth.user_id, order_id, req.status, req.notes)
        .await?
        .ok_or_else(|| ApiError::NotFound(ORDER_NOT_FOUND.to_string()))?;

    tracing::info!(order_id = %order.id, status = %order.status, "Order status updated");

    Ok(Json(OrderUpdatedResponse {
        message: "Order status updated successfully",
        order,
    }))
}

#[cfg(test)]
mod tests {
    use crate::routes::testing::{Harness, TOKEN};
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    fn order_body() -> Value {
        json!({
            "design_id": uuid::Uuid::new_v4(),
            "selected_materials": [{"name": "Organic Cotton"}],
            "quantity": 3,
            "shipping_address": {
                "street": "12 Green Lane",
                "city": "Portland",
                "state": "OR",
                "zip_code": "97201",
                "country": "US"
            },
            "manufacturing_preferences": {"prefer_local": true},
            "estimated_price": 45
        })
    }

    async fn submit(harness: &Harness) -> Value {
        let (status, body) = harness
            .send("POST", "/api/order/submit", Some(TOKEN), Some(order_body()))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    #[tokio::test]
    async fn submit_creates_a_pending_order() {
        let harness = Harness::offline();
        let body = submit(&harness).await;

        assert_eq!(body["message"], "Order submitted successfully");
        assert_eq!(body["order"]["status"], "pending");
        assert_eq!(body["order"]["quantity"], 3);
        assert!(body["order"]["order_number"]
            .as_str()
            .unwrap()
            .starts_with("SPO-"));
        assert_eq!(body["next_steps"].as_array().unwrap().len(), 5);
        assert_eq!(body["estimated_delivery"]["estimated_days"], 10);
        assert_eq!(body["estimated_delivery"]["factors"]["local_manufacturing"], true);
        assert_eq!(harness.store.orders.lock().len(), 1);
    }

    #[tokio::test]
    async fn submit_requires_a_token() {
        let harness = Harness::offline();
        let (status, _) = harness
            .send("POST", "/api/order/submit", None, Some(order_body()))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(harness.store.orders.lock().is_empty());
    }

    #[tokio::test]
    async fn invalid_address_is_rejected() {
        let harness = Harness::offline();
        let mut body = order_body();
        body["shipping_address"]["street"] = json!("1 A");

        let (status, body) = harness
            .send("POST", "/api/order/submit", Some(TOKEN), Some(body))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["field"], "shipping_address.street");
    }

    #[tokio::test]
    async fn history_filters_by_status() {
        let harness = Harness::offline();
        submit(&harness).await;
        let second = submit(&harness).await;
        let id = second["order"]["id"].as_str().unwrap().to_string();

        let (status, _) = harness
            .send(
                "PATCH",
                &format!("/api/order/{id}/status"),
                Some(TOKEN),
                Some(json!({"status": "cancelled", "notes": "Ordered twice"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (_, all) = harness
            .send("GET", "/api/order/history", Some(TOKEN), None)
            .await;
        assert_eq!(all["pagination"]["total"], 2);

        let (_, cancelled) = harness
            .send("GET", "/api/order/history?status=cancelled", Some(TOKEN), None)
            .await;
        assert_eq!(cancelled["pagination"]["total"], 1);
        assert_eq!(cancelled["data"][0]["id"], id.as_str());
        assert_eq!(cancelled["data"][0]["notes"], "Ordered twice");
    }

    #[tokio::test]
    async fn only_cancellation_is_allowed() {
        let harness = Harness::offline();
        let body = submit(&harness).await;
        let id = body["order"]["id"].as_str().unwrap().to_string();

        let (status, _) = harness
            .send(
                "PATCH",
                &format!("/api/order/{id}/status"),
                Some(TOKEN),
                Some(json!({"status": "shipped"})),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, detail) = harness
            .send("GET", &format!("/api/order/{id}"), Some(TOKEN), None)
            .await;
        assert_eq!(detail["order"]["status"], "pending");
    }

    #[tokio::test]
    async fn unknown_order_is_404() {
        let harness = Harness::offline();
        let missing = uuid::Uuid::new_v4();

        let (status, _) = harness
            .send("GET", &format!("/api/order/{missing}"), Some(TOKEN), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = harness
            .send(
                "PATCH",
                &format!("/api/order/{missing}/status"),
                Some(TOKEN),
                Some(json!({"status": "cancelled"})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn far_page_of_history_is_empty() {
        let harness = Harness::offline();
        submit(&harness).await;

        let (status, body) = harness
            .send(
                "GET",
                "/api/order/history?page=100000000&limit=50",
                Some(TOKEN),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 0);
        assert_eq!(body["pagination"]["total"], 1);
        assert_eq!(body["pagination"]["has_next"], false);
    }
}
