//! Manufacturing orders.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::types::Json;
use std::str::FromStr;
use uuid::Uuid;

use super::catalog::{materials_to_value, MaterialInput};
use super::validation::Validator;
use crate::error::ApiError;

pub const ORDER_QUANTITY_MAX: i32 = 100;
pub const NOTES_MAX_CHARS: usize = 500;
const BASE_DELIVERY_DAYS: u32 = 14;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    InProduction,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::InProduction => "in_production",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Statuses a customer may set on their own order.
    pub fn is_customer_settable(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "in_production" => Ok(Self::InProduction),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManufacturingPreferences {
    #[serde(default)]
    pub prefer_local: bool,
    #[serde(default)]
    pub rush_order: bool,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Request DTO for submitting an order
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitOrderRequest {
    pub design_id: Uuid,
    #[serde(default)]
    pub material_score_id: Option<Uuid>,
    pub selected_materials: Vec<MaterialInput>,
    #[serde(default)]
    pub customizations: Option<Map<String, Value>>,
    #[serde(default)]
    pub quantity: Option<i32>,
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub manufacturing_preferences: Option<ManufacturingPreferences>,
    pub estimated_price: Decimal,
}

impl SubmitOrderRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.check(
            !self.selected_materials.is_empty(),
            "selected_materials",
            "Selected materials must be a non-empty array",
        );
        if let Some(quantity) = self.quantity {
            v.check(
                (1..=ORDER_QUANTITY_MAX).contains(&quantity),
                "quantity",
                "Quantity must be between 1 and 100",
            );
        }

        let address = &self.shipping_address;
        v.length(&address.street, 5, 200, "shipping_address.street", "Street address is required");
        v.length(&address.city, 2, 100, "shipping_address.city", "City is required");
        v.length(&address.state, 2, 100, "shipping_address.state", "State is required");
        v.length(&address.zip_code, 5, 10, "shipping_address.zip_code", "Valid zip code is required");
        v.length(&address.country, 2, 100, "shipping_address.country", "Country is required");

        v.check(
            !self.estimated_price.is_sign_negative(),
            "estimated_price",
            "Estimated price must be a positive number",
        );
        v.finish()
    }

    pub fn preferences(&self) -> ManufacturingPreferences {
        self.manufacturing_preferences.clone().unwrap_or_default()
    }
}

/// Request DTO for a customer status change
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

impl UpdateOrderStatusRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        if let Some(notes) = &self.notes {
            v.length(notes, 0, NOTES_MAX_CHARS, "notes", "Notes must be under 500 characters");
        }
        v.finish()
    }
}

/// Persisted order
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub design_id: Uuid,
    pub material_score_id: Option<Uuid>,
    pub selected_materials: Json<Value>,
    pub customizations: Json<Value>,
    pub quantity: i32,
    pub shipping_address: Json<Value>,
    pub manufacturing_preferences: Json<Value>,
    pub estimated_price: Decimal,
    pub status: String,
    pub order_number: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl OrderRecord {
    pub fn pending(user_id: Uuid, request: &SubmitOrderRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            design_id: request.design_id,
            material_score_id: request.material_score_id,
            selected_materials: Json(materials_to_value(&request.selected_materials)),
            customizations: Json(Value::Object(
                request.customizations.clone().unwrap_or_default(),
            )),
            quantity: request.quantity.unwrap_or(1),
            shipping_address: Json(address_to_value(&request.shipping_address)),
            manufacturing_preferences: Json(preferences_to_value(&request.preferences())),
            estimated_price: request.estimated_price,
            status: OrderStatus::Pending.as_str().to_string(),
            order_number: generate_order_number(now),
            notes: None,
            created_at: now,
            updated_at: None,
        }
    }
}

fn address_to_value(address: &ShippingAddress) -> Value {
    let mut object = Map::new();
    object.insert("street".to_string(), address.street.clone().into());
    object.insert("city".to_string(), address.city.clone().into());
    object.insert("state".to_string(), address.state.clone().into());
    object.insert("zip_code".to_string(), address.zip_code.clone().into());
    object.insert("country".to_string(), address.country.clone().into());
    Value::Object(object)
}

fn preferences_to_value(preferences: &ManufacturingPreferences) -> Value {
    let mut object = preferences.other.clone();
    object.insert("prefer_local".to_string(), preferences.prefer_local.into());
    object.insert("rush_order".to_string(), preferences.rush_order.into());
    Value::Object(object)
}

fn to_base36(mut n: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// `SPO-<base36 millis>-<5 random base36 chars>`, upper-case.
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().max(0) as u128;
    let random = to_base36(Uuid::new_v4().as_u128());
    let suffix: String = random.chars().rev().take(5).collect();
    format!("SPO-{}-{}", to_base36(millis), suffix).to_uppercase()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryFactors {
    pub base_days: u32,
    pub local_manufacturing: bool,
    pub rush_order: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryEstimate {
    pub estimated_days: u32,
    pub estimated_date: NaiveDate,
    pub factors: DeliveryFactors,
}

/// 14 days, shortened by local manufacturing (x0.7) and rush orders (x0.5).
pub fn estimate_delivery(
    preferences: &ManufacturingPreferences,
    today: DateTime<Utc>,
) -> DeliveryEstimate {
    // Multipliers in tenths keep the ceiling exact: 14 * 0.7 is 9.8 -> 10.
    let local = if preferences.prefer_local { 7 } else { 10 };
    let rush = if preferences.rush_order { 5 } else { 10 };
    let estimated_days = (BASE_DELIVERY_DAYS * local * rush).div_ceil(100);

    DeliveryEstimate {
        estimated_days,
        estimated_date: (today + Duration::days(i64::from(estimated_days))).date_naive(),
        factors: DeliveryFactors {
            base_days: BASE_DELIVERY_DAYS,
            local_manufacturing: preferences.prefer_local,
            rush_order: preferences.rush_order,
        },
    }
}

/// Summary of a newly submitted order
#[derive(Debug, Serialize)]
pub struct OrderSummary {
    pub id: Uuid,
    pub order_number: String,
    pub status: String,
    pub estimated_price: Decimal,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl From<&OrderRecord> for OrderSummary {
    fn from(order: &OrderRecord) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number.clone(),
            status: order.status.clone(),
            estimated_price: order.estimated_price,
            quantity: order.quantity,
            created_at: order.created_at,
        }
    }
}

pub const NEXT_STEPS: [&str; 5] = [
    "Design review and optimization",
    "Material sourcing and verification",
    "Manufacturing partner assignment",
    "Production scheduling",
    "Quality assurance and shipping",
];

/// Response for a submitted order
#[derive(Debug, Serialize)]
pub struct SubmitOrderResponse {
    pub message: &'static str,
    pub order: OrderSummary,
    pub next_steps: [&'static str; 5],
    pub estimated_delivery: DeliveryEstimate,
}

#[derive(Debug, Serialize)]
pub struct OrderDetailResponse {
    pub order: OrderRecord,
}

#[derive(Debug, Serialize)]
pub struct OrderUpdatedResponse {
    pub message: &'static str,
    pub order: OrderRecord,
}
