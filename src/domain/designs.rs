//! Design generation DTOs and the persisted design session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::types::Json;
use uuid::Uuid;

use super::catalog::ProductCategory;
use super::validation::Validator;
use crate::ai::DesignInput;
use crate::error::ApiError;

pub const PROMPT_MIN_CHARS: usize = 10;
pub const PROMPT_MAX_CHARS: usize = 500;

/// Request DTO for design generation
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateDesignRequest {
    pub prompt: String,
    #[serde(default)]
    pub preferences: Option<Map<String, Value>>,
    #[serde(default)]
    pub category: Option<ProductCategory>,
}

impl GenerateDesignRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.length(
            self.prompt.trim(),
            PROMPT_MIN_CHARS,
            PROMPT_MAX_CHARS,
            "prompt",
            "Prompt must be between 10 and 500 characters",
        );
        v.finish()
    }

    pub fn category(&self) -> ProductCategory {
        self.category.unwrap_or_default()
    }

    /// Model input: trimmed prompt, preferences with the category merged in.
    pub fn to_input(&self) -> DesignInput {
        let mut preferences = self.preferences.clone().unwrap_or_default();
        preferences.insert(
            "category".to_string(),
            Value::String(self.category().as_str().to_string()),
        );

        DesignInput {
            prompt: self.prompt.trim().to_string(),
            preferences,
        }
    }
}

/// Persisted design session
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DesignRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub prompt: String,
    pub preferences: Json<Value>,
    pub generated_designs: Json<Value>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl DesignRecord {
    pub fn generated(
        user_id: Uuid,
        request: &GenerateDesignRequest,
        designs: Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            prompt: request.prompt.trim().to_string(),
            preferences: Json(Value::Object(
                request.preferences.clone().unwrap_or_default(),
            )),
            generated_designs: Json(designs),
            status: "generated".to_string(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DesignMeta {
    pub prompt: String,
    pub category: ProductCategory,
    pub total_designs: usize,
}

/// Response for a successful generation
#[derive(Debug, Serialize)]
pub struct GenerateDesignResponse {
    pub message: &'static str,
    pub designs: Value,
    pub sustainability_tips: Value,
    /// Id assigned to the (asynchronously saved) design session.
    pub session_id: Option<Uuid>,
    pub generated_at: DateTime<Utc>,
    pub meta: DesignMeta,
}

#[derive(Debug, Serialize)]
pub struct DesignDetailResponse {
    pub design: DesignRecord,
}
