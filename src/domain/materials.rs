//! Material scoring and comparison DTOs and the persisted score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use uuid::Uuid;

use super::catalog::{grade_for_score, materials_to_value, MaterialInput, ProductCategory};
use super::validation::Validator;
use crate::ai::{overall_score, ComparisonEntry, ComparisonSummary, ScoringInput};
use crate::error::ApiError;

pub const MATERIALS_MAX: usize = 10;
pub const MATERIAL_NAME_MAX_CHARS: usize = 100;
pub const COMPARE_MIN_SETS: usize = 2;
pub const COMPARE_MAX_SETS: usize = 5;

fn check_materials(v: &mut Validator, field: &str, materials: &[MaterialInput]) {
    v.check(
        (1..=MATERIALS_MAX).contains(&materials.len()),
        field,
        "Materials must be a non-empty array of at most 10 items",
    );
    for (i, material) in materials.iter().enumerate() {
        v.length(
            &material.name,
            1,
            MATERIAL_NAME_MAX_CHARS,
            &format!("{field}[{i}].name"),
            "Material name is required and must be under 100 characters",
        );
    }
}

/// Request DTO for scoring one material list
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreMaterialsRequest {
    pub materials: Vec<MaterialInput>,
    #[serde(default)]
    pub product_type: Option<ProductCategory>,
    #[serde(default)]
    pub design_id: Option<Uuid>,
}

impl ScoreMaterialsRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        check_materials(&mut v, "materials", &self.materials);
        v.finish()
    }

    pub fn product_type(&self) -> ProductCategory {
        self.product_type.unwrap_or_default()
    }

    pub fn to_input(&self) -> ScoringInput {
        ScoringInput {
            materials: self.materials.clone(),
            product_type: self.product_type(),
        }
    }
}

/// Request DTO for comparing several material lists
#[derive(Debug, Clone, Deserialize)]
pub struct CompareMaterialsRequest {
    pub material_sets: Vec<Vec<MaterialInput>>,
    #[serde(default)]
    pub product_type: Option<ProductCategory>,
}

impl CompareMaterialsRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.check(
            (COMPARE_MIN_SETS..=COMPARE_MAX_SETS).contains(&self.material_sets.len()),
            "material_sets",
            "Material sets must be an array with 2-5 elements",
        );
        for (i, set) in self.material_sets.iter().enumerate() {
            check_materials(&mut v, &format!("material_sets[{i}]"), set);
        }
        v.finish()
    }

    pub fn product_type(&self) -> ProductCategory {
        self.product_type.unwrap_or_default()
    }
}

/// Persisted sustainability score
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MaterialScoreRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub design_id: Option<Uuid>,
    pub materials: Json<Value>,
    pub product_type: String,
    pub sustainability_score: Json<Value>,
    pub overall_score: f64,
    pub grade: String,
    pub created_at: DateTime<Utc>,
}

impl MaterialScoreRecord {
    /// Build the record for a validated scorecard. The model's grade is kept
    /// when present, otherwise it is derived from the overall score.
    pub fn scored(user_id: Uuid, request: &ScoreMaterialsRequest, scorecard: Value) -> Self {
        let score = overall_score(&scorecard).unwrap_or_default();
        let grade = scorecard
            .get("grade")
            .and_then(Value::as_str)
            .filter(|g| !g.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| grade_for_score(score).to_string());

        Self {
            id: Uuid::new_v4(),
            user_id,
            design_id: request.design_id,
            materials: Json(materials_to_value(&request.materials)),
            product_type: request.product_type().as_str().to_string(),
            sustainability_score: Json(scorecard),
            overall_score: score,
            grade,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScoreMeta {
    pub materials_count: usize,
    pub product_type: ProductCategory,
    pub design_id: Option<Uuid>,
}

/// Response for a successful scoring
#[derive(Debug, Serialize)]
pub struct ScoreMaterialsResponse {
    pub message: &'static str,
    pub score: Value,
    /// Id assigned to the (asynchronously saved) score record.
    pub score_id: Option<Uuid>,
    pub analyzed_at: DateTime<Utc>,
    pub meta: ScoreMeta,
}

/// Response for a comparison
#[derive(Debug, Serialize)]
pub struct CompareMaterialsResponse {
    pub message: &'static str,
    pub comparison_results: Vec<ComparisonEntry>,
    pub best_option: Option<ComparisonEntry>,
    pub summary: ComparisonSummary,
    pub analyzed_at: DateTime<Utc>,
}
