//! AI response normalization layer.
//!
//! Every AI feature goes through the same pipeline:
//! prompt -> model text -> extracted JSON -> schema check -> result or fallback.
//!
//! Task-specific behaviour (prompt wording, required fields, fallback payload)
//! lives behind the [`AiTask`] trait so one [`TaskRunner`] serves all tasks.

pub mod compare;
pub mod design;
pub mod extract;
pub mod model;
pub mod runner;
pub mod scoring;

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

pub use compare::{compare_material_sets, ComparisonEntry, ComparisonSummary};
pub use design::{DesignInput, DesignTask};
pub use extract::ExtractionStrategy;
pub use model::{ModelParams, TextModel, TransportError};
pub use runner::TaskRunner;
pub use scoring::{ScoringInput, SustainabilityTask};

/// Recoverable failures while turning model text into a payload.
///
/// None of these reach the caller as errors: the runner converts every one of
/// them into [`TaskResult::Fallback`].
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("no JSON object found in response")]
    NoStructuredPayload,

    #[error("malformed JSON payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("invalid response structure: {0}")]
    InvalidSchema(String),
}

/// Strategy object describing one AI task.
pub trait AiTask: Send + Sync {
    /// What the caller supplies for one run.
    type Input: Send + Sync;

    /// Short task name used in logs and error messages.
    const NAME: &'static str;

    /// Build the full instruction text sent to the model.
    fn build_prompt(&self, input: &Self::Input) -> String;

    /// Sampling parameters for this task.
    fn model_params(&self) -> ModelParams {
        ModelParams::default()
    }

    /// Check the minimum structure a payload needs for this task.
    fn validate(&self, payload: &Value) -> Result<(), TaskError>;

    /// Static payload returned when the model output cannot be trusted.
    fn fallback(&self) -> Value;
}

/// Outcome of one AI task run.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskResult {
    /// The model returned a usable payload.
    Success {
        data: Value,
        generated_at: DateTime<Utc>,
    },
    /// The model responded but its output was unusable; `fallback` is always
    /// valid for the task and can be shown as-is.
    Fallback { error: String, fallback: Value },
}

impl TaskResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Numeric `overall_score` of a scoring payload, if present.
pub fn overall_score(payload: &Value) -> Option<f64> {
    payload.get("overall_score").and_then(Value::as_f64)
}
