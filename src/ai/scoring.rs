//! Material sustainability scoring task.

use serde_json::{json, Value};

use super::{AiTask, ModelParams, TaskError};
use crate::domain::catalog::{materials_to_value, MaterialInput, ProductCategory};

/// Input for one scoring run.
#[derive(Debug, Clone, Default)]
pub struct ScoringInput {
    pub materials: Vec<MaterialInput>,
    pub product_type: ProductCategory,
}

const SCORECARD_FORMAT: &str = r#"{
  "overall_score": 8.5,
  "grade": "A-",
  "categories": {
    "carbon_footprint": {
      "score": 8.2,
      "rating": "Excellent",
      "details": "Low CO2 emissions due to organic production",
      "co2_kg": 2.3
    },
    "water_usage": {
      "score": 7.8,
      "rating": "Good",
      "details": "Moderate water usage for organic cotton processing",
      "water_liters": 1500
    },
    "ethical_production": {
      "score": 9.1,
      "rating": "Excellent",
      "details": "Fair trade certified, ethical labor practices",
      "certifications": ["Fair Trade", "GOTS"]
    },
    "biodegradability": {
      "score": 8.9,
      "rating": "Excellent",
      "details": "100% biodegradable materials",
      "decomposition_time": "6 months"
    },
    "renewable_resources": {
      "score": 8.7,
      "rating": "Excellent",
      "details": "Materials from renewable sources",
      "renewable_percentage": 95
    }
  },
  "improvements": [
    "Consider using recycled packaging",
    "Explore solar-powered manufacturing",
    "Implement circular design principles"
  ],
  "certifications": ["GOTS", "Fair Trade", "OEKO-TEX"],
  "lifecycle_assessment": {
    "raw_materials": 8.5,
    "manufacturing": 7.8,
    "transportation": 8.0,
    "use_phase": 9.2,
    "end_of_life": 8.8
  },
  "compared_to_conventional": {
    "carbon_reduction": "65%",
    "water_reduction": "45%",
    "waste_reduction": "70%"
  }
}"#;

/// Scores materials through the chat model (Mistral).
#[derive(Debug, Clone, Copy, Default)]
pub struct SustainabilityTask;

impl AiTask for SustainabilityTask {
    type Input = ScoringInput;

    const NAME: &'static str = "sustainability";

    fn build_prompt(&self, input: &ScoringInput) -> String {
        format!(
            "\nAs a sustainability expert, analyze the environmental impact of these materials for a {} product:\n\n\
             Materials: {}\n\n\
             Provide a comprehensive sustainability scorecard in this exact JSON format:\n\n\
             {SCORECARD_FORMAT}\n\n\
             Provide detailed analysis based on actual sustainability data and best practices.\n",
            input.product_type,
            materials_to_value(&input.materials)
        )
    }

    fn model_params(&self) -> ModelParams {
        ModelParams {
            temperature: Some(0.3),
            max_tokens: Some(1000),
        }
    }

    fn validate(&self, payload: &Value) -> Result<(), TaskError> {
        if !payload.get("overall_score").is_some_and(Value::is_number) {
            return Err(TaskError::InvalidSchema(
                "`overall_score` must be a number".to_string(),
            ));
        }

        match payload.get("categories").and_then(Value::as_object) {
            Some(categories) if !categories.is_empty() => Ok(()),
            Some(_) => Err(TaskError::InvalidSchema("`categories` is empty".to_string())),
            None => Err(TaskError::InvalidSchema(
                "`categories` must be an object".to_string(),
            )),
        }
    }

    fn fallback(&self) -> Value {
        json!({
            "overall_score": 7.5,
            "grade": "B+",
            "categories": {
                "carbon_footprint": {
                    "score": 7.5,
                    "rating": "Good",
                    "details": "Moderate carbon footprint",
                    "co2_kg": 3.2
                },
                "water_usage": {
                    "score": 7.0,
                    "rating": "Good",
                    "details": "Standard water usage for production",
                    "water_liters": 2000
                },
                "ethical_production": {
                    "score": 8.0,
                    "rating": "Very Good",
                    "details": "Ethically sourced materials",
                    "certifications": ["Basic Certification"]
                },
                "biodegradability": {
                    "score": 7.8,
                    "rating": "Good",
                    "details": "Mostly biodegradable components",
                    "decomposition_time": "12 months"
                },
                "renewable_resources": {
                    "score": 7.2,
                    "rating": "Good",
                    "details": "Partially renewable materials",
                    "renewable_percentage": 75
                }
            },
            "improvements": [
                "Use more organic materials",
                "Reduce packaging waste",
                "Improve supply chain transparency"
            ],
            "certifications": ["Standard Certification"],
            "lifecycle_assessment": {
                "raw_materials": 7.5,
                "manufacturing": 7.0,
                "transportation": 7.8,
                "use_phase": 8.0,
                "end_of_life": 7.5
            },
            "compared_to_conventional": {
                "carbon_reduction": "35%",
                "water_reduction": "25%",
                "waste_reduction": "40%"
            }
        })
    }
}
