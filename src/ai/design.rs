//! Product design generation task.

use serde_json::{json, Map, Value};

use super::{AiTask, TaskError};

/// Input for one design generation run.
#[derive(Debug, Clone, Default)]
pub struct DesignInput {
    /// Free-text request, interpolated into the prompt as given.
    pub prompt: String,
    /// User preferences, including the product category.
    pub preferences: Map<String, Value>,
}

const SUSTAINABILITY_FOCUS: &str = "\
Focus on sustainable design principles:
- Use eco-friendly materials (organic cotton, bamboo, recycled materials)
- Consider minimal waste production methods
- Suggest natural dyes and eco-friendly printing techniques
- Include local manufacturing considerations";

const RESPONSE_FORMAT: &str = r#"Return your response as a valid JSON object with this exact structure:
{
  "designs": [
    {
      "id": "design_1",
      "name": "Design Name",
      "description": "Detailed description of the design",
      "category": "clothing/accessories/home",
      "materials": [
        {
          "name": "Material Name",
          "type": "organic/recycled/sustainable",
          "description": "Material description",
          "sustainability_score": 8.5
        }
      ],
      "manufacturing": {
        "method": "Manufacturing method",
        "local_options": ["Location 1", "Location 2"],
        "estimated_time": "2-3 weeks"
      },
      "sustainability_highlights": ["Eco-friendly feature 1", "Eco-friendly feature 2"],
      "estimated_price": "$XX-XX"
    }
  ],
  "sustainability_tips": ["Tip 1", "Tip 2", "Tip 3"]
}

Generate 2-3 unique design variations."#;

/// Generates product designs through the text model (Gemini).
#[derive(Debug, Clone, Copy, Default)]
pub struct DesignTask;

impl AiTask for DesignTask {
    type Input = DesignInput;

    const NAME: &'static str = "design";

    fn build_prompt(&self, input: &DesignInput) -> String {
        let preferences = Value::Object(input.preferences.clone());
        format!(
            "\n{SUSTAINABILITY_FOCUS}\n\nUser Request: \"{}\"\n\nUser Preferences: {}\n\n{RESPONSE_FORMAT}\n",
            input.prompt, preferences
        )
    }

    fn validate(&self, payload: &Value) -> Result<(), TaskError> {
        match payload.get("designs").and_then(Value::as_array) {
            Some(designs) if !designs.is_empty() => Ok(()),
            Some(_) => Err(TaskError::InvalidSchema("`designs` is empty".to_string())),
            None => Err(TaskError::InvalidSchema(
                "`designs` must be an array".to_string(),
            )),
        }
    }

    fn fallback(&self) -> Value {
        json!({
            "designs": [
                {
                    "id": "fallback_design_1",
                    "name": "Sustainable Cotton T-Shirt",
                    "description": "A minimalist design using organic cotton with eco-friendly printing",
                    "category": "clothing",
                    "materials": [
                        {
                            "name": "Organic Cotton",
                            "type": "organic",
                            "description": "GOTS certified organic cotton",
                            "sustainability_score": 9.0
                        }
                    ],
                    "manufacturing": {
                        "method": "Local textile production",
                        "local_options": ["Local Workshop A", "Local Workshop B"],
                        "estimated_time": "2-3 weeks"
                    },
                    "sustainability_highlights": [
                        "100% organic cotton",
                        "Natural dyes",
                        "Local production"
                    ],
                    "estimated_price": "$25-35"
                }
            ],
            "sustainability_tips": [
                "Choose organic materials when possible",
                "Support local manufacturing",
                "Consider the full lifecycle of the product"
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(prompt: &str) -> DesignInput {
        let mut preferences = Map::new();
        preferences.insert("category".to_string(), json!("bags"));
        preferences.insert("style".to_string(), json!("minimal"));
        DesignInput {
            prompt: prompt.to_string(),
            preferences,
        }
    }

    #[test]
    fn prompt_interpolates_request_verbatim() {
        let prompt = DesignTask.build_prompt(&input(r#"A tote with "quotes" and {braces}"#));

        assert!(prompt.contains(r#"User Request: "A tote with "quotes" and {braces}""#));
        assert!(prompt.contains(r#""category":"bags""#));
        assert!(prompt.contains("Focus on sustainable design principles"));
        assert!(prompt.contains("\"sustainability_tips\""));
        assert!(prompt.contains("Generate 2-3 unique design variations."));
    }

    #[test]
    fn prompt_is_deterministic() {
        let a = DesignTask.build_prompt(&input("hemp backpack for hiking"));
        let b = DesignTask.build_prompt(&input("hemp backpack for hiking"));
        assert_eq!(a, b);
    }

    #[test]
    fn accepts_non_empty_designs() {
        let payload = json!({"designs": [{"id": "d1"}]});
        assert!(DesignTask.validate(&payload).is_ok());
    }

    #[test]
    fn rejects_missing_empty_or_mistyped_designs() {
        for payload in [
            json!({"sustainability_tips": []}),
            json!({"designs": []}),
            json!({"designs": {"id": "d1"}}),
            json!([{"id": "d1"}]),
        ] {
            let err = DesignTask.validate(&payload).unwrap_err();
            assert!(matches!(err, TaskError::InvalidSchema(_)), "{payload}");
        }
    }

    #[test]
    fn fallback_passes_validation() {
        let fallback = DesignTask.fallback();
        assert!(DesignTask.validate(&fallback).is_ok());
        assert_eq!(fallback["designs"][0]["name"], "Sustainable Cotton T-Shirt");
        assert_eq!(fallback["sustainability_tips"].as_array().unwrap().len(), 3);
    }
}
