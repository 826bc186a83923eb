//! Shared product vocabulary: categories, material descriptions and grades.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Product category accepted by the design and scoring endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    #[default]
    Clothing,
    Accessories,
    Home,
    Bags,
    Shoes,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clothing => "clothing",
            Self::Accessories => "accessories",
            Self::Home => "home",
            Self::Bags => "bags",
            Self::Shoes => "shoes",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One material as submitted by the user.
///
/// Only `name` is required; anything else the client sends (type, percentage,
/// origin...) is kept and forwarded to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialInput {
    pub name: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl MaterialInput {
    #[cfg(test)]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Map::new(),
        }
    }

    pub fn to_value(&self) -> Value {
        let mut object = self.attributes.clone();
        object.insert("name".to_string(), Value::String(self.name.clone()));
        Value::Object(object)
    }
}

/// JSON array of materials, as interpolated into prompts and stored in JSONB.
pub fn materials_to_value(materials: &[MaterialInput]) -> Value {
    Value::Array(materials.iter().map(MaterialInput::to_value).collect())
}

/// Letter grade for an overall sustainability score on a 0-10 scale.
pub fn grade_for_score(score: f64) -> &'static str {
    const BANDS: [(f64, &str); 10] = [
        (9.0, "A+"),
        (8.5, "A"),
        (8.0, "A-"),
        (7.5, "B+"),
        (7.0, "B"),
        (6.5, "B-"),
        (6.0, "C+"),
        (5.5, "C"),
        (5.0, "C-"),
        (4.0, "D"),
    ];

    BANDS
        .iter()
        .find(|(min, _)| score >= *min)
        .map(|(_, grade)| *grade)
        .unwrap_or("F")
}
