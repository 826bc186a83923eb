//! Pulls a JSON object out of free-form model text.

use serde_json::Value;
use std::str::FromStr;

use super::TaskError;

/// How the JSON region is located inside the model text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Everything from the first `{` to the last `}`.
    ///
    /// Stray braces in prose before or after the payload end up inside the
    /// slice and make it unparseable.
    #[default]
    Outermost,
    /// The first balanced `{...}` region, honouring string literals and escapes.
    Balanced,
}

impl FromStr for ExtractionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "outer" | "outermost" => Ok(Self::Outermost),
            "balanced" => Ok(Self::Balanced),
            other => Err(format!("unknown extraction strategy: {other}")),
        }
    }
}

/// Locate and parse the embedded payload.
pub fn extract_payload(text: &str, strategy: ExtractionStrategy) -> Result<Value, TaskError> {
    let region = match strategy {
        ExtractionStrategy::Outermost => outermost_region(text),
        ExtractionStrategy::Balanced => balanced_region(text),
    }
    .ok_or(TaskError::NoStructuredPayload)?;

    Ok(serde_json::from_str(region)?)
}

fn outermost_region(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

fn balanced_region(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (offset, c) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}
