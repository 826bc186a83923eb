//! Side-by-side sustainability comparison of several material sets.

use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;

use super::{overall_score, ScoringInput, SustainabilityTask, TaskResult, TaskRunner};
use crate::domain::catalog::{MaterialInput, ProductCategory};

/// Scoring outcome for one material set.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonEntry {
    pub set_index: usize,
    pub materials: Vec<MaterialInput>,
    /// Real scorecard on success, fallback scorecard when the model output
    /// was unusable, absent when the model could not be reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub success: bool,
}

impl ComparisonEntry {
    fn overall_score(&self) -> Option<f64> {
        self.score.as_ref().and_then(overall_score)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonSummary {
    pub total_sets: usize,
    pub successful_analyses: usize,
    pub best_score: Option<f64>,
}

/// All entries, in input order, plus the index of the best one.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub entries: Vec<ComparisonEntry>,
    best: Option<usize>,
}

impl Comparison {
    fn from_entries(entries: Vec<ComparisonEntry>) -> Self {
        // Forward fold with a strict `>`: on equal scores the earlier set stays.
        let mut best: Option<(usize, f64)> = None;
        for (position, entry) in entries.iter().enumerate() {
            if !entry.success {
                continue;
            }
            let Some(score) = entry.overall_score() else {
                continue;
            };
            let replace = match best {
                None => true,
                Some((_, best_score)) => score > best_score,
            };
            if replace {
                best = Some((position, score));
            }
        }

        Self {
            entries,
            best: best.map(|(position, _)| position),
        }
    }

    pub fn best_option(&self) -> Option<&ComparisonEntry> {
        self.best.map(|position| &self.entries[position])
    }

    pub fn summary(&self) -> ComparisonSummary {
        ComparisonSummary {
            total_sets: self.entries.len(),
            successful_analyses: self.entries.iter().filter(|e| e.success).count(),
            best_score: self.best_option().and_then(ComparisonEntry::overall_score),
        }
    }
}

/// Score every set concurrently and pick the best successful one.
///
/// All runs are awaited; a transport failure on one set is recorded on its
/// entry and does not affect the others.
pub async fn compare_material_sets(
    runner: &TaskRunner<SustainabilityTask>,
    material_sets: Vec<Vec<MaterialInput>>,
    product_type: ProductCategory,
) -> Comparison {
    let runs = material_sets
        .into_iter()
        .enumerate()
        .map(|(set_index, materials)| async move {
            let input = ScoringInput {
                materials,
                product_type,
            };
            let outcome = runner.run(&input).await;
            let materials = input.materials;

            match outcome {
                Ok(TaskResult::Success { data, .. }) => ComparisonEntry {
                    set_index,
                    materials,
                    score: Some(data),
                    error: None,
                    success: true,
                },
                Ok(TaskResult::Fallback { error, fallback }) => ComparisonEntry {
                    set_index,
                    materials,
                    score: Some(fallback),
                    error: Some(error),
                    success: false,
                },
                Err(e) => {
                    tracing::warn!(set_index, error = %e, "Material set scoring failed");
                    ComparisonEntry {
                        set_index,
                        materials,
                        score: None,
                        error: Some(e.to_string()),
                        success: false,
                    }
                }
            }
        });

    Comparison::from_entries(join_all(runs).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::runner::testing::ScriptedModel;
    use crate::ai::{AiTask, ExtractionStrategy, TransportError};
    use serde_json::json;
    use std::sync::Arc;

    /// Scores each set by the material name found in the prompt.
    fn runner_with(scores: &[(&str, Option<f64>)]) -> TaskRunner<SustainabilityTask> {
        let scores: Vec<(String, Option<f64>)> = scores
            .iter()
            .map(|(name, score)| (name.to_string(), *score))
            .collect();
        let model = ScriptedModel::new(move |prompt| {
            for (name, score) in &scores {
                if prompt.contains(&format!("\"name\":\"{name}\"")) {
                    return match score {
                        Some(score) => Ok(json!({
                            "overall_score": score,
                            "categories": {"carbon_footprint": {"score": score}}
                        })
                        .to_string()),
                        None => Err(TransportError::Provider {
                            provider: "scripted",
                            status: 503,
                            message: "overloaded".to_string(),
                        }),
                    };
                }
            }
            Ok("no idea".to_string())
        });
        TaskRunner::new(SustainabilityTask, Arc::new(model), ExtractionStrategy::Outermost)
    }

    fn sets(names: &[&str]) -> Vec<Vec<MaterialInput>> {
        names.iter().map(|name| vec![MaterialInput::named(*name)]).collect()
    }

    #[tokio::test]
    async fn failed_set_does_not_abort_siblings() {
        let runner = runner_with(&[("Hemp", Some(7.0)), ("Nylon", None), ("Cork", Some(9.0))]);

        let comparison = compare_material_sets(
            &runner,
            sets(&["Hemp", "Nylon", "Cork"]),
            ProductCategory::Bags,
        )
        .await;

        assert_eq!(comparison.entries.len(), 3);
        assert!(comparison.entries[0].success);
        assert!(!comparison.entries[1].success);
        assert!(comparison.entries[1].score.is_none());
        assert!(comparison.entries[1].error.as_deref().unwrap().contains("overloaded"));
        assert!(comparison.entries[2].success);

        let best = comparison.best_option().unwrap();
        assert_eq!(best.set_index, 2);

        let summary = comparison.summary();
        assert_eq!(summary.total_sets, 3);
        assert_eq!(summary.successful_analyses, 2);
        assert_eq!(summary.best_score, Some(9.0));
    }

    #[tokio::test]
    async fn all_failures_leave_no_best_option() {
        let runner = runner_with(&[("Hemp", None)]);

        let comparison =
            compare_material_sets(&runner, sets(&["Hemp", "Linen"]), ProductCategory::Clothing)
                .await;

        assert!(comparison.best_option().is_none());
        let summary = comparison.summary();
        assert_eq!(summary.successful_analyses, 0);
        assert_eq!(summary.best_score, None);
    }

    #[tokio::test]
    async fn fallback_entries_carry_fallback_but_never_win() {
        // Linen gets no payload, so its entry holds the 7.5 fallback scorecard.
        let runner = runner_with(&[("Hemp", Some(6.0))]);

        let comparison =
            compare_material_sets(&runner, sets(&["Linen", "Hemp"]), ProductCategory::Home).await;

        let linen = &comparison.entries[0];
        assert!(!linen.success);
        assert_eq!(linen.score.as_ref(), Some(&SustainabilityTask.fallback()));
        assert!(linen.error.is_some());

        assert_eq!(comparison.best_option().unwrap().set_index, 1);
    }

    #[tokio::test]
    async fn ties_keep_the_earlier_set() {
        let runner = runner_with(&[("Hemp", Some(8.0)), ("Cork", Some(8.0)), ("Jute", Some(7.0))]);

        let comparison = compare_material_sets(
            &runner,
            sets(&["Jute", "Hemp", "Cork"]),
            ProductCategory::Bags,
        )
        .await;

        assert_eq!(comparison.best_option().unwrap().set_index, 1);
    }

    #[test]
    fn entry_serializes_without_absent_fields() {
        let entry = ComparisonEntry {
            set_index: 1,
            materials: vec![MaterialInput::named("Cork")],
            score: None,
            error: Some("down".to_string()),
            success: false,
        };

        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "set_index": 1,
                "materials": [{"name": "Cork"}],
                "error": "down",
                "success": false
            })
        );
    }
}
