//! Generic prompt -> model -> payload pipeline.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::extract::{extract_payload, ExtractionStrategy};
use super::{AiTask, TaskResult, TextModel, TransportError};

/// Runs one [`AiTask`] against a [`TextModel`].
///
/// Cheap to clone; the model client is shared.
pub struct TaskRunner<T: AiTask> {
    task: T,
    model: Arc<dyn TextModel>,
    strategy: ExtractionStrategy,
}

impl<T: AiTask + Clone> Clone for TaskRunner<T> {
    fn clone(&self) -> Self {
        Self {
            task: self.task.clone(),
            model: Arc::clone(&self.model),
            strategy: self.strategy,
        }
    }
}

impl<T: AiTask> TaskRunner<T> {
    pub fn new(task: T, model: Arc<dyn TextModel>, strategy: ExtractionStrategy) -> Self {
        Self {
            task,
            model,
            strategy,
        }
    }

    /// Name of the provider behind this runner.
    pub fn provider(&self) -> &'static str {
        self.model.provider()
    }

    /// Build the prompt, call the model and normalize its answer.
    ///
    /// Only transport failures are returned as `Err`; anything the model
    /// answers, however broken, yields a [`TaskResult`].
    #[instrument(skip_all, fields(task = T::NAME, provider = self.model.provider()))]
    pub async fn run(&self, input: &T::Input) -> Result<TaskResult, TransportError> {
        let prompt = self.task.build_prompt(input);
        let params = self.task.model_params();

        debug!(prompt_len = prompt.len(), "Sending prompt to model");

        let text = self.model.complete(&prompt, &params).await.map_err(|e| {
            tracing::error!(error = %e, "Model call failed");
            e
        })?;

        let result = self.interpret(&text);
        debug!(ok = result.is_ok(), "Model response interpreted");
        Ok(result)
    }

    /// Turn raw model text into a result, substituting the fallback when the
    /// text holds no valid payload.
    pub fn interpret(&self, text: &str) -> TaskResult {
        let parsed = extract_payload(text, self.strategy)
            .and_then(|payload| self.task.validate(&payload).map(|()| payload));

        match parsed {
            Ok(data) => TaskResult::Success {
                data,
                generated_at: Utc::now(),
            },
            Err(e) => {
                warn!(task = T::NAME, error = %e, response_len = text.len(), "Using fallback payload");
                TaskResult::Fallback {
                    error: format!("Failed to parse {} response: {}", T::NAME, e),
                    fallback: self.task.fallback(),
                }
            }
        }
    }
}
