//! Mistral chat-completions client used for sustainability scoring.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::ai::{ModelParams, TextModel, TransportError};

const PROVIDER: &str = "mistral";

/// Client for the Mistral `/v1/chat/completions` API.
#[derive(Clone)]
pub struct MistralClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl MistralClient {
    /// Create a new Mistral client. `timeout` of `None` leaves requests unbounded.
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        if api_key.trim().is_empty() {
            return Err(TransportError::MissingCredentials { provider: PROVIDER });
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| TransportError::Network {
            provider: PROVIDER,
            message: format!("failed to create HTTP client: {e}"),
        })?;

        tracing::info!(base_url = base_url, model = model, "Mistral client initialized");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Send a single user message and return the assistant reply.
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    pub async fn chat(&self, prompt: &str, params: &ModelParams) -> Result<String, TransportError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        debug!(url = %url, "Mistral request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Mistral request failed");
                TransportError::Network {
                    provider: PROVIDER,
                    message: e.to_string(),
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .as_ref()
                .and_then(error_message)
                .unwrap_or_else(|| format!("Mistral error: {status}"));

            error!(status = %status, message = %message, "Mistral returned an error");
            return Err(TransportError::Provider {
                provider: PROVIDER,
                status: status.as_u16(),
                message,
            });
        }

        let response: ChatResponse =
            response.json().await.map_err(|e| TransportError::InvalidResponse {
                provider: PROVIDER,
                message: e.to_string(),
            })?;

        reply_text(response)
    }
}

/// Mistral reports errors either as `{"message": ...}` or `{"detail": ...}`.
fn error_message(body: &serde_json::Value) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("detail"))
        .map(|m| match m.as_str() {
            Some(s) => s.to_string(),
            None => m.to_string(),
        })
}

fn reply_text(response: ChatResponse) -> Result<String, TransportError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| TransportError::InvalidResponse {
            provider: PROVIDER,
            message: "response has no message content".to_string(),
        })
}

#[async_trait]
impl TextModel for MistralClient {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn complete(&self, prompt: &str, params: &ModelParams) -> Result<String, TransportError> {
        self.chat(prompt, params).await
    }
}
