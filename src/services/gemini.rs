//! Google Gemini client used for design generation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::ai::{ModelParams, TextModel, TransportError};

const PROVIDER: &str = "gemini";

/// Client for the Gemini `generateContent` API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(skip_serializing_if = "GenerationConfig::is_empty")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

impl GenerationConfig {
    fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.max_output_tokens.is_none()
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Error envelope returned by Google APIs.
#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

impl GeminiClient {
    /// Create a new Gemini client. `timeout` of `None` leaves requests unbounded.
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

        tracing::info!(base_url = base_url, model = model, "Gemini client initialized");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Generate text for a single-turn prompt.
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    pub async fn generate(
        &self,
        prompt: &str,
        params: &ModelParams,
    ) -> Result<String, TransportError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateContentRequest {
            contents: [Content {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: params.temperature,
                max_output_tokens: params.max_tokens,
            },
        };

        debug!(url = %url, "Gemini request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Gemini request failed");
                TransportError::Network {
                    provider: PROVIDER,
                    message: e.to_string(),
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<GeminiErrorResponse>()
                .await
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("Gemini error: {status}"));

            error!(status = %status, message = %message, "Gemini returned an error");
            return Err(TransportError::Provider {
                provider: PROVIDER,
                status: status.as_u16(),
                message,
            });
        }

        let response: GenerateContentResponse =
            response.json().await.map_err(|e| TransportError::InvalidResponse {
                provider: PROVIDER,
                message: e.to_string(),
            })?;

        response_text(response)
    }
}

/// Concatenate the text parts of the first candidate.
fn response_text(response: GenerateContentResponse) -> Result<String, TransportError> {
    let parts = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .ok_or_else(|| TransportError::InvalidResponse {
            provider: PROVIDER,
            message: "response has no candidates".to_string(),
        })?;

    Ok(parts.into_iter().filter_map(|part| part.text).collect())
}

#[async_trait]
impl TextModel for GeminiClient {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn complete(&self, prompt: &str, params: &ModelParams) -> Result<String, TransportError> {
        self.generate(prompt, params).await
    }
}
