//! Boundary to the external generative models.

use async_trait::async_trait;
use thiserror::Error;

/// Sampling parameters passed along with a prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModelParams {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Failures reaching the model or reading its envelope.
///
/// These are hard failures for the request and are never turned into a
/// fallback result.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{provider} API key is not configured")]
    MissingCredentials { provider: &'static str },

    #[error("{provider} request failed: {message}")]
    Network {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} returned {status}: {message}")]
    Provider {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("{provider} returned an unreadable response: {message}")]
    InvalidResponse {
        provider: &'static str,
        message: String,
    },
}

/// A model that turns a prompt into free-form text.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Provider name for logs.
    fn provider(&self) -> &'static str;

    async fn complete(&self, prompt: &str, params: &ModelParams) -> Result<String, TransportError>;
}
