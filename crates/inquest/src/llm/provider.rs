//! Text-generation capability and shared provider plumbing.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, InquestError, Result};

/// Configuration for LLM providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model to use (e.g., "claude-sonnet-4-20250514").
    pub model: String,

    /// Maximum tokens in response.
    pub max_tokens: usize,

    /// Temperature for generation (0.0-1.0).
    pub temperature: f64,

    /// HTTP client timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 2048,
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    /// Use a different model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// An external service that turns a prompt into free text.
///
/// Implementations must be thread-safe (Send + Sync): one generator is shared
/// by every pipeline of an orchestrator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationError>;

    /// Get the name of this provider (for logging/debugging).
    fn name(&self) -> &str;
}

/// Build the shared async HTTP client.
pub(crate) fn build_client(config: &LlmConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| InquestError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Map a transport failure to a generation error.
pub(crate) fn transport_error(e: reqwest::Error, config: &LlmConfig) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout {
            timeout_secs: config.timeout_secs,
        }
    } else if e.is_connect() {
        GenerationError::service(format!("Connection failed: {}", e))
    } else {
        GenerationError::service(e.to_string())
    }
}

/// Turn a non-success status into a generation error.
pub(crate) async fn check_status(
    response: Response,
    provider: &str,
) -> std::result::Result<Response, GenerationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match status.as_u16() {
        429 => Err(GenerationError::rate_limited(format!("{} returned 429: {}", provider, body))),
        _ => Err(GenerationError::service(format!(
            "{} error ({}): {}",
            provider, status, body
        ))),
    }
}
