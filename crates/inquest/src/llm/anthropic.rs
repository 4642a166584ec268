//! Anthropic Claude API provider implementation.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;

use crate::error::{GenerationError, InquestError, Result};

use super::prompts;
use super::provider::{LlmConfig, TextGenerator, build_client, check_status, transport_error};

/// Anthropic API endpoint.
const API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version.
const API_VERSION: &str = "2023-06-01";

/// Anthropic Claude provider.
pub struct AnthropicProvider {
    client: Client,
    headers: HeaderMap,
    config: LlmConfig,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, LlmConfig::default())
    }

    /// Create a new Anthropic provider with custom configuration.
    pub fn with_config(api_key: impl Into<String>, config: LlmConfig) -> Result<Self> {
        let api_key = api_key.into();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&api_key)
                .map_err(|e| InquestError::Config(format!("Invalid API key: {}", e)))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));

        Ok(Self {
            client: build_client(&config)?,
            headers,
            config,
        })
    }

    /// Create from environment variable.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_config(LlmConfig::default())
    }

    /// Create from environment variable with custom configuration.
    pub fn from_env_with_config(config: LlmConfig) -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            InquestError::Config("ANTHROPIC_API_KEY environment variable not set".to_string())
        })?;
        Self::with_config(api_key, config)
    }
}

#[async_trait]
impl TextGenerator for AnthropicProvider {
    async fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationError> {
        let body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "system": prompts::system_prompt(),
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        let response = self
            .client
            .post(API_URL)
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(e, &self.config))?;

        let response = check_status(response, "Anthropic").await?;

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::service(format!("Failed to parse API response: {}", e)))?;

        api_response
            .content
            .into_iter()
            .find(|block| block.content_type == "text")
            .map(|block| block.text)
            .ok_or_else(|| GenerationError::service("No text in API response"))
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

/// Anthropic API response.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

/// Content block in API response.
#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_extraction() {
        let raw = r#"{"content": [{"type": "tool_use"}, {"type": "text", "text": "1. Question?"}]}"#;
        let parsed: ApiResponse = serde_json::from_str(raw).unwrap();
        let text = parsed
            .content
            .into_iter()
            .find(|b| b.content_type == "text")
            .map(|b| b.text);
        assert_eq!(text.as_deref(), Some("1. Question?"));
    }

    #[test]
    fn test_invalid_api_key_header() {
        let result = AnthropicProvider::new("bad\nkey");
        assert!(matches!(result, Err(InquestError::Config(_))));
    }
}
