//! Completion provider abstraction for answer generation and analysis prompts.
//!
//! The completion pipeline is optional; when no API key is configured the
//! query path falls back to returning raw retrieved context and the insight
//! pipeline drops to its deterministic heuristic tier. The OpenAI-compatible
//! client mirrors the embedding adapter by issuing HTTP requests directly.

use crate::config::Config;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced while requesting a completion.
#[derive(Debug, Error)]
pub enum CompletionClientError {
    /// Provider endpoint could not be reached.
    #[error("Completion provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate completion: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by completion providers.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate a free-text response to `prompt` using `model`.
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, CompletionClientError>;
}

/// Build a completion client when the configuration carries an API key.
pub fn completion_client(config: &Config) -> Option<Box<dyn CompletionClient>> {
    let api_key = config.api_key.clone()?;
    Some(Box::new(OpenAiCompletionClient::new(
        config.api_base_url.clone(),
        api_key,
    )))
}

/// Completion client speaking the OpenAI chat-completions API.
pub struct OpenAiCompletionClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiCompletionClient {
    /// Build a client against an OpenAI-compatible base URL.
    pub fn new(base_url: String, api_key: String) -> Self {
        let http = Client::builder()
            .user_agent("documind/completions")
            .build()
            .expect("Failed to construct reqwest::Client for completions");
        Self {
            http,
            base_url,
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, CompletionClientError> {
        let payload = json!({
            "model": model,
            "messages": [{ "role": "user", "content": prompt }],
            // Low temperature for reproducible analysis output.
            "temperature": 0.1,
        });

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                CompletionClientError::ProviderUnavailable(format!(
                    "failed to reach completions endpoint {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionClientError::GenerationFailed(format!(
                "completions endpoint returned {status}: {body}"
            )));
        }

        let body: ChatResponse = response.json().await.map_err(|error| {
            CompletionClientError::InvalidResponse(format!(
                "failed to decode completions response: {error}"
            ))
        })?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                CompletionClientError::InvalidResponse("response contained no choices".into())
            })?;

        Ok(content.trim().to_string())
    }
}
