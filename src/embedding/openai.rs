use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{EmbeddingClient, EmbeddingClientError};
use crate::config::Config;

/// Remote embedding provider speaking the OpenAI embeddings API.
pub struct OpenAiEmbeddingClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    dimension: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingRow {
    embedding: Vec<f32>,
}

impl OpenAiEmbeddingClient {
    /// Build a remote client from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.api_base_url.clone(),
            config.api_key.clone().unwrap_or_default(),
            config.embedding_model.clone(),
            config.embedding_dimension,
        )
    }

    /// Build a remote client from explicit parameters.
    pub fn new(base_url: String, api_key: String, model: String, dimension: usize) -> Self {
        let http = Client::builder()
            .user_agent("documind/embeddings")
            .build()
            .expect("Failed to construct reqwest::Client for embeddings");
        Self {
            http,
            base_url,
            api_key,
            model,
            dimension,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbeddingClient {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let payload = json!({
            "model": self.model,
            "input": texts,
        });

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                EmbeddingClientError::GenerationFailed(format!(
                    "failed to reach embeddings endpoint {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingClientError::GenerationFailed(format!(
                "embeddings endpoint returned {status}: {body}"
            )));
        }

        let body: EmbeddingsResponse = response.json().await.map_err(|error| {
            EmbeddingClientError::GenerationFailed(format!(
                "failed to decode embeddings response: {error}"
            ))
        })?;

        let vectors: Vec<Vec<f32>> = body.data.into_iter().map(|row| row.embedding).collect();
        for vector in &vectors {
            if vector.len() != self.dimension {
                return Err(EmbeddingClientError::DimensionMismatch {
                    expected: self.dimension,
                    actual: vector.len(),
                });
            }
        }

        Ok(vectors)
    }
}
