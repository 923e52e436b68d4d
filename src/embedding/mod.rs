//! Embedding provider abstraction and fallback chain.
//!
//! Providers are tried in a fixed priority order, first success wins: the
//! local no-network encoder, then the remote OpenAI-compatible API when a
//! key is configured, then one unconditional retry of the remote provider.
//! A provider either returns a full set of vectors or a typed failure;
//! partial results never escape this module.

mod local;
mod openai;

pub use local::LocalHashEmbedding;
pub use openai::OpenAiEmbeddingClient;

use crate::config::Config;
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// Provider was unable to produce embeddings for the supplied input.
    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),
    /// Provider returned vectors whose width does not match the configured dimension.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension configured for the lifetime of the process.
        expected: usize,
        /// Dimension actually produced by the provider.
        actual: usize,
    },
    /// Every provider in the fallback chain failed.
    #[error("no embeddings provider available")]
    NoProvider,
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce an embedding vector for each supplied text.
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingClientError>;

    /// Produce an embedding vector for a single text.
    async fn embed_single(&self, text: String) -> Result<Vec<f32>, EmbeddingClientError> {
        let mut vectors = self.embed(vec![text]).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingClientError::GenerationFailed("no vector returned".into()))
    }
}

/// Ordered chain of embedding providers with first-success-wins semantics.
pub struct FallbackEmbedding {
    providers: Vec<Box<dyn EmbeddingClient>>,
}

impl FallbackEmbedding {
    /// Build a chain from an explicit provider list, highest priority first.
    pub fn new(providers: Vec<Box<dyn EmbeddingClient>>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl EmbeddingClient for FallbackEmbedding {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        for (priority, provider) in self.providers.iter().enumerate() {
            match provider.embed(texts.clone()).await {
                Ok(vectors) => return Ok(vectors),
                Err(error) => {
                    tracing::warn!(
                        priority,
                        error = %error,
                        "Embedding provider failed; trying next in chain"
                    );
                }
            }
        }
        Err(EmbeddingClientError::NoProvider)
    }
}

/// Build the embedding chain for the current configuration.
///
/// The local encoder always leads. When an API key is present the remote
/// provider follows, twice: once in regular priority order and once as the
/// unconditional last-resort retry.
pub fn embedding_chain(config: &Config) -> FallbackEmbedding {
    let mut providers: Vec<Box<dyn EmbeddingClient>> =
        vec![Box::new(LocalHashEmbedding::new(config.embedding_dimension))];

    if config.api_key.is_some() {
        providers.push(Box::new(OpenAiEmbeddingClient::from_config(config)));
        providers.push(Box::new(OpenAiEmbeddingClient::from_config(config)));
    }

    FallbackEmbedding::new(providers)
}
