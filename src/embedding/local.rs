use async_trait::async_trait;

use super::{EmbeddingClient, EmbeddingClientError};

/// Identifier reported for the local encoder.
pub const LOCAL_MODEL_ID: &str = "local-hash-v1";

/// Deterministic, no-network embedding provider.
///
/// Hashes byte content into a fixed-width vector and L2-normalizes it. The
/// output carries no semantic signal beyond byte statistics, but it is stable
/// across runs, never blocks on I/O, and keeps the whole pipeline functional
/// when no remote provider is configured.
pub struct LocalHashEmbedding {
    dimension: usize,
}

impl LocalHashEmbedding {
    /// Construct a local encoder producing vectors of the given width.
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn encode(text: &str, dimension: usize) -> Vec<f32> {
        let mut embedding = vec![0.0_f32; dimension];

        if text.is_empty() {
            return embedding;
        }

        for (idx, byte) in text.bytes().enumerate() {
            let position = idx % dimension;
            embedding[position] += f32::from(byte) / 255.0;
        }

        let norm = embedding
            .iter()
            .map(|value| value * value)
            .sum::<f32>()
            .sqrt();

        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }

        embedding
    }
}

#[async_trait]
impl EmbeddingClient for LocalHashEmbedding {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if self.dimension == 0 {
            return Err(EmbeddingClientError::GenerationFailed(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }

        tracing::debug!(
            model = LOCAL_MODEL_ID,
            dimension = self.dimension,
            count = texts.len(),
            "Generating local embeddings"
        );

        Ok(texts
            .into_iter()
            .map(|text| Self::encode(&text, self.dimension))
            .collect())
    }
}
