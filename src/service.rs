//! Document pipeline orchestration.
//!
//! [`DocumentService`] owns the embedding chain, the optional completion
//! client, and both on-disk stores, and exposes the three operations the
//! HTTP layer needs: process an uploaded file, answer a question, and look
//! up cached insights. Processing is linear; the vector collection is
//! persisted before insight analysis begins, so a document becomes
//! queryable as early as possible.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::chunk::chunk_text;
use crate::completion::{CompletionClient, completion_client};
use crate::config::Config;
use crate::embedding::{EmbeddingClient, FallbackEmbedding, embedding_chain};
use crate::extract::{ExtractError, extract_document};
use crate::insights::{InsightRecord, analyze_document};
use crate::query::{AnswerRecord, answer_question};
use crate::store::{InsightStore, StoreError, VectorIndex, VectorStore};

/// Errors raised while ingesting a document.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// Text extraction from the uploaded file failed.
    #[error(transparent)]
    Extract(#[from] ExtractError),
    /// No embedding provider produced vectors for the chunks.
    #[error(transparent)]
    Embedding(#[from] crate::embedding::EmbeddingClientError),
    /// Persisting the collection or insight record failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Operations the HTTP layer drives, behind a trait for test doubles.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Ingest the uploaded file at `path` under `doc_id`: extract, chunk,
    /// embed, index, then analyze and cache insights.
    async fn process_document(&self, doc_id: &str, path: &Path) -> Result<(), ProcessingError>;

    /// Answer `question` against the processed document `doc_id`.
    async fn answer(&self, doc_id: &str, question: &str) -> AnswerRecord;

    /// Cached insight record for `doc_id`, `None` while ingestion is in flight.
    fn cached_insights(&self, doc_id: &str) -> Result<Option<InsightRecord>, StoreError>;
}

/// Concrete pipeline wired from configuration.
pub struct DocumentService {
    config: Arc<Config>,
    embedder: FallbackEmbedding,
    completion: Option<Box<dyn CompletionClient>>,
    vectors: VectorStore,
    insights: InsightStore,
}

impl DocumentService {
    /// Build the service and its storage directories from `config`.
    pub fn new(config: Arc<Config>) -> Result<Self, StoreError> {
        let embedder = embedding_chain(&config);
        let completion = completion_client(&config);
        let vectors = VectorStore::new(&config.vectors_dir())?;
        let insights = InsightStore::new(&config.insights_dir())?;
        Ok(Self {
            config,
            embedder,
            completion,
            vectors,
            insights,
        })
    }

}

#[async_trait]
impl DocumentApi for DocumentService {
    async fn process_document(&self, doc_id: &str, path: &Path) -> Result<(), ProcessingError> {
        let extraction = extract_document(path)?;
        let chunks = chunk_text(
            &extraction.text,
            self.config.chunk_size,
            self.config.chunk_overlap,
        );
        tracing::info!(
            doc_id,
            pages = extraction.page_count,
            chunks = chunks.len(),
            "Document extracted and chunked"
        );

        let vectors = self.embedder.embed(chunks.clone()).await?;
        let mut index = VectorIndex::new(self.config.embedding_dimension);
        index.add(vectors, chunks.clone())?;
        self.vectors.save(doc_id, &index)?;

        let word_count = extraction.text.split_whitespace().count();
        let insights = analyze_document(
            &extraction.text,
            self.completion.as_deref(),
            &self.config.completion_models,
        )
        .await;
        self.insights.put(
            doc_id,
            &InsightRecord {
                doc_id: doc_id.to_string(),
                num_chunks: chunks.len(),
                page_count: extraction.page_count,
                word_count,
                insights,
            },
        )?;

        tracing::info!(doc_id, word_count, "Document processing complete");
        Ok(())
    }

    async fn answer(&self, doc_id: &str, question: &str) -> AnswerRecord {
        answer_question(
            doc_id,
            question,
            &self.embedder,
            &self.vectors,
            self.completion.as_deref(),
            &self.config.completion_models,
            self.config.query_top_k,
        )
        .await
    }

    fn cached_insights(&self, doc_id: &str) -> Result<Option<InsightRecord>, StoreError> {
        self.insights.get(doc_id)
    }
}
