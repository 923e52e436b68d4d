//! Retrieval-augmented question answering over a processed document.
//!
//! The query path is a short state machine, terminal on first success:
//! missing collection, empty retrieval, generated answer, plain-context
//! fallback. Whatever happens, the caller receives a well-formed
//! [`AnswerRecord`]; unexpected failures are folded into the answer text at
//! the outer boundary rather than propagated.

use serde::Serialize;
use thiserror::Error;

use crate::completion::CompletionClient;
use crate::embedding::EmbeddingClient;
use crate::store::{StoreError, VectorStore};

/// Answer text returned before ingestion has produced a collection.
pub const NOT_PROCESSED_ANSWER: &str =
    "Document not yet processed. Please wait for ingestion to finish and try again.";

/// Answer text returned when retrieval produces no hits.
pub const NO_MATCH_ANSWER: &str =
    "No relevant information found in the document for this question.";

/// Character budget for the plain-context fallback answer.
const CONTEXT_FALLBACK_CHARS: usize = 1500;

/// Provenance of one retrieved chunk, in retrieval rank order.
#[derive(Debug, Clone, Serialize)]
pub struct SourceRef {
    /// Insertion-order handle of the chunk within the document's collection.
    pub chunk: usize,
    /// Similarity score of the chunk against the question.
    pub score: f32,
}

/// The answer to one question, with the chunks that grounded it.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerRecord {
    /// Answer text; always present, even on failure.
    pub answer: String,
    /// Retrieved chunk provenance in rank order; empty on terminal states.
    pub sources: Vec<SourceRef>,
}

/// Failures internal to the query path, converted to answer text at the boundary.
#[derive(Debug, Error)]
enum QueryError {
    #[error(transparent)]
    Embedding(#[from] crate::embedding::EmbeddingClientError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Answer `question` against the persisted collection for `doc_id`.
///
/// Never fails: every internal error becomes an `AnswerRecord` whose text
/// embeds the failure message.
pub async fn answer_question(
    doc_id: &str,
    question: &str,
    embedder: &dyn EmbeddingClient,
    vectors: &VectorStore,
    completion: Option<&dyn CompletionClient>,
    models: &[String],
    top_k: usize,
) -> AnswerRecord {
    match answer_inner(doc_id, question, embedder, vectors, completion, models, top_k).await {
        Ok(record) => record,
        Err(error) => {
            tracing::error!(doc_id, error = %error, "Query failed");
            AnswerRecord {
                answer: format!("Error querying document: {error}"),
                sources: Vec::new(),
            }
        }
    }
}

async fn answer_inner(
    doc_id: &str,
    question: &str,
    embedder: &dyn EmbeddingClient,
    vectors: &VectorStore,
    completion: Option<&dyn CompletionClient>,
    models: &[String],
    top_k: usize,
) -> Result<AnswerRecord, QueryError> {
    let Some(index) = vectors.load(doc_id)? else {
        tracing::info!(doc_id, "Query against unprocessed document");
        return Ok(AnswerRecord {
            answer: NOT_PROCESSED_ANSWER.to_string(),
            sources: Vec::new(),
        });
    };

    let query_vector = embedder.embed_single(question.to_string()).await?;
    let hits = index.search(&query_vector, top_k)?;
    if hits.is_empty() {
        tracing::info!(doc_id, "No chunks retrieved for question");
        return Ok(AnswerRecord {
            answer: NO_MATCH_ANSWER.to_string(),
            sources: Vec::new(),
        });
    }

    let sources: Vec<SourceRef> = hits
        .iter()
        .map(|hit| SourceRef {
            chunk: hit.handle,
            score: hit.score,
        })
        .collect();
    let context = hits
        .iter()
        .map(|hit| hit.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    if let Some(client) = completion {
        let prompt = build_answer_prompt(&context, question);
        for model in models {
            match client.complete(model, &prompt).await {
                Ok(answer) => {
                    tracing::debug!(doc_id, model = %model, "Generated answer from context");
                    return Ok(AnswerRecord { answer, sources });
                }
                Err(error) => {
                    tracing::warn!(
                        doc_id,
                        model = %model,
                        error = %error,
                        "Answer generation failed; trying next candidate"
                    );
                }
            }
        }
        tracing::warn!(doc_id, "All completion candidates failed; returning raw context");
    }

    Ok(AnswerRecord {
        answer: fallback_answer(&context),
        sources,
    })
}

fn build_answer_prompt(context: &str, question: &str) -> String {
    format!(
        "Answer the question using only the context below. If the context does not contain the answer, say so.\n\nContext:\n{context}\n\nQuestion: {question}\n\nAnswer:"
    )
}

/// Grounded fallback: the retrieved context itself, bounded and labeled.
fn fallback_answer(context: &str) -> String {
    let bounded = crate::insights::heuristics::truncate_chars(context, CONTEXT_FALLBACK_CHARS);
    format!("Based on the most relevant passages of the document:\n\n{bounded}")
}
