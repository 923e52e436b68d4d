//! Durable per-document storage: vector collections and insight records.
//!
//! Each document owns two independent slots keyed by its `doc_id`: a vector
//! collection (chunk embeddings plus source texts) and an insight record.
//! Writes replace the slot wholesale with last-writer-wins semantics;
//! nothing is ever deleted.

mod collections;
mod index;
mod insights_cache;

pub use collections::VectorStore;
pub use index::{SearchHit, VectorIndex};
pub use insights_cache::InsightStore;

use thiserror::Error;

/// Errors raised by the vector index and the on-disk stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `add` was called with differing numbers of vectors and texts.
    #[error("vector/text length mismatch: {vectors} vectors, {texts} texts")]
    LengthMismatch {
        /// Number of vectors supplied.
        vectors: usize,
        /// Number of texts supplied.
        texts: usize,
    },
    /// A vector's width does not match the index's fixed dimension.
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension the index was created with.
        expected: usize,
        /// Dimension of the offending vector.
        actual: usize,
    },
    /// Document identifier is not usable as a storage key.
    #[error("invalid document identifier: {0}")]
    InvalidDocId(String),
    /// Reading or writing the backing file failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// A persisted record could not be encoded or decoded.
    #[error("storage serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Reject identifiers that could escape the storage directory.
fn validate_doc_id(doc_id: &str) -> Result<(), StoreError> {
    if doc_id.is_empty()
        || doc_id
            .chars()
            .any(|c| !c.is_ascii_alphanumeric() && c != '-' && c != '_')
    {
        return Err(StoreError::InvalidDocId(doc_id.to_string()));
    }
    Ok(())
}
