#![deny(missing_docs)]

//! Core library for the DocuMind document intelligence backend.

/// HTTP routing and REST handlers.
pub mod api;
/// Character-window text chunking.
pub mod chunk;
/// Completion client abstraction and adapters.
pub mod completion;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and fallback chain.
pub mod embedding;
/// Plain-text extraction from uploaded documents.
pub mod extract;
/// Tiered document insight analysis.
pub mod insights;
/// Structured logging and tracing setup.
pub mod logging;
/// Retrieval-augmented question answering.
pub mod query;
/// Document pipeline orchestration.
pub mod service;
/// Durable per-document vector and insight storage.
pub mod store;
