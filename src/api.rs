//! HTTP surface for DocuMind.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `POST /upload` – Accept a multipart document upload, assign a `doc_id`,
//!   and kick off background ingestion. Returns immediately with
//!   `{ "doc_id", "filename" }`; processing completes asynchronously.
//! - `POST /query` – Answer a question against a processed document. Always
//!   returns an answer envelope; pipeline failures are folded into the
//!   answer text rather than surfaced as HTTP errors.
//! - `GET /insights/{doc_id}` – Cached insight record for a document, or a
//!   `processing` status while ingestion is still in flight.
//! - `GET /health` – Liveness probe.
//!
//! The router is generic over [`DocumentApi`] so tests can drive it with a
//! stub service.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::query::AnswerRecord;
use crate::service::DocumentApi;
use crate::store::StoreError;

/// Shared state handed to every handler.
pub struct AppState<S> {
    service: Arc<S>,
    uploads_dir: PathBuf,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            uploads_dir: self.uploads_dir.clone(),
        }
    }
}

/// Build the HTTP router exposing the document pipeline.
pub fn create_router<S>(service: Arc<S>, uploads_dir: PathBuf) -> Router
where
    S: DocumentApi + 'static,
{
    Router::new()
        .route("/upload", post(upload_document::<S>))
        .route("/query", post(query_document::<S>))
        .route("/insights/:doc_id", get(get_insights::<S>))
        .route("/health", get(health))
        .with_state(AppState {
            service,
            uploads_dir,
        })
}

/// Success response for the `POST /upload` endpoint.
#[derive(Serialize)]
struct UploadResponse {
    /// Identifier assigned to the uploaded document.
    doc_id: String,
    /// Original filename as supplied by the client.
    filename: String,
}

/// Accept a document upload and start background ingestion.
///
/// The handler persists the raw bytes under a fresh `doc_id`, spawns the
/// processing pipeline, and returns without waiting for it. Processing
/// failures are logged; clients observe them as a permanently `processing`
/// insight status.
async fn upload_document<S>(
    State(state): State<AppState<S>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError>
where
    S: DocumentApi + 'static,
{
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| AppError::BadRequest(format!("invalid multipart body: {error}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .unwrap_or("document.pdf")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|error| AppError::BadRequest(format!("failed to read upload: {error}")))?;
        upload = Some((filename, bytes.to_vec()));
        break;
    }

    let Some((filename, bytes)) = upload else {
        return Err(AppError::BadRequest(
            "multipart field 'file' is required".into(),
        ));
    };
    if bytes.is_empty() {
        return Err(AppError::BadRequest("uploaded file is empty".into()));
    }

    let doc_id = uuid::Uuid::new_v4().simple().to_string();
    let stored_path = state
        .uploads_dir
        .join(format!("{doc_id}.{}", stored_extension(&filename)));

    tokio::fs::create_dir_all(&state.uploads_dir)
        .await
        .map_err(|error| AppError::Internal(error.to_string()))?;
    tokio::fs::write(&stored_path, &bytes)
        .await
        .map_err(|error| AppError::Internal(error.to_string()))?;

    tracing::info!(
        doc_id,
        filename,
        size = bytes.len(),
        "Upload stored; starting background processing"
    );

    let service = Arc::clone(&state.service);
    let spawn_doc_id = doc_id.clone();
    tokio::spawn(async move {
        if let Err(error) = service.process_document(&spawn_doc_id, &stored_path).await {
            tracing::error!(
                doc_id = spawn_doc_id,
                error = %error,
                "Background document processing failed"
            );
        }
    });

    Ok(Json(UploadResponse { doc_id, filename }))
}

/// Pick the on-disk extension for an upload. Only `pdf` and `xps` are kept;
/// everything else is stored as `pdf` so the extractor treats ambiguous
/// uploads uniformly.
fn stored_extension(filename: &str) -> &'static str {
    match std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("xps") => "xps",
        _ => "pdf",
    }
}

/// Request body for the `POST /query` endpoint.
#[derive(Deserialize)]
struct QueryRequest {
    /// Identifier returned by `POST /upload`.
    doc_id: String,
    /// Question to answer against the document.
    question: String,
}

/// Answer a question against a processed document.
async fn query_document<S>(
    State(state): State<AppState<S>>,
    Json(request): Json<QueryRequest>,
) -> Json<AnswerRecord>
where
    S: DocumentApi,
{
    let record = state
        .service
        .answer(&request.doc_id, &request.question)
        .await;
    Json(record)
}

/// Return the cached insight record, or a `processing` status while absent.
async fn get_insights<S>(
    State(state): State<AppState<S>>,
    Path(doc_id): Path<String>,
) -> Result<Json<Value>, AppError>
where
    S: DocumentApi,
{
    match state.service.cached_insights(&doc_id)? {
        Some(record) => Ok(Json(json!({
            "status": "ready",
            "doc_id": record.doc_id,
            "insights": record.insights,
            "metadata": {
                "num_chunks": record.num_chunks,
                "page_count": record.page_count,
                "word_count": record.word_count,
            },
        }))),
        None => Ok(Json(json!({
            "status": "processing",
            "doc_id": doc_id,
            "message": "Insights are not ready yet. Try again shortly.",
        }))),
    }
}

/// Liveness probe.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

enum AppError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            Self::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(inner: StoreError) -> Self {
        match inner {
            StoreError::InvalidDocId(_) => Self::BadRequest(inner.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}
