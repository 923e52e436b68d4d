//! HTTP surface coverage against the real pipeline, driven entirely through
//! the router with no network and no remote providers.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;

use documind::api::create_router;
use documind::config::Config;
use documind::service::DocumentService;

fn offline_config(data_dir: &Path) -> Arc<Config> {
    Arc::new(Config {
        api_key: None,
        api_base_url: "https://api.openai.com/v1".into(),
        embedding_model: "text-embedding-3-small".into(),
        embedding_dimension: 48,
        completion_models: vec!["gpt-4o-mini".into()],
        chunk_size: 120,
        chunk_overlap: 20,
        query_top_k: 4,
        data_dir: data_dir.to_path_buf(),
        server_port: None,
        log_file: None,
    })
}

fn app(data_dir: &Path) -> Router {
    let config = offline_config(data_dir);
    let service = DocumentService::new(Arc::clone(&config)).expect("service");
    create_router(Arc::new(service), config.uploads_dir())
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Upload a plain-text payload. The `.xps` name keeps the stored file on the
/// plain-text extraction path.
fn upload_request(content: &str) -> Request<Body> {
    let boundary = "X-DOCUMIND-IT";
    let body = format!(
        "--{boundary}\r\ncontent-disposition: form-data; name=\"file\"; filename=\"report.xps\"\r\ncontent-type: application/octet-stream\r\n\r\n{content}\r\n--{boundary}--\r\n"
    );
    Request::builder()
        .method(Method::POST)
        .uri("/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .expect("request")
}

#[tokio::test]
async fn health_is_ok() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = app(dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn unknown_document_reports_processing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = app(dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/insights/nonexistent")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "processing");
}

#[tokio::test]
async fn upload_process_query_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = app(dir.path());

    let content = "Annual Review 2024. Quarterly Revenue grew steadily across all regions. \
                   The team should review the updated projections before March 5, 2024. \
                   Operations at Acme Widgets Inc remain stable and predictable.";
    let response = app
        .clone()
        .oneshot(upload_request(content))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let upload = body_json(response).await;
    let doc_id = upload["doc_id"].as_str().expect("doc_id").to_string();
    assert_eq!(upload["filename"], "report.xps");

    // Ingestion runs in the background; poll until the record appears.
    let mut insights = Value::Null;
    for _ in 0..100 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/insights/{doc_id}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let body = body_json(response).await;
        if body["status"] == "ready" {
            insights = body;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(insights["status"], "ready", "ingestion never completed");
    assert!(insights["metadata"]["word_count"].as_u64().expect("count") > 20);
    assert!(!insights["insights"]["summary"].as_str().expect("summary").is_empty());

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/query")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "doc_id": doc_id,
                        "question": "What happened to revenue?"
                    })
                    .to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let answer = body_json(response).await;
    assert!(
        answer["answer"]
            .as_str()
            .expect("answer")
            .starts_with("Based on the most relevant passages")
    );
    assert!(!answer["sources"].as_array().expect("sources").is_empty());
}
