//! End-to-end webhook receiver tests.
//!
//! These drive the full router against a live PostgreSQL with the pgvector
//! extension and are ignored by default. Run with:
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/opencontext_test cargo test -- --ignored
//! ```

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use ocx_api::{router, AppState};
use ocx_core::{
    ApiKeyRepository, ContextSource, CreateJobRequest, GenerationBackend, JobRepository,
    JobStatus, JobType, Vector, CONTEXT_ERR_KEY_INVALID, CONTEXT_ERR_KEY_MISSING,
    CONTEXT_ERR_UNEXPECTED, SIGNATURE_HEADER,
};
use ocx_crypto::WebhookSigner;
use ocx_db::Database;
use ocx_inference::{MockEmbeddingGenerator, MockInferenceBackend};
use ocx_rag::{RagMiddleware, VectorStore};

const TEST_SECRET: &[u8] = b"test-webhook-secret";

async fn setup_db() -> Database {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/opencontext_test".to_string());
    let db = Database::connect(&url).await.expect("connect test db");
    db.migrate().await.expect("migrate test db");
    db
}

fn build_state(db: Database, source: Arc<dyn ContextSource>) -> AppState {
    let generator: Arc<dyn GenerationBackend> = Arc::new(MockInferenceBackend::new());
    AppState {
        db,
        generator: generator.clone(),
        source: source.clone(),
        rag: Arc::new(RagMiddleware::new(generator, source)),
        signer: WebhookSigner::new(TEST_SECRET.to_vec()),
    }
}

fn unique_user() -> String {
    format!("test-user-{}", Uuid::new_v4())
}

/// POST a body to /api/webhooks/events, signing it unless `signature`
/// overrides.
async fn post_event(
    state: AppState,
    body: String,
    signature: Option<&str>,
) -> (StatusCode, Value) {
    let signer = WebhookSigner::new(TEST_SECRET.to_vec());
    let signature = match signature {
        Some(sig) => sig.to_string(),
        None => signer.sign(body.as_bytes()),
    };

    let request = Request::builder()
        .method("POST")
        .uri("/api/webhooks/events")
        .header("content-type", "application/json")
        .header(SIGNATURE_HEADER, signature)
        .body(Body::from(body))
        .unwrap();

    let response = router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

fn envelope(event_type: &str, data: Value) -> String {
    json!({
        "provider": "opencontext-worker",
        "eventId": Uuid::new_v4(),
        "timestamp": "2026-01-01T00:00:00Z",
        "eventType": event_type,
        "data": data,
    })
    .to_string()
}

#[tokio::test]
#[ignore = "requires PostgreSQL with pgvector"]
async fn test_missing_signature_rejected() {
    let db = setup_db().await;
    let state = build_state(db, Arc::new(VectorStore::unavailable()));

    let body = envelope("job.status.changed", json!({"jobId": "x", "status": "QUEUED"}));
    let request = Request::builder()
        .method("POST")
        .uri("/api/webhooks/events")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();

    let response = router(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires PostgreSQL with pgvector"]
async fn test_invalid_signature_rejected() {
    let db = setup_db().await;
    let state = build_state(db, Arc::new(VectorStore::unavailable()));

    let body = envelope("job.status.changed", json!({"jobId": "x", "status": "QUEUED"}));
    let bogus = "0".repeat(64);
    let (status, response) = post_event(state, body, Some(&bogus)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response["error"], "Invalid webhook signature");
}

#[tokio::test]
#[ignore = "requires PostgreSQL with pgvector"]
async fn test_unknown_event_type_rejected() {
    let db = setup_db().await;
    let state = build_state(db, Arc::new(VectorStore::unavailable()));

    let body = envelope("job.priority.updated", json!({"jobId": "x", "priority": 5}));
    let (status, response) = post_event(state, body, None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Invalid webhook payload");
}

#[tokio::test]
#[ignore = "requires PostgreSQL with pgvector"]
async fn test_job_status_changed_updates_row() {
    let db = setup_db().await;
    let user = unique_user();

    let job = db
        .jobs
        .create(CreateJobRequest {
            user_id: user.clone(),
            name: "status test".to_string(),
            job_url: None,
            job_type: JobType::Text,
        })
        .await
        .unwrap();

    let state = build_state(db.clone(), Arc::new(VectorStore::unavailable()));
    let body = envelope(
        "job.status.changed",
        json!({"jobId": job.id.to_string(), "status": "PROCESSED"}),
    );
    let (status, response) = post_event(state, body, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["received"], "ok");

    let updated = db.jobs.get(job.id).await.unwrap().unwrap();
    assert_eq!(updated.status, JobStatus::Processed);
}

#[tokio::test]
#[ignore = "requires PostgreSQL with pgvector"]
async fn test_job_status_changed_non_uuid_job_id() {
    let db = setup_db().await;
    let state = build_state(db, Arc::new(VectorStore::unavailable()));

    let body = envelope(
        "job.status.changed",
        json!({"jobId": "not-a-uuid", "status": "PROCESSED"}),
    );
    let (status, response) = post_event(state, body, None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Invalid webhook payload");
}

#[tokio::test]
#[ignore = "requires PostgreSQL with pgvector"]
async fn test_toolcall_missing_api_key() {
    let db = setup_db().await;
    let state = build_state(db, Arc::new(VectorStore::unavailable()));

    let body = envelope(
        "mcp.toolcall",
        json!({"apiKey": "", "query": "what is rust", "selection": "context_retriever"}),
    );
    let (status, response) = post_event(state, body, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["retrievedContext"], CONTEXT_ERR_KEY_MISSING);
}

#[tokio::test]
#[ignore = "requires PostgreSQL with pgvector"]
async fn test_toolcall_unknown_api_key() {
    let db = setup_db().await;
    let state = build_state(db, Arc::new(VectorStore::unavailable()));

    let body = envelope(
        "mcp.toolcall",
        json!({
            "apiKey": "sk-proj-0000000000000000000000000000000000000000000000ff",
            "query": "what is rust",
            "selection": "context_retriever"
        }),
    );
    let (status, response) = post_event(state, body, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["retrievedContext"], CONTEXT_ERR_KEY_INVALID);
}

#[tokio::test]
#[ignore = "requires PostgreSQL with pgvector"]
async fn test_toolcall_store_unavailable() {
    let db = setup_db().await;
    let user = unique_user();

    let raw = ocx_crypto::api_key::generate();
    db.api_keys
        .create(
            &user,
            &ocx_crypto::api_key::hash(&raw),
            &ocx_crypto::api_key::display(&raw),
        )
        .await
        .unwrap();

    let state = build_state(db, Arc::new(VectorStore::unavailable()));
    let body = envelope(
        "mcp.toolcall",
        json!({"apiKey": raw, "query": "what is rust", "selection": "context_retriever"}),
    );
    let (status, response) = post_event(state, body, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["retrievedContext"], CONTEXT_ERR_UNEXPECTED);
}

#[tokio::test]
#[ignore = "requires PostgreSQL with pgvector"]
async fn test_toolcall_returns_context_blocks() {
    let db = setup_db().await;
    let user = unique_user();

    let raw = ocx_crypto::api_key::generate();
    db.api_keys
        .create(
            &user,
            &ocx_crypto::api_key::hash(&raw),
            &ocx_crypto::api_key::display(&raw),
        )
        .await
        .unwrap();

    // Seed one chunk the way the ingestion pipeline would.
    let content = "Rust is a systems programming language.";
    let embedding = Vector::from(MockEmbeddingGenerator::generate(content, 768));
    sqlx::query(
        "INSERT INTO document_chunks (user_id, job_id, content, embedding)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(&user)
    .bind("job-1")
    .bind(content)
    .bind(&embedding)
    .execute(&db.pool)
    .await
    .unwrap();

    let embedder = Arc::new(MockInferenceBackend::new());
    let store = VectorStore::new(db.chunks.clone(), embedder);

    let state = build_state(db, Arc::new(store));
    let body = envelope(
        "mcp.toolcall",
        json!({"apiKey": raw, "query": "what is rust", "selection": "context_retriever"}),
    );
    let (status, response) = post_event(state, body, None).await;

    assert_eq!(status, StatusCode::OK);

    let context: Value =
        serde_json::from_str(response["retrievedContext"].as_str().unwrap()).unwrap();
    let blocks = context.as_array().unwrap();
    assert!(!blocks.is_empty());
    assert_eq!(blocks[0]["type"], "text");
    assert!(blocks
        .iter()
        .any(|block| block["text"] == content));
}
