//! HTTP request handlers.

pub mod api_keys;
pub mod chat;
pub mod jobs;
pub mod webhooks;

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::error;

use ocx_core::Error;

/// JSON error body in the `{"error": "..."}` shape every endpoint uses.
pub(crate) fn error_body(message: &str) -> Json<Value> {
    Json(json!({ "error": message }))
}

/// Map an internal failure to the generic 500 response. The cause goes to
/// the log, never to the client.
pub(crate) fn internal_error(err: &Error) -> (StatusCode, Json<Value>) {
    error!(error_msg = %err, "Request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        error_body("Internal server error"),
    )
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
