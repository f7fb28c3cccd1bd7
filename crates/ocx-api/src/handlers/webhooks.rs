//! Receiver side of the signed worker-to-API webhook channel.
//!
//! Order of checks is fixed: signature over the raw body first, then JSON
//! parsing, then event dispatch. A body that fails verification is never
//! parsed.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use ocx_core::{
    ApiKeyRepository, ContentBlock, DocumentChunk, JobRepository, JobStatusChange, McpToolCall,
    Result, RetrievalQuery, WebhookEnvelope, WebhookEvent, CONTEXT_ERR_KEY_INVALID,
    CONTEXT_ERR_KEY_MISSING, CONTEXT_ERR_UNEXPECTED, SIGNATURE_HEADER,
};
use ocx_crypto::api_key;

use super::{error_body, internal_error};
use crate::state::AppState;

/// Response body of a synchronous `mcp.toolcall` event. Always 200; errors
/// travel inside `retrievedContext` so the worker can relay them verbatim.
#[derive(Debug, Serialize)]
pub struct ToolCallResponse {
    #[serde(rename = "retrievedContext")]
    pub retrieved_context: String,
}

/// POST /api/webhooks/events
#[instrument(skip(state, headers, body), fields(subsystem = "api", component = "webhooks", op = "receive_event"))]
pub async fn receive_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());

    let Some(signature) = signature else {
        warn!("Webhook request without signature header");
        return (
            StatusCode::UNAUTHORIZED,
            error_body("Missing webhook signature"),
        )
            .into_response();
    };

    if !state.signer.verify(&body, signature) {
        warn!("Webhook signature verification failed");
        return (
            StatusCode::UNAUTHORIZED,
            error_body("Invalid webhook signature"),
        )
            .into_response();
    }

    let envelope: WebhookEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error_msg = %e, "Webhook body failed to parse");
            return (StatusCode::BAD_REQUEST, error_body("Invalid webhook payload"))
                .into_response();
        }
    };

    debug!(
        event_id = %envelope.event_id,
        event_type = envelope.event.event_type(),
        "Webhook event received"
    );

    match envelope.event {
        WebhookEvent::JobStatusChanged { data } => handle_job_status_changed(&state, data).await,
        WebhookEvent::McpToolCall { data } => handle_mcp_tool_call(&state, data).await,
    }
}

async fn handle_job_status_changed(state: &AppState, data: JobStatusChange) -> Response {
    let job_id = match Uuid::parse_str(&data.job_id) {
        Ok(id) => id,
        Err(_) => {
            warn!(job_id = %data.job_id, "Status change carries a non-UUID job id");
            return (StatusCode::BAD_REQUEST, error_body("Invalid webhook payload"))
                .into_response();
        }
    };

    match state.db.jobs.update_status(job_id, data.status).await {
        Ok(()) => {
            info!(job_id = %job_id, job_status = %data.status, "Job status updated");
            (StatusCode::OK, Json(json!({ "received": "ok" }))).into_response()
        }
        Err(e) => internal_error(&e).into_response(),
    }
}

async fn handle_mcp_tool_call(state: &AppState, data: McpToolCall) -> Response {
    match retrieve_context(state, &data).await {
        Ok(retrieved_context) => (
            StatusCode::OK,
            Json(ToolCallResponse { retrieved_context }),
        )
            .into_response(),
        Err(e) => internal_error(&e).into_response(),
    }
}

/// Resolve the API key, run retrieval, and format the context string.
///
/// Auth failures and retrieval unavailability come back as `Ok` with one
/// of the fixed `ERROR:` strings, so the tool call always gets an answer
/// it can show the model. Only key-lookup database failures surface as
/// `Err`.
async fn retrieve_context(state: &AppState, call: &McpToolCall) -> Result<String> {
    if call.api_key.is_empty() {
        warn!("Tool call without an API key");
        return Ok(CONTEXT_ERR_KEY_MISSING.to_string());
    }

    let hash = api_key::hash(&call.api_key);
    let Some(record) = state.db.api_keys.get_by_hash(&hash).await? else {
        warn!("Tool call with an unknown API key");
        return Ok(CONTEXT_ERR_KEY_INVALID.to_string());
    };
    if record.api_key_hash != hash {
        warn!(user_id = %record.user_id, "Stored key hash does not match presented key");
        return Ok(CONTEXT_ERR_KEY_INVALID.to_string());
    }

    let retrieved = state
        .source
        .top_k(RetrievalQuery {
            user_id: record.user_id.clone(),
            // Tool calls search across all of the user's jobs.
            job_ids: vec![],
            k: ocx_core::defaults::RETRIEVAL_TOP_K,
            query: call.query.clone(),
        })
        .await;

    let chunks = match retrieved {
        Ok(Some(chunks)) => chunks,
        Ok(None) => {
            warn!(user_id = %record.user_id, "Vector store unavailable for tool call");
            return Ok(CONTEXT_ERR_UNEXPECTED.to_string());
        }
        Err(e) => {
            warn!(user_id = %record.user_id, error_msg = %e, "Retrieval failed for tool call");
            return Ok(CONTEXT_ERR_UNEXPECTED.to_string());
        }
    };

    debug!(
        user_id = %record.user_id,
        result_count = chunks.len(),
        "Tool call retrieval complete"
    );
    context_payload(&chunks)
}

/// Serialize retrieved chunks as the JSON content-block array the worker
/// relays back to the MCP client.
fn context_payload(chunks: &[DocumentChunk]) -> Result<String> {
    let blocks: Vec<ContentBlock> = chunks
        .iter()
        .map(|chunk| ContentBlock::text(chunk.page_content.clone()))
        .collect();
    serde_json::to_string(&blocks).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn chunk(content: &str) -> DocumentChunk {
        DocumentChunk {
            id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            job_id: "job-1".to_string(),
            page_content: content.to_string(),
            score: 0.9,
        }
    }

    #[test]
    fn test_context_payload_shape() {
        let payload = context_payload(&[chunk("first"), chunk("second")]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&payload).unwrap();

        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[0]["type"], "text");
        assert_eq!(parsed[0]["text"], "first");
        assert_eq!(parsed[1]["text"], "second");
    }

    #[test]
    fn test_context_payload_empty() {
        assert_eq!(context_payload(&[]).unwrap(), "[]");
    }
}
