//! MCP transport: a single JSON-RPC endpoint over HTTP.
//!
//! The API key arrives as a transport header and is threaded explicitly
//! into the tool call; no request-scoped state lives outside the handler.

use std::any::Any;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, instrument, warn};

use crate::jsonrpc::{error_codes, JsonRpcRequest, JsonRpcResponse};
use crate::tools::{call_context_retriever, tool_descriptor, API_KEY_HEADER, CONTEXT_RETRIEVER_TOOL};
use crate::webhook_client::WebhookClient;

/// Build the worker router.
pub fn router(client: Arc<WebhookClient>) -> Router {
    Router::new()
        .route("/mcp", post(handle_rpc))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(client)
}

/// Unhandled failures still answer in JSON-RPC shape.
fn panic_response(_err: Box<dyn Any + Send + 'static>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(JsonRpcResponse::error(
            None,
            error_codes::INTERNAL_ERROR,
            "Internal server error",
        )),
    )
        .into_response()
}

#[instrument(skip(client, headers, body), fields(subsystem = "mcp", component = "server", op = "handle_rpc"))]
async fn handle_rpc(
    State(client): State<Arc<WebhookClient>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if api_key.is_empty() {
        warn!("MCP request without API key header");
        return (
            StatusCode::UNAUTHORIZED,
            Json(JsonRpcResponse::error(
                None,
                error_codes::MISSING_API_KEY,
                "API key is missing",
            )),
        )
            .into_response();
    }

    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error_msg = %e, "MCP request body failed to parse");
            return (
                StatusCode::BAD_REQUEST,
                Json(JsonRpcResponse::error(
                    None,
                    error_codes::PARSE_ERROR,
                    "Parse error",
                )),
            )
                .into_response();
        }
    };

    debug!(method = %request.method, "MCP request");

    let response = dispatch(&client, api_key, request).await;
    (StatusCode::OK, Json(response)).into_response()
}

async fn dispatch(client: &WebhookClient, api_key: &str, request: JsonRpcRequest) -> JsonRpcResponse {
    match request.method.as_str() {
        "initialize" => JsonRpcResponse::success(request.id, initialize_result()),
        "tools/list" => JsonRpcResponse::success(
            request.id,
            json!({ "tools": [tool_descriptor()] }),
        ),
        "tools/call" => {
            let params = request.params.unwrap_or(Value::Null);
            let name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");

            if name != CONTEXT_RETRIEVER_TOOL {
                return JsonRpcResponse::error(
                    request.id,
                    error_codes::INVALID_PARAMS,
                    format!("Unknown tool: {}", name),
                );
            }

            let query = params
                .get("arguments")
                .and_then(|arguments| arguments.get("query"))
                .and_then(|v| v.as_str());

            let Some(query) = query else {
                return JsonRpcResponse::error(
                    request.id,
                    error_codes::INVALID_PARAMS,
                    "Missing required argument: query",
                );
            };

            let result = call_context_retriever(client, api_key, query).await;
            JsonRpcResponse::success(request.id, result)
        }
        other => JsonRpcResponse::error(
            request.id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", other),
        ),
    }
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": "2024-11-05",
        "capabilities": { "tools": {} },
        "serverInfo": {
            "name": "opencontext-mcp",
            "version": env!("CARGO_PKG_VERSION"),
        }
    })
}
