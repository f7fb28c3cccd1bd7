//! The `context_retriever` MCP tool.
//!
//! The worker has no database of its own: the tool call is forwarded over
//! the signed webhook channel and the main server answers synchronously
//! with the retrieved context (or one of the fixed `ERROR:` strings).

use serde_json::{json, Value};
use tracing::{instrument, warn};

use ocx_core::{McpToolCall, ToolSelection, WebhookEvent, CONTEXT_ERR_UNEXPECTED};

use crate::webhook_client::WebhookClient;

/// Transport header carrying the caller's API key.
pub const API_KEY_HEADER: &str = "opencontext_api_key";

/// Tool name as listed and called over MCP.
pub const CONTEXT_RETRIEVER_TOOL: &str = "context_retriever";

/// Descriptor returned by `tools/list`.
pub fn tool_descriptor() -> Value {
    json!({
        "name": CONTEXT_RETRIEVER_TOOL,
        "description": "Retrieve relevant context from the user's ingested documents.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Natural-language question to search context for"
                }
            },
            "required": ["query"]
        }
    })
}

/// Forward a tool call to the main server and wrap its answer as an MCP
/// tool result.
///
/// Delivery or shape failures degrade to the fixed unexpected-error string
/// instead of failing the RPC: the model gets a context string either way.
#[instrument(skip(client, api_key, query), fields(subsystem = "mcp", component = "tools", op = "context_retriever"))]
pub async fn call_context_retriever(client: &WebhookClient, api_key: &str, query: &str) -> Value {
    let event = WebhookEvent::McpToolCall {
        data: McpToolCall {
            api_key: api_key.to_string(),
            query: query.to_string(),
            selection: ToolSelection::ContextRetriever,
        },
    };

    let context = match client.send(event).await {
        Ok(reply) => match reply.get("retrievedContext").and_then(|v| v.as_str()) {
            Some(context) => context.to_string(),
            None => {
                warn!("Receiver reply missing retrievedContext");
                CONTEXT_ERR_UNEXPECTED.to_string()
            }
        },
        Err(e) => {
            warn!(error_msg = %e, "Tool call delivery failed");
            CONTEXT_ERR_UNEXPECTED.to_string()
        }
    };

    tool_result(&context)
}

/// MCP tool result: the structured content, repeated in serialized form as
/// the text block for clients that only read `content`.
fn tool_result(context: &str) -> Value {
    let structured = json!({ "retrievedContext": context });
    json!({
        "content": [{ "type": "text", "text": structured.to_string() }],
        "structuredContent": structured,
    })
}
