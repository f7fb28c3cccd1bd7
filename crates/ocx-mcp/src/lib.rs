//! ocx-mcp - MCP worker for opencontext
//!
//! Exposes the `context_retriever` tool over JSON-RPC and forwards tool
//! calls and job-status changes to the main server over the signed webhook
//! channel.

pub mod jsonrpc;
pub mod server;
pub mod tools;
pub mod webhook_client;

pub use jsonrpc::{error_codes, JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use server::router;
pub use tools::{API_KEY_HEADER, CONTEXT_RETRIEVER_TOOL};
pub use webhook_client::{WebhookClient, WEBHOOK_ENDPOINT_VAR};
