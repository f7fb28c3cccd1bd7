//! Shared application state.

use std::sync::Arc;

use ocx_core::{ContextSource, GenerationBackend};
use ocx_crypto::WebhookSigner;
use ocx_db::Database;
use ocx_rag::RagMiddleware;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Generation backend for chat replies.
    pub generator: Arc<dyn GenerationBackend>,
    /// Context source for webhook tool calls (the RAG middleware holds its
    /// own handle for the chat path).
    pub source: Arc<dyn ContextSource>,
    pub rag: Arc<RagMiddleware>,
    /// Verifies inbound webhook signatures.
    pub signer: WebhookSigner,
}
