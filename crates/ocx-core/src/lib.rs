//! Core types, traits, and abstractions for opencontext.
//!
//! This crate holds everything shared between the API server and the MCP
//! worker: the error type, domain models, prompt/model-call types, webhook
//! wire types, backend traits, and structured-logging field constants.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod prompt;
pub mod traits;
pub mod webhook;

pub use error::{Error, Result};
pub use models::*;
pub use prompt::{ContentBlock, ModelCallParams, PromptMessage, RagScope, Role};
pub use traits::{
    ApiKeyRepository, ContextSource, CreateJobRequest, EmbeddingBackend, GenerationBackend,
    InferenceBackend, JobRepository, ListJobsRequest,
};
pub use webhook::{
    JobStatusChange, McpToolCall, ToolSelection, WebhookEnvelope, WebhookEvent,
    CONTEXT_ERR_KEY_INVALID, CONTEXT_ERR_KEY_MISSING, CONTEXT_ERR_UNEXPECTED, SIGNATURE_HEADER,
    WEBHOOK_PROVIDER,
};
