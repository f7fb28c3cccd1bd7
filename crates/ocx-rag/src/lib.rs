//! # ocx-rag
//!
//! Conditional retrieval-augmented generation for opencontext.
//!
//! Three pieces:
//! - [`prompts`]: the classifier and hypothetical-answer (HyDE) LLM calls
//! - [`retrieval`]: the pgvector-backed [`VectorStore`] context source
//! - [`middleware`]: [`RagMiddleware`], which gates and splices context
//!   into model-call parameters

pub mod middleware;
pub mod prompts;
pub mod retrieval;

pub use middleware::RagMiddleware;
pub use prompts::{MessageKind, CLASSIFIER_SYSTEM_PROMPT, CONTEXT_PREAMBLE, HYDE_SYSTEM_PROMPT};
pub use retrieval::VectorStore;
