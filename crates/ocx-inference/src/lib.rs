//! LLM inference backends for opencontext.
//!
//! Provides the Ollama-backed implementation of the core embedding and
//! generation traits, plus a deterministic mock for tests.

pub mod mock;
pub mod ollama;

pub use mock::{MockEmbeddingGenerator, MockInferenceBackend};
pub use ollama::OllamaBackend;
