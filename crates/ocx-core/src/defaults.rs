//! Default configuration values shared across crates.

/// Number of chunks retrieved per context lookup.
///
/// Fixed at both retrieval call sites (RAG middleware and the MCP tool
/// path); not user-configurable.
pub const RETRIEVAL_TOP_K: i64 = 3;

/// Default Ollama endpoint.
pub const OLLAMA_URL: &str = "http://localhost:11434";

/// Default embedding model.
pub const EMBED_MODEL: &str = "nomic-embed-text";

/// Default generation model.
pub const GEN_MODEL: &str = "llama3.1:8b";

/// Default embedding dimension for nomic-embed-text.
pub const EMBED_DIMENSION: usize = 768;

/// Timeout for embedding requests (seconds).
pub const EMBED_TIMEOUT_SECS: u64 = 60;

/// Timeout for generation requests (seconds).
pub const GEN_TIMEOUT_SECS: u64 = 120;
