//! Vector store adapter.
//!
//! Wraps embedding plus pgvector chunk search behind [`ContextSource`].
//! An unconfigured store is a first-class state: `top_k` answers
//! `Ok(None)` and callers continue without context instead of failing the
//! request.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use ocx_core::{ContextSource, DocumentChunk, EmbeddingBackend, Error, Result, RetrievalQuery};
use ocx_db::PgChunkRepository;

struct StoreInner {
    chunks: PgChunkRepository,
    embedder: Arc<dyn EmbeddingBackend>,
}

/// pgvector-backed [`ContextSource`].
pub struct VectorStore {
    inner: Option<StoreInner>,
}

impl VectorStore {
    /// Build an operational store over the chunk repository and embedder.
    pub fn new(chunks: PgChunkRepository, embedder: Arc<dyn EmbeddingBackend>) -> Self {
        Self {
            inner: Some(StoreInner { chunks, embedder }),
        }
    }

    /// Build a store that reports itself unavailable. Retrieval callers
    /// fail open when they see it.
    pub fn unavailable() -> Self {
        Self { inner: None }
    }

    pub fn is_available(&self) -> bool {
        self.inner.is_some()
    }
}

#[async_trait]
impl ContextSource for VectorStore {
    #[instrument(skip(self, query), fields(subsystem = "rag", component = "vector_store", op = "top_k", user_id = %query.user_id))]
    async fn top_k(&self, query: RetrievalQuery) -> Result<Option<Vec<DocumentChunk>>> {
        let Some(inner) = &self.inner else {
            warn!("Vector store not configured, skipping retrieval");
            return Ok(None);
        };

        let start = Instant::now();

        let embeddings = inner.embedder.embed_texts(&[query.query.clone()]).await?;
        let query_vec = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("Backend returned no query vector".to_string()))?;

        let chunks = inner
            .chunks
            .search_similar(&query_vec, &query.user_id, &query.job_ids, query.k)
            .await?;

        debug!(
            result_count = chunks.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Context retrieval complete"
        );
        Ok(Some(chunks))
    }
}
