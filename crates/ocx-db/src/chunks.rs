//! Document chunk vector search.
//!
//! Chunk rows are produced by the ingestion pipeline; this repository only
//! reads them. Similarity uses pgvector cosine distance, scoped to a user
//! and optionally to a set of jobs.

use pgvector::Vector;
use sqlx::{PgPool, Row};
use tracing::{instrument, trace};

use ocx_core::{DocumentChunk, Error, Result};

/// PostgreSQL implementation of chunk similarity search.
#[derive(Clone)]
pub struct PgChunkRepository {
    pool: PgPool,
}

impl PgChunkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Top-k chunks most similar to `query_vec`, owned by `user_id`.
    ///
    /// An empty `job_ids` slice means all of the user's jobs; otherwise
    /// results are restricted to the listed jobs.
    #[instrument(skip(self, query_vec, job_ids), fields(subsystem = "db", component = "chunks", op = "search_similar", user_id = %user_id, job_filter = !job_ids.is_empty()))]
    pub async fn search_similar(
        &self,
        query_vec: &Vector,
        user_id: &str,
        job_ids: &[String],
        k: i64,
    ) -> Result<Vec<DocumentChunk>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, job_id, content,
                   1.0 - (embedding <=> $1::vector) AS score
            FROM document_chunks
            WHERE user_id = $2
              AND (cardinality($3::text[]) = 0 OR job_id = ANY($3))
            ORDER BY embedding <=> $1::vector
            LIMIT $4
            "#,
        )
        .bind(query_vec)
        .bind(user_id)
        .bind(job_ids)
        .bind(k)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let chunks: Vec<DocumentChunk> = rows
            .into_iter()
            .map(|row| DocumentChunk {
                id: row.get("id"),
                user_id: row.get("user_id"),
                job_id: row.get("job_id"),
                page_content: row.get("content"),
                score: row.get::<f64, _>("score") as f32,
            })
            .collect();

        trace!(result_count = chunks.len(), "Chunk similarity search done");
        Ok(chunks)
    }
}
