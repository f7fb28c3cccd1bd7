//! Core traits for opencontext abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for generating text embeddings.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate embeddings for the given texts.
    ///
    /// Returns a vector of embedding vectors, one per input text.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>>;

    /// Get the expected dimension of embedding vectors.
    fn dimension(&self) -> usize;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Backend for text generation (LLM).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate text with system context.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Combined inference backend supporting both embedding and generation.
#[async_trait]
pub trait InferenceBackend: EmbeddingBackend + GenerationBackend {
    /// Check if the backend is available and responding.
    async fn health_check(&self) -> Result<bool>;
}

// =============================================================================
// RETRIEVAL TRAITS
// =============================================================================

/// Source of scoped context chunks.
///
/// `Ok(None)` means the underlying store is not configured or reachable.
/// Callers treat that as "no context available" and continue without it;
/// only genuine retrieval failures surface as `Err`.
#[async_trait]
pub trait ContextSource: Send + Sync {
    /// Return the top-k most similar chunks for the query, or `None` when
    /// no vector store is available.
    async fn top_k(&self, query: RetrievalQuery) -> Result<Option<Vec<DocumentChunk>>>;
}

// =============================================================================
// API KEY REPOSITORY TRAITS
// =============================================================================

/// Repository for API key records. One key per user.
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    /// Store a new key (hash + display form) for a user.
    async fn create(&self, user_id: &str, hash: &str, display: &str) -> Result<ApiKeyRecord>;

    /// Look up a record by key hash.
    async fn get_by_hash(&self, hash: &str) -> Result<Option<ApiKeyRecord>>;

    /// Look up the record owned by a user.
    async fn get_for_user(&self, user_id: &str) -> Result<Option<ApiKeyRecord>>;

    /// Delete the user's key. Returns false when none existed.
    async fn delete_for_user(&self, user_id: &str) -> Result<bool>;
}

// =============================================================================
// JOB REPOSITORY TRAITS
// =============================================================================

/// Request for creating a new ingestion job.
#[derive(Debug, Clone)]
pub struct CreateJobRequest {
    pub user_id: String,
    pub name: String,
    pub job_url: Option<String>,
    pub job_type: JobType,
}

/// Filters for listing a user's jobs.
#[derive(Debug, Clone, Default)]
pub struct ListJobsRequest {
    /// Case-insensitive substring match on the job name.
    pub name_query: Option<String>,
    pub job_type: Option<JobType>,
    pub status: Option<JobStatus>,
}

/// Repository for ingestion job rows.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Insert a new job in `QUEUED` status.
    async fn create(&self, req: CreateJobRequest) -> Result<Job>;

    /// Fetch a job by id.
    async fn get(&self, job_id: Uuid) -> Result<Option<Job>>;

    /// Set the status of a single job. Idempotent; updating a job already
    /// in the target status is a no-op.
    async fn update_status(&self, job_id: Uuid, status: JobStatus) -> Result<()>;

    /// List a user's jobs, newest first, applying the request filters.
    async fn list_for_user(&self, user_id: &str, req: ListJobsRequest) -> Result<Vec<Job>>;

    /// Delete a job owned by the user. Returns false when nothing matched.
    async fn delete(&self, job_id: Uuid, user_id: &str) -> Result<bool>;
}
