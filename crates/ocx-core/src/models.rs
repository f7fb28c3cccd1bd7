//! Shared domain models for opencontext.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Vector type re-exported from pgvector for shared use.
pub use pgvector::Vector;

/// Lifecycle status of an ingestion job.
///
/// Wire representation is upper-case (`"QUEUED"`, `"PROCESSED"`, ...), both
/// in the database and in `job.status.changed` webhook payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Queued,
    Cancelled,
    Processing,
    Error,
    Processed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::Cancelled => "CANCELLED",
            JobStatus::Processing => "PROCESSING",
            JobStatus::Error => "ERROR",
            JobStatus::Processed => "PROCESSED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "QUEUED" => Some(JobStatus::Queued),
            "CANCELLED" => Some(JobStatus::Cancelled),
            "PROCESSING" => Some(JobStatus::Processing),
            "ERROR" => Some(JobStatus::Error),
            "PROCESSED" => Some(JobStatus::Processed),
            _ => None,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of content an ingestion job processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    Text,
    YtVideo,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Text => "TEXT",
            JobType::YtVideo => "YT_VIDEO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TEXT" => Some(JobType::Text),
            "YT_VIDEO" => Some(JobType::YtVideo),
            _ => None,
        }
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ingestion job owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    /// Source URL for URL-backed job types (e.g. YouTube videos).
    pub job_url: Option<String>,
    pub status: JobStatus,
    pub job_type: JobType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored API key record.
///
/// The raw key is never persisted; only its SHA-256 hash and a short
/// display form survive creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    pub id: Uuid,
    pub user_id: String,
    pub api_key_hash: String,
    pub api_key_display: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A retrieved document chunk with its similarity score.
///
/// Chunks are written by the ingestion pipeline (out of scope here) and
/// only read by retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: Uuid,
    pub user_id: String,
    pub job_id: String,
    pub page_content: String,
    /// Cosine similarity to the query vector, higher is more similar.
    pub score: f32,
}

/// Scoped top-k retrieval request.
#[derive(Debug, Clone)]
pub struct RetrievalQuery {
    /// Owner whose chunks are searched. Always applied.
    pub user_id: String,
    /// Restrict to these jobs; empty means all jobs for the user.
    pub job_ids: Vec<String>,
    /// Maximum number of chunks to return.
    pub k: i64,
    /// Natural-language query text to embed and match.
    pub query: String,
}
