//! # ocx-db
//!
//! PostgreSQL database layer for opencontext.
//!
//! This crate provides:
//! - Connection pool management
//! - API key and ingestion job repositories
//! - Document chunk vector search with pgvector
//!
//! ## Example
//!
//! ```rust,ignore
//! use ocx_db::Database;
//! use ocx_core::ApiKeyRepository;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/opencontext").await?;
//!     db.migrate().await?;
//!
//!     let record = db.api_keys.get_for_user("user-1").await?;
//!     println!("{:?}", record);
//!     Ok(())
//! }
//! ```

pub mod api_keys;
pub mod chunks;
pub mod jobs;
pub mod pool;

// Re-export core types
pub use ocx_core::*;

pub use api_keys::PgApiKeyRepository;
pub use chunks::PgChunkRepository;
pub use jobs::PgJobRepository;
pub use pool::{create_pool, PoolConfig};

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// API key repository.
    pub api_keys: PgApiKeyRepository,
    /// Ingestion job repository.
    pub jobs: PgJobRepository,
    /// Document chunk vector search.
    pub chunks: PgChunkRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            api_keys: PgApiKeyRepository::new(pool.clone()),
            jobs: PgJobRepository::new(pool.clone()),
            chunks: PgChunkRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Run pending schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Internal(format!("Migration failed: {}", e)))?;
        Ok(())
    }
}
