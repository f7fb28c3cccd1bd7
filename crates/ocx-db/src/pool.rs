//! Connection pool construction.

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use ocx_core::{Error, Result};

/// Pool sizing and timeout settings.
///
/// Sizing can be overridden through `DB_MAX_CONNECTIONS` and
/// `DB_MIN_CONNECTIONS`; timeouts are fixed.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

impl PoolConfig {
    /// Settings with environment overrides applied.
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            max_connections: env_u32("DB_MAX_CONNECTIONS", base.max_connections),
            min_connections: env_u32("DB_MIN_CONNECTIONS", base.min_connections),
            ..base
        }
    }
}

fn env_u32(var: &str, fallback: u32) -> u32 {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(fallback)
}

/// Open a PostgreSQL pool with settings from the environment.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    let config = PoolConfig::from_env();
    let start = Instant::now();

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "pool",
        op = "connect",
        max_connections = config.max_connections,
        pool_size = pool.size(),
        pool_idle = pool.num_idle(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Database connection pool established"
    );
    Ok(pool)
}
