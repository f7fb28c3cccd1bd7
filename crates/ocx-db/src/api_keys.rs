//! API key repository.
//!
//! One key per user, enforced by a unique constraint on `user_id`. Only
//! the SHA-256 hash and a short display form are stored.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};

use ocx_core::{ApiKeyRecord, ApiKeyRepository, Error, Result};

/// PostgreSQL implementation of [`ApiKeyRepository`].
#[derive(Clone)]
pub struct PgApiKeyRepository {
    pool: PgPool,
}

impl PgApiKeyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse_api_key_row(row: &PgRow) -> ApiKeyRecord {
    ApiKeyRecord {
        id: row.get("id"),
        user_id: row.get("user_id"),
        api_key_hash: row.get("api_key_hash"),
        api_key_display: row.get("api_key_display"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl ApiKeyRepository for PgApiKeyRepository {
    // The parameter is named `display_form` rather than `display` because
    // the `instrument` macro expansion imports `tracing::field::display`,
    // which would shadow a parameter of that name and break compilation.
    #[instrument(skip(self, hash, display_form), fields(subsystem = "db", component = "api_keys", op = "create", user_id = %user_id, display = display_form))]
    async fn create(&self, user_id: &str, hash: &str, display_form: &str) -> Result<ApiKeyRecord> {
        let row = sqlx::query(
            r#"
            INSERT INTO api_keys (user_id, api_key_hash, api_key_display)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, api_key_hash, api_key_display, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(hash)
        .bind(display_form)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Error::Conflict(format!("API key already exists for user {}", user_id))
            }
            other => Error::Database(other),
        })?;

        debug!(user_id = %user_id, "API key record created");
        Ok(parse_api_key_row(&row))
    }

    async fn get_by_hash(&self, hash: &str) -> Result<Option<ApiKeyRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, api_key_hash, api_key_display, created_at, updated_at
            FROM api_keys
            WHERE api_key_hash = $1
            "#,
        )
        .bind(hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(parse_api_key_row))
    }

    async fn get_for_user(&self, user_id: &str) -> Result<Option<ApiKeyRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, api_key_hash, api_key_display, created_at, updated_at
            FROM api_keys
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(parse_api_key_row))
    }

    #[instrument(skip(self), fields(subsystem = "db", component = "api_keys", op = "delete", user_id = %user_id))]
    async fn delete_for_user(&self, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM api_keys WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }
}
