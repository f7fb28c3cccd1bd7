//! Ingestion job repository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

use ocx_core::{
    CreateJobRequest, Error, Job, JobRepository, JobStatus, JobType, ListJobsRequest, Result,
};

use crate::escape_like;

/// PostgreSQL implementation of [`JobRepository`].
#[derive(Clone)]
pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse_job_row(row: &PgRow) -> Result<Job> {
    let status_str: String = row.get("status");
    let type_str: String = row.get("job_type");

    let status = JobStatus::parse(&status_str)
        .ok_or_else(|| Error::Internal(format!("Unknown job status in database: {}", status_str)))?;
    let job_type = JobType::parse(&type_str)
        .ok_or_else(|| Error::Internal(format!("Unknown job type in database: {}", type_str)))?;

    Ok(Job {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        job_url: row.get("job_url"),
        status,
        job_type,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl JobRepository for PgJobRepository {
    #[instrument(skip(self, req), fields(subsystem = "db", component = "jobs", op = "create", user_id = %req.user_id, job_type = %req.job_type))]
    async fn create(&self, req: CreateJobRequest) -> Result<Job> {
        let row = sqlx::query(
            r#"
            INSERT INTO jobs (user_id, name, job_url, status, job_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, name, job_url, status, job_type, created_at, updated_at
            "#,
        )
        .bind(&req.user_id)
        .bind(&req.name)
        .bind(&req.job_url)
        .bind(JobStatus::Queued.as_str())
        .bind(req.job_type.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        parse_job_row(&row)
    }

    async fn get(&self, job_id: Uuid) -> Result<Option<Job>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, name, job_url, status, job_type, created_at, updated_at
            FROM jobs
            WHERE id = $1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(parse_job_row).transpose()
    }

    #[instrument(skip(self), fields(subsystem = "db", component = "jobs", op = "update_status", job_id = %job_id, job_status = %status))]
    async fn update_status(&self, job_id: Uuid, status: JobStatus) -> Result<()> {
        let result = sqlx::query("UPDATE jobs SET status = $1, updated_at = now() WHERE id = $2")
            .bind(status.as_str())
            .bind(job_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            rows_affected = result.rows_affected(),
            "Job status update applied"
        );
        Ok(())
    }

    async fn list_for_user(&self, user_id: &str, req: ListJobsRequest) -> Result<Vec<Job>> {
        let name_pattern = req
            .name_query
            .as_deref()
            .map(|q| format!("%{}%", escape_like(q)));

        let rows = sqlx::query(
            r#"
            SELECT id, user_id, name, job_url, status, job_type, created_at, updated_at
            FROM jobs
            WHERE user_id = $1
              AND ($2::text IS NULL OR name ILIKE $2)
              AND ($3::text IS NULL OR job_type = $3)
              AND ($4::text IS NULL OR status = $4)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(name_pattern)
        .bind(req.job_type.map(|t| t.as_str()))
        .bind(req.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(parse_job_row).collect()
    }

    #[instrument(skip(self), fields(subsystem = "db", component = "jobs", op = "delete", job_id = %job_id, user_id = %user_id))]
    async fn delete(&self, job_id: Uuid, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1 AND user_id = $2")
            .bind(job_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }
}
