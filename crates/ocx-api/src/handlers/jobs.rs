//! Ingestion job endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use ocx_core::{CreateJobRequest, JobRepository, JobStatus, JobType, ListJobsRequest};

use super::{error_body, internal_error};
use crate::auth::SessionUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateJobBody {
    pub name: String,
    #[serde(rename = "jobUrl")]
    pub job_url: Option<String>,
    #[serde(rename = "jobType")]
    pub job_type: JobType,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListJobsQuery {
    /// Case-insensitive substring filter on the job name.
    pub name: Option<String>,
    #[serde(rename = "jobType")]
    pub job_type: Option<JobType>,
    pub status: Option<JobStatus>,
}

/// POST /api/jobs: create a job in `QUEUED` status.
#[instrument(skip(state, body, user_id), fields(subsystem = "api", component = "jobs", op = "create", user_id = %user_id))]
pub async fn create_job(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
    Json(body): Json<CreateJobBody>,
) -> Response {
    if body.name.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, error_body("Job name is required")).into_response();
    }

    let req = CreateJobRequest {
        user_id,
        name: body.name,
        job_url: body.job_url,
        job_type: body.job_type,
    };

    match state.db.jobs.create(req).await {
        Ok(job) => {
            info!(job_id = %job.id, job_type = %job.job_type, "Job created");
            (StatusCode::CREATED, Json(job)).into_response()
        }
        Err(e) => internal_error(&e).into_response(),
    }
}

/// GET /api/jobs: the user's jobs, newest first, with optional filters.
pub async fn list_jobs(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
    Query(query): Query<ListJobsQuery>,
) -> Response {
    let req = ListJobsRequest {
        name_query: query.name,
        job_type: query.job_type,
        status: query.status,
    };

    match state.db.jobs.list_for_user(&user_id, req).await {
        Ok(jobs) => (StatusCode::OK, Json(jobs)).into_response(),
        Err(e) => internal_error(&e).into_response(),
    }
}

/// DELETE /api/jobs/:id
#[instrument(skip(state, user_id, job_id), fields(subsystem = "api", component = "jobs", op = "delete", user_id = %user_id, job_id = %job_id))]
pub async fn delete_job(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
    Path(job_id): Path<Uuid>,
) -> Response {
    match state.db.jobs.delete(job_id, &user_id).await {
        Ok(true) => {
            info!("Job deleted");
            (StatusCode::OK, Json(json!({ "deleted": true }))).into_response()
        }
        Ok(false) => (StatusCode::NOT_FOUND, error_body("Job not found")).into_response(),
        Err(e) => internal_error(&e).into_response(),
    }
}
