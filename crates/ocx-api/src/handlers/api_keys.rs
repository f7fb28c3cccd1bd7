//! API key issuance and management.
//!
//! One key per user. The raw key appears exactly once, in the creation
//! response; afterwards only the truncated display form is shown.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{info, instrument};

use ocx_core::{ApiKeyRepository, Error};
use ocx_crypto::api_key;

use super::{error_body, internal_error};
use crate::auth::SessionUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ApiKeyView {
    #[serde(rename = "apiKeyDisplay")]
    pub api_key_display: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

/// GET /api/keys: the user's key in display form, nulls when none exists.
pub async fn get_api_key(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
) -> Response {
    match state.db.api_keys.get_for_user(&user_id).await {
        Ok(record) => {
            let view = match record {
                Some(record) => ApiKeyView {
                    api_key_display: Some(record.api_key_display),
                    created_at: Some(record.created_at),
                },
                None => ApiKeyView {
                    api_key_display: None,
                    created_at: None,
                },
            };
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(e) => internal_error(&e).into_response(),
    }
}

/// POST /api/keys: issue a new key. A user that already holds one gets 409
/// and must delete it first.
#[instrument(skip(state, user_id), fields(subsystem = "api", component = "api_keys", op = "create", user_id = %user_id))]
pub async fn create_api_key(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
) -> Response {
    let raw = api_key::generate();
    let hash = api_key::hash(&raw);
    let display = api_key::display(&raw);

    match state.db.api_keys.create(&user_id, &hash, &display).await {
        Ok(record) => {
            info!("API key issued");
            (
                StatusCode::CREATED,
                Json(json!({
                    "apiKey": raw,
                    "apiKeyDisplay": record.api_key_display,
                    "createdAt": record.created_at,
                })),
            )
                .into_response()
        }
        Err(Error::Conflict(_)) => {
            (StatusCode::CONFLICT, error_body("API key already exists")).into_response()
        }
        Err(e) => internal_error(&e).into_response(),
    }
}

/// DELETE /api/keys
#[instrument(skip(state, user_id), fields(subsystem = "api", component = "api_keys", op = "delete", user_id = %user_id))]
pub async fn delete_api_key(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
) -> Response {
    match state.db.api_keys.delete_for_user(&user_id).await {
        Ok(true) => {
            info!("API key deleted");
            (StatusCode::OK, Json(json!({ "deleted": true }))).into_response()
        }
        Ok(false) => (StatusCode::NOT_FOUND, error_body("No API key to delete")).into_response(),
        Err(e) => internal_error(&e).into_response(),
    }
}
