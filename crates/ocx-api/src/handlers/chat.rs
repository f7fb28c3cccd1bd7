//! Chat endpoint.
//!
//! Attaches the session user's retrieval scope to the model call, runs the
//! RAG middleware, and generates a reply from the (possibly enriched)
//! prompt.

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use ocx_core::{ModelCallParams, PromptMessage, RagScope, Role};

use super::{error_body, internal_error};
use crate::auth::SessionUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<PromptMessage>,
    /// Jobs to search for context; empty means all of the user's jobs.
    #[serde(rename = "jobIds", default)]
    pub job_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub text: String,
}

/// POST /api/chat
#[instrument(skip(state, body, user_id), fields(subsystem = "api", component = "chat", op = "chat", user_id = %user_id))]
pub async fn chat(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
    Json(body): Json<ChatRequest>,
) -> Response {
    if body.messages.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            error_body("messages must not be empty"),
        )
            .into_response();
    }

    let params = ModelCallParams {
        prompt: body.messages,
        provider_options: Some(RagScope {
            user_id,
            job_ids: body.job_ids,
        }),
    };

    let start = Instant::now();

    let params = match state.rag.transform_params(params).await {
        Ok(params) => params,
        Err(e) => return internal_error(&e).into_response(),
    };

    let prompt = flatten_prompt(&params.prompt);

    match state.generator.generate(&prompt).await {
        Ok(text) => {
            debug!(
                duration_ms = start.elapsed().as_millis() as u64,
                response_len = text.len(),
                "Chat reply generated"
            );
            (StatusCode::OK, Json(ChatResponse { text })).into_response()
        }
        Err(e) => internal_error(&e).into_response(),
    }
}

/// Render the message list as flat text for backends that take a single
/// prompt string.
fn flatten_prompt(messages: &[PromptMessage]) -> String {
    messages
        .iter()
        .map(|message| {
            let role = match message.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::Tool => "tool",
            };
            format!("{}: {}", role, message.joined_text())
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
