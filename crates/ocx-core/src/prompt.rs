//! Prompt and model-call parameter types.
//!
//! These model the message list handed to a generation call, plus the
//! per-call retrieval scope that opts a request into RAG.

use serde::{Deserialize, Serialize};

/// Role of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One block of message content. Messages are block lists so that text can
/// sit alongside non-text attachments; retrieval only ever reads and
/// appends text blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
    File { media_type: String, data: String },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }
}

/// A single message in the prompt list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl PromptMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::text(text)],
        }
    }

    /// Concatenate the text blocks of this message, newline-separated.
    /// Non-text blocks are skipped.
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Retrieval scope attached to a model call. Presence of this scope is what
/// opts the call into the RAG path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagScope {
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Jobs to search; empty means all of the user's jobs.
    #[serde(rename = "jobIds", default)]
    pub job_ids: Vec<String>,
}

/// Parameters of a model call as seen by the middleware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCallParams {
    pub prompt: Vec<PromptMessage>,
    #[serde(rename = "providerOptions", skip_serializing_if = "Option::is_none")]
    pub provider_options: Option<RagScope>,
}
