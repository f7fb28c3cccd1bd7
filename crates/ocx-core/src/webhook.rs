//! Webhook wire types shared by the sender (worker) and receiver (API).
//!
//! Every event travels in a [`WebhookEnvelope`] whose body is signed with
//! HMAC-SHA256 (see `ocx-crypto`). The event family is an internally tagged
//! sum type: adding a variant forces every receiver `match` to handle it,
//! and unknown `eventType` tags fail deserialization outright.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::JobStatus;

/// Identifies the worker as the origin of every envelope.
pub const WEBHOOK_PROVIDER: &str = "opencontext-worker";

/// HTTP header carrying the hex HMAC-SHA256 signature of the raw body.
pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// Context returned when the tool call carried no API key.
pub const CONTEXT_ERR_KEY_MISSING: &str = "ERROR: can't retrieve context. API key missing.";

/// Context returned when the API key did not resolve to a user.
pub const CONTEXT_ERR_KEY_INVALID: &str = "ERROR: can't retrieve context. Invalid API key.";

/// Context returned when retrieval failed for any other reason.
pub const CONTEXT_ERR_UNEXPECTED: &str =
    "ERROR: can't retrieve context due to unexpected error.";

/// Payload of a `job.status.changed` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusChange {
    #[serde(rename = "jobId")]
    pub job_id: String,
    pub status: JobStatus,
}

/// Tool the `mcp.toolcall` event invokes. Single-variant today; the enum
/// keeps the wire contract closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolSelection {
    #[serde(rename = "context_retriever")]
    ContextRetriever,
}

/// Payload of an `mcp.toolcall` event. Unlike the status notification this
/// is a synchronous RPC: the receiver answers with the retrieved context in
/// the HTTP response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpToolCall {
    #[serde(rename = "apiKey")]
    pub api_key: String,
    pub query: String,
    pub selection: ToolSelection,
}

/// The event families carried over the webhook channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType")]
pub enum WebhookEvent {
    #[serde(rename = "job.status.changed")]
    JobStatusChanged { data: JobStatusChange },
    #[serde(rename = "mcp.toolcall")]
    McpToolCall { data: McpToolCall },
}

impl WebhookEvent {
    /// The wire tag of this event, for logging.
    pub fn event_type(&self) -> &'static str {
        match self {
            WebhookEvent::JobStatusChanged { .. } => "job.status.changed",
            WebhookEvent::McpToolCall { .. } => "mcp.toolcall",
        }
    }
}

/// Signed webhook envelope: common metadata plus one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEnvelope {
    pub provider: String,
    #[serde(rename = "eventId")]
    pub event_id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: WebhookEvent,
}

impl WebhookEnvelope {
    /// Wrap an event with a fresh event id and the current timestamp.
    pub fn new(event: WebhookEvent) -> Self {
        Self {
            provider: WEBHOOK_PROVIDER.to_string(),
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_changed_roundtrip() {
        let envelope = WebhookEnvelope::new(WebhookEvent::JobStatusChanged {
            data: JobStatusChange {
                job_id: "job-42".to_string(),
                status: JobStatus::Processed,
            },
        });

        let json = serde_json::to_string(&envelope).unwrap();
        let parsed: WebhookEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, envelope);
    }

    #[test]
    fn test_job_status_changed_wire_shape() {
        let envelope = WebhookEnvelope::new(WebhookEvent::JobStatusChanged {
            data: JobStatusChange {
                job_id: "job-42".to_string(),
                status: JobStatus::Error,
            },
        });

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["provider"], "opencontext-worker");
        assert_eq!(json["eventType"], "job.status.changed");
        assert_eq!(json["data"]["jobId"], "job-42");
        assert_eq!(json["data"]["status"], "ERROR");
        assert!(json["eventId"].is_string());
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_mcp_toolcall_wire_shape() {
        let envelope = WebhookEnvelope::new(WebhookEvent::McpToolCall {
            data: McpToolCall {
                api_key: "sk-proj-abc".to_string(),
                query: "what is rust".to_string(),
                selection: ToolSelection::ContextRetriever,
            },
        });

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["eventType"], "mcp.toolcall");
        assert_eq!(json["data"]["apiKey"], "sk-proj-abc");
        assert_eq!(json["data"]["selection"], "context_retriever");
    }

    #[test]
    fn test_unknown_event_type_rejected() {
        let json = r#"{
            "provider": "opencontext-worker",
            "eventId": "6f2c63f4-7b8e-4c5d-9e1a-2b3c4d5e6f70",
            "timestamp": "2026-01-01T00:00:00Z",
            "eventType": "job.priority.updated",
            "data": {"jobId": "job-1", "priority": 5}
        }"#;

        let result: Result<WebhookEnvelope, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_data_rejected() {
        // status value outside the enum
        let json = r#"{
            "provider": "opencontext-worker",
            "eventId": "6f2c63f4-7b8e-4c5d-9e1a-2b3c4d5e6f70",
            "timestamp": "2026-01-01T00:00:00Z",
            "eventType": "job.status.changed",
            "data": {"jobId": "job-1", "status": "DONE"}
        }"#;

        let result: Result<WebhookEnvelope, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_data_rejected() {
        let json = r#"{
            "provider": "opencontext-worker",
            "eventId": "6f2c63f4-7b8e-4c5d-9e1a-2b3c4d5e6f70",
            "timestamp": "2026-01-01T00:00:00Z",
            "eventType": "mcp.toolcall"
        }"#;

        let result: Result<WebhookEnvelope, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_envelope_new_fills_metadata() {
        let a = WebhookEnvelope::new(WebhookEvent::McpToolCall {
            data: McpToolCall {
                api_key: "k".to_string(),
                query: "q".to_string(),
                selection: ToolSelection::ContextRetriever,
            },
        });
        let b = WebhookEnvelope::new(WebhookEvent::McpToolCall {
            data: McpToolCall {
                api_key: "k".to_string(),
                query: "q".to_string(),
                selection: ToolSelection::ContextRetriever,
            },
        });

        assert_eq!(a.provider, WEBHOOK_PROVIDER);
        assert_ne!(a.event_id, b.event_id);
    }

    #[test]
    fn test_event_type_accessor() {
        let event = WebhookEvent::JobStatusChanged {
            data: JobStatusChange {
                job_id: "j".to_string(),
                status: JobStatus::Queued,
            },
        };
        assert_eq!(event.event_type(), "job.status.changed");
    }
}
