//! Signed webhook delivery to the main API server.
//!
//! The client serializes an envelope once, signs those exact bytes, and
//! sends body plus signature together. Receivers verify the raw body, so
//! the bytes signed here must be the bytes transmitted.

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, instrument};

use ocx_core::{
    Error, JobStatus, JobStatusChange, Result, WebhookEnvelope, WebhookEvent, SIGNATURE_HEADER,
};
use ocx_crypto::WebhookSigner;

/// Environment variable holding the receiver URL.
pub const WEBHOOK_ENDPOINT_VAR: &str = "WEBHOOK_ENDPOINT";

/// Delivers signed webhook events to the main server.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    endpoint: String,
    signer: WebhookSigner,
}

impl WebhookClient {
    pub fn new(endpoint: impl Into<String>, signer: WebhookSigner) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            signer,
        }
    }

    /// Build a client from `WEBHOOK_ENDPOINT` and `WEBHOOK_SECRET`. Both
    /// are required; the worker refuses to start without them.
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var(WEBHOOK_ENDPOINT_VAR)
            .map_err(|_| Error::Config(format!("{} is not set", WEBHOOK_ENDPOINT_VAR)))?;
        Ok(Self::new(endpoint, WebhookSigner::from_env()?))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sign and deliver one event, returning the receiver's JSON reply.
    #[instrument(skip(self, event), fields(subsystem = "mcp", component = "webhook_client", op = "send", event_type = event.event_type()))]
    pub async fn send(&self, event: WebhookEvent) -> Result<Value> {
        let envelope = WebhookEnvelope::new(event);
        let body = serde_json::to_vec(&envelope)?;
        let signature = self.signer.sign(&body);

        let response = self
            .http
            .post(&self.endpoint)
            .header(SIGNATURE_HEADER, signature)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let reply: Value = response.json().await?;

        if !status.is_success() {
            return Err(Error::Webhook(format!(
                "Receiver answered {}: {}",
                status, reply
            )));
        }

        debug!(event_id = %envelope.event_id, "Webhook event delivered");
        Ok(reply)
    }

    /// Fire a `job.status.changed` notification.
    pub async fn notify_job_status(&self, job_id: &str, status: JobStatus) -> Result<()> {
        self.send(WebhookEvent::JobStatusChanged {
            data: JobStatusChange {
                job_id: job_id.to_string(),
                status,
            },
        })
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_requires_endpoint() {
        // No other test in this binary reads WEBHOOK_ENDPOINT, so removing
        // it cannot race a concurrent reader.
        std::env::remove_var(WEBHOOK_ENDPOINT_VAR);
        assert!(matches!(
            WebhookClient::from_env(),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_send_to_unreachable_endpoint_errors() {
        // Port 9 (discard) is almost never listening locally.
        let client = WebhookClient::new(
            "http://127.0.0.1:9/api/webhooks/events",
            WebhookSigner::new(b"secret".to_vec()),
        );

        let result = client
            .notify_job_status("job-1", JobStatus::Processed)
            .await;
        assert!(result.is_err());
    }
}
