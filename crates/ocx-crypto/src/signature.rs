//! HMAC-SHA256 webhook body signing and verification.
//!
//! The sender serializes the envelope once, signs those exact bytes, and
//! transmits body and hex signature together. The receiver verifies the
//! raw request body before parsing anything, so the scheme never depends
//! on JSON canonicalization.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

use ocx_core::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Environment variable holding the shared webhook secret.
pub const WEBHOOK_SECRET_VAR: &str = "WEBHOOK_SECRET";

/// Signs and verifies webhook bodies with a shared secret.
#[derive(Clone)]
pub struct WebhookSigner {
    secret: Vec<u8>,
}

impl WebhookSigner {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Build a signer from `WEBHOOK_SECRET`. A missing or empty secret is
    /// a configuration error; both processes refuse to start without it.
    pub fn from_env() -> Result<Self> {
        match std::env::var(WEBHOOK_SECRET_VAR) {
            Ok(secret) if !secret.is_empty() => Ok(Self::new(secret.into_bytes())),
            _ => Err(Error::Config(format!(
                "{} is not set",
                WEBHOOK_SECRET_VAR
            ))),
        }
    }

    /// Hex HMAC-SHA256 signature of the body.
    pub fn sign(&self, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Verify a hex signature over the body in constant time.
    pub fn verify(&self, body: &[u8], signature_hex: &str) -> bool {
        let signature = match hex::decode(signature_hex) {
            Ok(bytes) => bytes,
            Err(_) => {
                warn!(
                    subsystem = "crypto",
                    component = "webhook",
                    "Signature is not valid hex"
                );
                return false;
            }
        };

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(body);
        mac.verify_slice(&signature).is_ok()
    }
}

impl std::fmt::Debug for WebhookSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the secret.
        f.debug_struct("WebhookSigner").finish_non_exhaustive()
    }
}
