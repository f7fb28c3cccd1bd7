//! API key and webhook signing primitives for opencontext.

pub mod api_key;
pub mod signature;

pub use signature::{WebhookSigner, WEBHOOK_SECRET_VAR};
