//! Outbound sink port
//!
//! Where sequenced fragments go. The host platform adapter implements this.

use async_trait::async_trait;
use thiserror::Error;
use turnstile_domain::ConversationKey;

#[derive(Error, Debug)]
pub enum OutboundError {
    #[error("Failed to deliver to `{target}`: {message}")]
    Delivery { target: String, message: String },

    #[error("Outbound channel closed")]
    Closed,
}

#[async_trait]
pub trait OutboundSink: Send + Sync {
    /// Deliver one fragment. Returns the platform message id when known.
    async fn send(&self, target: &ConversationKey, text: &str)
    -> Result<Option<String>, OutboundError>;
}
