//! Port for structured conversation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording turn events
//! (inbound messages, dispatches, normalized replies, failures, emitted
//! fragments) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the full
//! turn transcript in a machine-readable format (JSONL).

use serde_json::Value;

/// Event type identifiers written by the engine.
pub mod event {
    pub const INBOUND: &str = "inbound";
    pub const DISPATCH: &str = "dispatch";
    pub const REPLY: &str = "reply";
    pub const FAILURE: &str = "failure";
    pub const FRAGMENT: &str = "fragment";
}

/// A structured conversation event for logging.
///
/// Each event has a type string and a JSON payload containing
/// event-specific fields. The timestamp is added by the logger.
#[derive(Debug, Clone)]
pub struct ConversationEvent {
    /// Event type identifier (one of [`event`]).
    pub event_type: &'static str,
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Implementations write each event as a single record (e.g., one JSONL line).
/// `log` is synchronous and non-fallible; logging failures never interrupt a
/// turn.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
