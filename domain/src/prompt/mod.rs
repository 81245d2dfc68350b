//! Prompt domain
//!
//! Role-tagged payloads built from a conversation window.

pub mod payload;

pub use payload::{PayloadBuilder, PromptMessage, PromptPayload, Role, render_window};
