//! Port for model-issued side commands.
//!
//! The engine never interprets commands; it hands them to this port after
//! a turn. How (and whether) they run is up to the host.

use async_trait::async_trait;
use turnstile_domain::{Command, ConversationKey};

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// `is_function_call` is set when the reply was a `function` status, in
    /// which case no reply text was sent this turn.
    async fn run(&self, key: &ConversationKey, commands: &[Command], is_function_call: bool);
}

/// Drops every command.
pub struct NoCommandRunner;

#[async_trait]
impl CommandRunner for NoCommandRunner {
    async fn run(&self, _key: &ConversationKey, _commands: &[Command], _is_function_call: bool) {}
}
