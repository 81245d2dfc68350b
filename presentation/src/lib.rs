//! Presentation layer for turnstile
//!
//! This crate contains the CLI definition, the console outbound sink,
//! and the stdin chat driver.

pub mod chat;
pub mod cli;
pub mod output;

// Re-export commonly used types
pub use chat::{ChatDriver, ChatInput, parse_line};
pub use cli::commands::Cli;
pub use output::console::ConsoleSink;
