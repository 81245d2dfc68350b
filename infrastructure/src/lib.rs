//! Infrastructure layer for turnstile
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: HTTP backends, the message store, the emoji
//! table, the JSONL transcript, and configuration file loading.

pub mod backends;
pub mod config;
pub mod emoji;
pub mod logging;
pub mod store;

// Re-export commonly used types
pub use backends::{AnthropicBackend, HttpBackendFactory, OllamaBackend, OpenAiCompatBackend};
pub use config::{ConfigIssue, ConfigLoader, FileConfig, Severity};
pub use emoji::StaticEmojiTable;
pub use logging::JsonlConversationLogger;
pub use store::InMemoryMessageStore;
