//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod backend_client;
pub mod command_runner;
pub mod conversation_logger;
pub mod emoji_resolver;
pub mod message_store;
pub mod outbound;
