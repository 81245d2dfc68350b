//! Interactive chat module
//!
//! Feeds stdin lines to the engine as inbound messages for one conversation.

mod driver;

pub use driver::{ChatDriver, ChatInput, parse_line};
