//! Conversation admission domain.
//!
//! - [`entities`]: [`ConversationKey`](entities::ConversationKey) and [`QueueEntry`](entities::QueueEntry)
//! - [`window`]: bounded, oldest-first-evicting window
//! - [`trigger`]: countdown to the next model invocation
//! - [`state`]: window + counter for one conversation or slot
//! - [`slots`]: mixed-window routing
//! - [`filter`]: substring admission filter

pub mod entities;
pub mod filter;
pub mod slots;
pub mod state;
pub mod trigger;
pub mod window;
