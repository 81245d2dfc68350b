//! Domain layer for turnstile
//!
//! This crate contains the turn-taking logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Admission
//!
//! Every inbound message lands in a bounded per-conversation window and
//! counts down a trigger counter. When the counter reaches zero (or a
//! mention wins its coin flip) the window is dispatched to a model.
//!
//! ## Normalization
//!
//! Model replies are expected to contain a JSON object with a `status`.
//! They routinely don't, so the normalizer extracts best-effort structure
//! or returns a typed failure. It never invents content.
//!
//! ## Sequencing
//!
//! Reply text is split into sentence-like fragments without ever cutting
//! through an inline tag, then emitted with typing-speed pacing.

pub mod backend;
pub mod conversation;
pub mod core;
pub mod output;
pub mod prompt;
pub mod reply;
pub mod util;

// Re-export commonly used types
pub use backend::{
    BackendCapabilities, BackendDescriptor, BackendKind, ChatParameters, RawReply, Usage,
    flatten_content,
};
pub use conversation::{
    entities::{ConversationKey, PRIVATE_CHAT_MARKER, QueueEntry},
    filter::MessageFilter,
    slots::{MixedSlot, SlotRouting, WindowId},
    state::ConversationState,
    trigger::{TriggerCounter, TriggerRange},
    window::ConversationWindow,
};
pub use core::error::DomainError;
pub use output::{
    pacing::pacing_delay,
    placeholders::{PlaceholderResolver, SenderDirectory},
    rules::{ReplaceRule, ReplaceRules},
    scanner::{DEFAULT_SENTENCE_PATTERN, SequencingWarning, TagAwareSplitter},
    sequencer::{OutboundFragment, OutputSequencer, SequencedOutput},
};
pub use prompt::{PayloadBuilder, PromptMessage, PromptPayload, Role};
pub use reply::{
    entities::{Command, FailureReason, NormalizedReply},
    normalizer::{NormalizerOptions, ReplyNormalizer},
};
