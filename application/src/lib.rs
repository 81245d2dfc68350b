//! Application layer for turnstile
//!
//! This crate contains the Admission Queue, the Backend Pool, use cases,
//! and port definitions. It depends only on the domain layer.

pub mod admission;
pub mod config;
pub mod keyed_lock;
pub mod pool;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use admission::AdmissionQueue;
pub use config::{QueueSettings, TurnParams};
pub use keyed_lock::KeyedLocks;
pub use pool::{BackendHandle, BackendPool};
pub use ports::{
    backend_client::{BackendClient, BackendError, BackendFactory},
    command_runner::{CommandRunner, NoCommandRunner},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    emoji_resolver::{EmojiResolver, NoEmojiResolver},
    message_store::{MessageStore, StoreError},
    outbound::{OutboundError, OutboundSink},
};
pub use use_cases::forget::ForgetConversationUseCase;
pub use use_cases::handle_inbound::{
    Admission, ChatEngine, InboundMessage, InboundOutcome, PendingTurn,
};
pub use use_cases::run_turn::{RunTurnUseCase, TurnError, TurnReport};
