//! Handle Inbound use case.
//!
//! [`ChatEngine`] is the entry point for every inbound message:
//!
//! ```text
//! filter ─▶ enqueue ─▶ decrement ─▶ should_dispatch? ─▶ try turn lock ─▶ run turn
//! ```
//!
//! Admission for one window is serialized. [`ChatEngine::admit`] does the
//! ordered part and hands back a [`PendingTurn`]. The admission lock is released
//! before dispatch, so messages keep being admitted (and counting down the
//! trigger) while a turn is in flight. At most one turn runs per window; a
//! message that would dispatch while one is running is only admitted.

use super::forget::ForgetConversationUseCase;
use super::run_turn::{RunTurnUseCase, TurnError, TurnReport};
use crate::admission::AdmissionQueue;
use crate::keyed_lock::{KeyGuard, KeyedLocks};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, event,
};
use std::sync::Arc;
use tracing::debug;
use turnstile_domain::{ConversationKey, QueueEntry, WindowId};

/// One message delivered by the host platform.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub key: ConversationKey,
    pub entry: QueueEntry,
    /// The message mentions the bot.
    pub was_mentioned: bool,
    /// The bot itself sent this message (e.g. from another client).
    pub authored_by_self: bool,
}

impl InboundMessage {
    pub fn new(key: ConversationKey, entry: QueueEntry) -> Self {
        Self {
            key,
            entry,
            was_mentioned: false,
            authored_by_self: false,
        }
    }

    pub fn mentioned(mut self, was_mentioned: bool) -> Self {
        self.was_mentioned = was_mentioned;
        self
    }

    pub fn from_self(mut self, authored_by_self: bool) -> Self {
        self.authored_by_self = authored_by_self;
        self
    }
}

#[derive(Debug, Clone)]
pub enum InboundOutcome {
    /// Rejected by the admission filter.
    Filtered,
    /// Admitted; no dispatch due.
    Admitted,
    /// Admitted and due, but a turn is already running for this window.
    TurnBusy,
    /// Admitted and a turn ran to completion.
    Turn(Box<TurnReport>),
}

#[derive(Clone)]
pub struct ChatEngine {
    queue: Arc<AdmissionQueue>,
    run_turn: Arc<RunTurnUseCase>,
    forget: Arc<ForgetConversationUseCase>,
    admission_locks: Arc<KeyedLocks<WindowId>>,
    turn_locks: Arc<KeyedLocks<WindowId>>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl ChatEngine {
    pub fn new(
        queue: Arc<AdmissionQueue>,
        run_turn: Arc<RunTurnUseCase>,
        forget: Arc<ForgetConversationUseCase>,
    ) -> Self {
        Self {
            queue,
            run_turn,
            forget,
            admission_locks: Arc::new(KeyedLocks::new()),
            turn_locks: Arc::new(KeyedLocks::new()),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn queue(&self) -> &Arc<AdmissionQueue> {
        &self.queue
    }

    /// Admit and, when due, run the turn in place.
    pub async fn handle(&self, message: InboundMessage) -> Result<InboundOutcome, TurnError> {
        match self.admit(message).await {
            Admission::Settled(outcome) => Ok(outcome),
            Admission::Due(turn) => turn.run().await,
        }
    }

    /// The ordered half of [`handle`](Self::handle): enqueue, count down
    /// and decide. Callers that await this in arrival order keep the window
    /// in arrival order and may run the returned turn on another task.
    pub async fn admit(&self, message: InboundMessage) -> Admission {
        let InboundMessage {
            key,
            entry,
            was_mentioned,
            authored_by_self,
        } = message;
        let window_id = self.queue.settings().routing.resolve(&key);
        let _admission = self.admission_locks.lock(&window_id).await;

        let logged = serde_json::json!({
            "conversation": key.as_str(),
            "id": entry.id(),
            "sender_id": entry.sender_id(),
            "sender": entry.sender_display_name(),
            "content": entry.content(),
            "mentioned": was_mentioned,
        });
        if !self.queue.enqueue(&key, entry).await {
            return Admission::Settled(InboundOutcome::Filtered);
        }
        self.conversation_logger
            .log(ConversationEvent::new(event::INBOUND, logged));

        self.queue.decrement_trigger(&key, authored_by_self);
        if authored_by_self {
            return Admission::Settled(InboundOutcome::Admitted);
        }

        let probability = self.run_turn.params().at_react_possibility;
        if !self.queue.should_dispatch(&key, was_mentioned, probability) {
            return Admission::Settled(InboundOutcome::Admitted);
        }

        let Some(turn_guard) = self.turn_locks.try_lock(&window_id) else {
            debug!(conversation = %key, "Turn already running; message admitted only");
            return Admission::Settled(InboundOutcome::TurnBusy);
        };
        let window = self.queue.snapshot(&key);
        Admission::Due(PendingTurn {
            run_turn: self.run_turn.clone(),
            key,
            window,
            _turn_guard: turn_guard,
        })
    }

    /// Clear the conversation. Returns whether its window held anything.
    pub async fn forget(&self, key: &ConversationKey) -> bool {
        let window_id = self.queue.settings().routing.resolve(key);
        let _admission = self.admission_locks.lock(&window_id).await;
        self.forget.execute(key).await
    }
}

/// What [`ChatEngine::admit`] decided.
pub enum Admission {
    Settled(InboundOutcome),
    Due(PendingTurn),
}

/// A due turn. Holds its window's turn lock until [`run`](Self::run)
/// finishes or the value is dropped.
pub struct PendingTurn {
    run_turn: Arc<RunTurnUseCase>,
    key: ConversationKey,
    window: Vec<QueueEntry>,
    _turn_guard: KeyGuard,
}

impl PendingTurn {
    pub fn key(&self) -> &ConversationKey {
        &self.key
    }

    pub async fn run(self) -> Result<InboundOutcome, TurnError> {
        let report = self.run_turn.execute(&self.key, self.window).await;
        report.map(|r| InboundOutcome::Turn(Box::new(r)))
    }
}
