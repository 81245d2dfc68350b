//! Run Turn use case.
//!
//! One dispatch cycle for a conversation whose trigger fired:
//!
//! 1. Build the prompt payload from the window snapshot
//! 2. Dispatch through the [`BackendPool`], moving to the next member on
//!    error for up to `dispatch_attempts` calls
//! 3. Normalize the raw reply
//! 4. Reset the trigger counter (model's `nextReplyIn`, else a random draw)
//! 5. On success, sequence the reply text and emit each fragment with pacing
//! 6. Hand any commands to the [`CommandRunner`]
//!
//! A dispatch error leaves the counter untouched and is returned to the
//! caller. A normalization failure still resets the counter and is reported
//! in the [`TurnReport`].

use crate::admission::AdmissionQueue;
use crate::config::TurnParams;
use crate::pool::{BackendHandle, BackendPool};
use crate::ports::backend_client::BackendError;
use crate::ports::command_runner::{CommandRunner, NoCommandRunner};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, event,
};
use crate::ports::emoji_resolver::{EmojiResolver, NoEmojiResolver};
use crate::ports::outbound::{OutboundError, OutboundSink};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, trace, warn};
use turnstile_domain::util::log_preview;
use turnstile_domain::{
    Command, ConversationKey, NormalizedReply, OutputSequencer, PayloadBuilder,
    PlaceholderResolver, PromptPayload, QueueEntry, RawReply, ReplyNormalizer, SenderDirectory,
    SequencedOutput, SequencingWarning, Usage,
};

const PREVIEW_BYTES: usize = 200;

/// Errors that end a turn early.
#[derive(Error, Debug)]
pub enum TurnError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Outbound error: {0}")]
    Outbound(#[from] OutboundError),
}

/// What happened during one turn.
#[derive(Debug, Clone)]
pub struct TurnReport {
    /// Pool member that served the reply.
    pub backend: String,
    pub usage: Usage,
    pub reply: NormalizedReply,
    pub fragments_sent: usize,
    pub warnings: Vec<SequencingWarning>,
}

/// Mentions resolve against the window's senders; emoji through the port.
struct TurnResolver<'a> {
    senders: SenderDirectory,
    emoji: &'a dyn EmojiResolver,
}

impl PlaceholderResolver for TurnResolver<'_> {
    fn mention_id(&self, display_name: &str) -> Option<String> {
        self.senders.id_for(display_name).map(str::to_string)
    }

    fn emoji_id(&self, name: &str) -> Option<String> {
        self.emoji.resolve(name)
    }
}

pub struct RunTurnUseCase {
    queue: Arc<AdmissionQueue>,
    pool: Arc<BackendPool>,
    sink: Arc<dyn OutboundSink>,
    params: TurnParams,
    normalizer: ReplyNormalizer,
    sequencer: OutputSequencer,
    payload_builder: PayloadBuilder,
    emoji: Arc<dyn EmojiResolver>,
    command_runner: Arc<dyn CommandRunner>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl RunTurnUseCase {
    pub fn new(
        queue: Arc<AdmissionQueue>,
        pool: Arc<BackendPool>,
        sink: Arc<dyn OutboundSink>,
        params: TurnParams,
    ) -> Self {
        Self {
            queue,
            pool,
            sink,
            params,
            normalizer: ReplyNormalizer::default(),
            sequencer: OutputSequencer::default(),
            payload_builder: PayloadBuilder::default(),
            emoji: Arc::new(NoEmojiResolver),
            command_runner: Arc::new(NoCommandRunner),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_normalizer(mut self, normalizer: ReplyNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_sequencer(mut self, sequencer: OutputSequencer) -> Self {
        self.sequencer = sequencer;
        self
    }

    pub fn with_payload_builder(mut self, payload_builder: PayloadBuilder) -> Self {
        self.payload_builder = payload_builder;
        self
    }

    pub fn with_emoji_resolver(mut self, emoji: Arc<dyn EmojiResolver>) -> Self {
        self.emoji = emoji;
        self
    }

    pub fn with_command_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.command_runner = runner;
        self
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn params(&self) -> &TurnParams {
        &self.params
    }

    /// Run one turn over `window`, the snapshot taken when the trigger fired.
    pub async fn execute(
        &self,
        key: &ConversationKey,
        window: Vec<QueueEntry>,
    ) -> Result<TurnReport, TurnError> {
        info!(conversation = %key, entries = window.len(), "Starting turn");

        let payload = self.payload_builder.build(&window);
        trace!(conversation = %key, "Payload: {:?}", payload.messages);

        let (handle, raw) = match self.dispatch_with_attempts(key, &payload).await {
            Ok(served) => served,
            Err(e) => {
                self.conversation_logger.log(ConversationEvent::new(
                    event::FAILURE,
                    serde_json::json!({
                        "conversation": key.as_str(),
                        "stage": "dispatch",
                        "error": e.to_string(),
                    }),
                ));
                return Err(e.into());
            }
        };

        let reply = self.normalizer.normalize(&raw.role_content);
        debug!(
            conversation = %key,
            backend = handle.name(),
            status = reply.status_label(),
            "Reply normalized"
        );
        self.conversation_logger.log(ConversationEvent::new(
            event::REPLY,
            serde_json::json!({
                "conversation": key.as_str(),
                "backend": handle.name(),
                "status": reply.status_label(),
                "raw": raw.role_content,
                "prompt_tokens": raw.usage.prompt_tokens,
                "completion_tokens": raw.usage.completion_tokens,
            }),
        ));

        match reply.next_trigger_count() {
            Some(next) => self.queue.reset_trigger(key, next),
            None => self.queue.reset_trigger_random(key),
        }

        let mut report = TurnReport {
            backend: handle.name().to_string(),
            usage: raw.usage,
            reply,
            fragments_sent: 0,
            warnings: Vec::new(),
        };

        match &report.reply {
            NormalizedReply::Success {
                reply_text,
                quoted_message_id,
                reply_target,
                commands,
                ..
            } => {
                let target = reply_target.clone().unwrap_or_else(|| key.clone());
                let resolver = TurnResolver {
                    senders: SenderDirectory::from_entries(&window),
                    emoji: self.emoji.as_ref(),
                };
                let output =
                    self.sequencer
                        .sequence(reply_text, quoted_message_id.as_deref(), &resolver);
                for warning in &output.warnings {
                    warn!(conversation = %key, "Sequencing: {}", warning);
                }
                report.fragments_sent = self.emit(&target, &output).await?;
                report.warnings = output.warnings;
                self.run_commands(key, commands, false).await;
            }
            NormalizedReply::Skip { commands, .. } => {
                debug!(conversation = %key, "Model chose to skip");
                self.run_commands(key, commands, false).await;
            }
            NormalizedReply::FunctionCall { commands } => {
                self.run_commands(key, commands, true).await;
            }
            NormalizedReply::Failure { reason, raw_text } => {
                warn!(
                    conversation = %key,
                    backend = handle.name(),
                    "Unusable reply ({}): {}",
                    reason,
                    log_preview(raw_text, PREVIEW_BYTES)
                );
                self.conversation_logger.log(ConversationEvent::new(
                    event::FAILURE,
                    serde_json::json!({
                        "conversation": key.as_str(),
                        "stage": "normalize",
                        "reason": reason.to_string(),
                    }),
                ));
            }
        }

        info!(
            conversation = %key,
            status = report.reply.status_label(),
            fragments = report.fragments_sent,
            "Turn complete"
        );
        Ok(report)
    }

    async fn dispatch_with_attempts(
        &self,
        key: &ConversationKey,
        payload: &PromptPayload,
    ) -> Result<(BackendHandle, RawReply), BackendError> {
        let attempts = self.params.attempts();
        let parameters = self.params.chat_parameters();
        let mut last_error = BackendError::NoBackendAvailable;

        for attempt in 1..=attempts {
            let handle = self.pool.next()?;
            self.conversation_logger.log(ConversationEvent::new(
                event::DISPATCH,
                serde_json::json!({
                    "conversation": key.as_str(),
                    "backend": handle.name(),
                    "attempt": attempt,
                    "messages": payload.messages.len(),
                }),
            ));

            let call = self.pool.dispatch(&handle, payload, &parameters);
            let result = match self.params.dispatch_timeout {
                Some(limit) => tokio::time::timeout(limit, call).await.unwrap_or_else(|_| {
                    Err(BackendError::Timeout {
                        backend: handle.name().to_string(),
                        elapsed: limit,
                    })
                }),
                None => call.await,
            };

            match result {
                Ok(raw) => return Ok((handle, raw)),
                Err(e) => {
                    warn!(
                        conversation = %key,
                        "Dispatch attempt {}/{} failed: {}",
                        attempt,
                        attempts,
                        e
                    );
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    /// Send fragments in order, waiting each fragment's pacing delay, and
    /// echo them into the target's window as the bot's own messages.
    async fn emit(
        &self,
        target: &ConversationKey,
        output: &SequencedOutput,
    ) -> Result<usize, OutboundError> {
        let stamp = chrono::Utc::now().timestamp_millis();
        for (i, fragment) in output.fragments.iter().enumerate() {
            let message_id = self
                .sink
                .send(target, &fragment.text)
                .await?
                .unwrap_or_else(|| format!("{}-{}-{}", self.params.bot_id, stamp, i));

            self.conversation_logger.log(ConversationEvent::new(
                event::FRAGMENT,
                serde_json::json!({
                    "conversation": target.as_str(),
                    "index": i,
                    "text": fragment.text,
                    "delay_ms": fragment.delay_after.as_millis() as u64,
                }),
            ));

            let echo = QueueEntry::new(
                message_id,
                &self.params.bot_id,
                &self.params.bot_name,
                &fragment.text,
            );
            self.queue.record(target, echo).await;

            if !fragment.delay_after.is_zero() {
                tokio::time::sleep(fragment.delay_after).await;
            }
        }
        Ok(output.fragments.len())
    }

    async fn run_commands(&self, key: &ConversationKey, commands: &[Command], is_function_call: bool) {
        if commands.is_empty() {
            return;
        }
        debug!(conversation = %key, count = commands.len(), "Running commands");
        self.command_runner.run(key, commands, is_function_call).await;
    }
}
