//! Line-oriented chat driver

use colored::Colorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;
use tracing::{debug, warn};
use turnstile_application::{Admission, ChatEngine, InboundMessage, InboundOutcome};
use turnstile_domain::{ConversationKey, QueueEntry};

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Empty,
    Help,
    Quit,
    Forget,
    Message { content: String, mentioned: bool },
}

/// Classify a line. A message mentions the bot when it contains `@{bot_name}`.
pub fn parse_line(line: &str, bot_name: &str) -> ChatInput {
    let line = line.trim();
    match line {
        "" => ChatInput::Empty,
        "/quit" | "/exit" | "/q" => ChatInput::Quit,
        "/help" | "/h" | "/?" => ChatInput::Help,
        _ if line == "/forget" || line.starts_with("/forget ") => ChatInput::Forget,
        _ => ChatInput::Message {
            content: line.to_string(),
            mentioned: !bot_name.is_empty() && line.contains(&format!("@{}", bot_name)),
        },
    }
}

pub struct ChatDriver {
    engine: ChatEngine,
    key: ConversationKey,
    sender_id: String,
    sender_name: String,
    bot_name: String,
    next_id: u64,
}

impl ChatDriver {
    pub fn new(engine: ChatEngine, key: ConversationKey, bot_name: impl Into<String>) -> Self {
        Self {
            engine,
            key,
            sender_id: "console-user".to_string(),
            sender_name: "you".to_string(),
            bot_name: bot_name.into(),
            next_id: 0,
        }
    }

    pub fn with_sender(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.sender_id = id.into();
        self.sender_name = name.into();
        self
    }

    pub fn print_welcome(&self) {
        println!();
        println!("{}", "turnstile - console conversation".cyan().bold());
        println!("Conversation: {}   Bot: @{}", self.key, self.bot_name);
        println!();
        Self::print_help();
    }

    fn print_help() {
        println!("Commands:");
        println!("  /forget          - Clear this conversation");
        println!("  /help, /h, /?    - Show this help");
        println!("  /quit, /exit, /q - Exit");
        println!();
    }

    /// Read lines until EOF or `/quit`, then wait for running turns.
    ///
    /// Admission happens on this loop, in line order. Only due turns get their
    /// own task, so pacing never blocks input.
    pub async fn run<R>(&mut self, reader: R) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut turns = JoinSet::new();

        while let Some(line) = lines.next_line().await? {
            match parse_line(&line, &self.bot_name) {
                ChatInput::Empty => {}
                ChatInput::Help => Self::print_help(),
                ChatInput::Quit => break,
                ChatInput::Forget => {
                    if self.engine.forget(&self.key).await {
                        println!("{}", "Conversation cleared.".dimmed());
                    } else {
                        println!("{}", "Nothing to forget.".dimmed());
                    }
                }
                ChatInput::Message { content, mentioned } => {
                    let message = self.inbound(content, mentioned);
                    match self.engine.admit(message).await {
                        Admission::Settled(outcome) => debug!(?outcome, "message admitted"),
                        Admission::Due(turn) => {
                            turns.spawn(turn.run());
                        }
                    }
                }
            }

            // Reap finished turns so errors surface promptly
            while let Some(done) = turns.try_join_next() {
                Self::report(done);
            }
        }

        while let Some(done) = turns.join_next().await {
            Self::report(done);
        }
        Ok(())
    }

    fn inbound(&mut self, content: String, mentioned: bool) -> InboundMessage {
        let id = format!("{}-{}", self.key, self.next_id);
        self.next_id += 1;
        let entry = QueueEntry::new(id, &self.sender_id, &self.sender_name, content);
        InboundMessage::new(self.key.clone(), entry).mentioned(mentioned)
    }

    fn report(
        done: Result<
            Result<InboundOutcome, turnstile_application::TurnError>,
            tokio::task::JoinError,
        >,
    ) {
        match done {
            Ok(Ok(InboundOutcome::Turn(report))) => {
                debug!(
                    backend = %report.backend,
                    fragments = report.fragments_sent,
                    "turn finished"
                );
            }
            Ok(Ok(outcome)) => debug!(?outcome, "message admitted"),
            Ok(Err(e)) => eprintln!("{} {}", "Turn failed:".red().bold(), e),
            Err(e) => warn!("turn task aborted: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use turnstile_application::{
        AdmissionQueue, BackendClient, BackendError, BackendPool, ForgetConversationUseCase,
        OutboundError, OutboundSink, QueueSettings, RunTurnUseCase, TurnParams,
    };
    use turnstile_domain::{BackendKind, ChatParameters, PromptPayload, RawReply, Usage};

    // ==================== parse_line ====================

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_line("   ", "bot"), ChatInput::Empty);
        assert_eq!(parse_line("/quit", "bot"), ChatInput::Quit);
        assert_eq!(parse_line("/h", "bot"), ChatInput::Help);
        assert_eq!(parse_line("/forget", "bot"), ChatInput::Forget);
        assert_eq!(parse_line("/forget now", "bot"), ChatInput::Forget);
    }

    #[test]
    fn test_parse_mention() {
        assert_eq!(
            parse_line("hey @Zoey what's up", "Zoey"),
            ChatInput::Message {
                content: "hey @Zoey what's up".into(),
                mentioned: true,
            }
        );
        assert_eq!(
            parse_line("/forgetful is not a command", "Zoey"),
            ChatInput::Message {
                content: "/forgetful is not a command".into(),
                mentioned: false,
            }
        );
    }

    // ==================== Driver ====================

    struct FixedBackend;

    #[async_trait]
    impl BackendClient for FixedBackend {
        fn name(&self) -> &str {
            "fixed"
        }

        fn kind(&self) -> BackendKind {
            BackendKind::Ollama
        }

        async fn chat(
            &self,
            _payload: &PromptPayload,
            _parameters: &ChatParameters,
        ) -> Result<RawReply, BackendError> {
            Ok(RawReply::new(
                r#"{"status":"success","reply":"hi there"}"#,
                Usage::default(),
            ))
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl OutboundSink for CollectingSink {
        async fn send(
            &self,
            _target: &ConversationKey,
            text: &str,
        ) -> Result<Option<String>, OutboundError> {
            self.sent.lock().unwrap().push(text.to_string());
            Ok(None)
        }
    }

    fn driver(sink: Arc<CollectingSink>) -> ChatDriver {
        driver_with(sink, QueueSettings::new(10, 1, 1).unwrap())
    }

    fn driver_with(sink: Arc<CollectingSink>, settings: QueueSettings) -> ChatDriver {
        let queue = Arc::new(AdmissionQueue::new(settings));
        let pool = Arc::new(BackendPool::from_clients(vec![
            Arc::new(FixedBackend) as Arc<dyn BackendClient>
        ]));
        let run_turn = Arc::new(RunTurnUseCase::new(
            queue.clone(),
            pool,
            sink,
            TurnParams::default(),
        ));
        let forget = Arc::new(ForgetConversationUseCase::new(queue.clone()));
        ChatDriver::new(
            ChatEngine::new(queue, run_turn, forget),
            ConversationKey::new("c"),
            "bot",
        )
    }

    #[tokio::test]
    async fn test_each_line_is_admitted_and_answered() {
        let sink = Arc::new(CollectingSink::default());
        let mut driver = driver(sink.clone());

        driver.run(&b"hello\n"[..]).await.unwrap();

        assert_eq!(*sink.sent.lock().unwrap(), vec!["hi there"]);
        let window = driver.engine.queue().snapshot(&ConversationKey::new("c"));
        assert_eq!(window[0].content(), "hello");
        assert_eq!(window[0].sender_display_name(), "you");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_window_keeps_line_order() {
        let sink = Arc::new(CollectingSink::default());
        let mut driver = driver_with(sink.clone(), QueueSettings::new(50, 100, 100).unwrap());
        let input: String = (0..20).map(|i| format!("line {i}\n")).collect();

        driver.run(input.as_bytes()).await.unwrap();

        let window = driver.engine.queue().snapshot(&ConversationKey::new("c"));
        let contents: Vec<&str> = window.iter().map(QueueEntry::content).collect();
        let expected: Vec<String> = (0..20).map(|i| format!("line {i}")).collect();
        assert_eq!(contents, expected);
        assert!(sink.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_quit_stops_reading() {
        let sink = Arc::new(CollectingSink::default());
        let mut driver = driver(sink.clone());

        driver.run(&b"/quit\nhello\n"[..]).await.unwrap();

        assert!(sink.sent.lock().unwrap().is_empty());
        assert!(driver
            .engine
            .queue()
            .snapshot(&ConversationKey::new("c"))
            .is_empty());
    }
}
