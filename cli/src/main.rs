//! CLI entrypoint for turnstile
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, prelude::*};
use turnstile_application::{
    AdmissionQueue, BackendPool, ChatEngine, ConversationLogger, ForgetConversationUseCase,
    NoConversationLogger, RunTurnUseCase,
};
use turnstile_domain::ConversationKey;
use turnstile_infrastructure::{
    ConfigLoader, FileConfig, HttpBackendFactory, InMemoryMessageStore, JsonlConversationLogger,
    Severity, StaticEmojiTable,
};
use turnstile_presentation::{ChatDriver, Cli, ConsoleSink};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    // Keep the guard alive so the file writer flushes on exit
    let _log_guard = init_tracing(cli.verbose, &config);

    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            Severity::Warning => warn!("{}: {}", issue.field, issue.message),
            Severity::Error => eprintln!("config error: {}: {}", issue.field, issue.message),
        }
    }
    if FileConfig::has_errors(&issues) {
        bail!("Configuration is invalid");
    }

    info!("Starting turnstile");

    // === Dependency Injection ===
    let store = Arc::new(InMemoryMessageStore::default());
    let queue = Arc::new(AdmissionQueue::new(config.to_queue_settings()?).with_store(store.clone()));

    let pool = Arc::new(BackendPool::new());
    let configured = pool.configure(&config.backend_descriptors(), &HttpBackendFactory::new()?)?;
    info!(backends = configured, names = ?pool.names(), "Backend pool configured");

    let conversation_logger: Arc<dyn ConversationLogger> =
        match config.logging.conversation_log.as_ref() {
            Some(path) => match JsonlConversationLogger::new(path) {
                Some(logger) => {
                    info!("Conversation log: {}", logger.path().display());
                    Arc::new(logger)
                }
                None => Arc::new(NoConversationLogger),
            },
            None => Arc::new(NoConversationLogger),
        };

    let params = config.to_turn_params()?;
    let bot_name = params.bot_name.clone();
    let sink = Arc::new(ConsoleSink::new(&bot_name).with_color(config.output.color));

    let run_turn = RunTurnUseCase::new(queue.clone(), pool, sink, params)
        .with_normalizer(config.to_normalizer()?)
        .with_sequencer(config.to_sequencer()?)
        .with_payload_builder(
            config
                .to_payload_builder()
                .context("Failed to read system prompt file")?,
        )
        .with_emoji_resolver(Arc::new(StaticEmojiTable::new(config.emoji.table.clone())))
        .with_conversation_logger(conversation_logger.clone());
    let forget = ForgetConversationUseCase::new(queue.clone()).with_store(store);

    let engine = ChatEngine::new(queue, Arc::new(run_turn), Arc::new(forget))
        .with_conversation_logger(conversation_logger);

    let mut driver = ChatDriver::new(engine, ConversationKey::new(cli.channel), bot_name)
        .with_sender(format!("console-{}", cli.sender), cli.sender);
    driver.print_welcome();
    driver.run(BufReader::new(tokio::io::stdin())).await?;

    Ok(())
}

/// Console logging by verbosity, plus a daily rolling file when
/// `[logging] file` is set.
fn init_tracing(
    verbose: u8,
    config: &FileConfig,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match config.logging.file.as_ref() {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| ".".into());
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "turnstile.log".to_string());
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, name));
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    guard
}
