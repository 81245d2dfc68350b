//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for turnstile
#[derive(Parser, Debug)]
#[command(name = "turnstile")]
#[command(author, version, about = "Turn-taking chat engine for LLM group-chat bots")]
#[command(long_about = r#"
Turnstile decides when a chat bot should speak, asks a language model what
to say, and paces the answer out as natural-looking fragments.

Lines read from stdin are treated as inbound messages for one conversation.
Outbound fragments are printed to stdout. A line containing `@<bot_name>`
counts as a mention; `/forget` clears the conversation.

Configuration files are loaded from (in priority order):
1. TURNSTILE_* environment variables
2. --config <path>        Explicit config file
3. ./turnstile.toml       Project-level config
4. ~/.config/turnstile/config.toml   Global config

Example:
  turnstile --channel 1001 --sender Alice
  TURNSTILE_QUEUE__MAX_TRIGGER_COUNT=1 turnstile -v
"#)]
pub struct Cli {
    /// Conversation id the stdin lines belong to
    #[arg(long, value_name = "ID", default_value = "console")]
    pub channel: String,

    /// Display name used for stdin lines
    #[arg(long, value_name = "NAME", default_value = "you")]
    pub sender: String,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
