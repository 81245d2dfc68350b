//! Configuration file loading for turnstile
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `TURNSTILE_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./turnstile.toml` or `./.turnstile.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/turnstile/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, FileBackendConfig, FileConfig, FileDispatchConfig, FileEmojiConfig,
    FileLoggingConfig, FileOutputConfig, FilePromptConfig, FileQueueConfig, FileReplaceRule,
    FileReplyConfig, FileSlotConfig, Severity,
};
pub use loader::ConfigLoader;
