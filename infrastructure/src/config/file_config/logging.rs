//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL turn transcript
    pub conversation_log: Option<PathBuf>,
    /// Daily-rolling diagnostic log file (in addition to stderr)
    pub file: Option<PathBuf>,
}
