//! Output configuration from TOML (`[output]` section)

use serde::{Deserialize, Serialize};
use turnstile_domain::DEFAULT_SENTENCE_PATTERN;

/// One post-processing rule, applied to each fragment in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReplaceRule {
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Pacing rate in characters per second; 0 sends without delay
    pub words_per_second: u32,
    /// Sentence-boundary regex used to split plain text
    pub sentence_pattern: String,
    pub replace: Vec<FileReplaceRule>,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            words_per_second: 0,
            sentence_pattern: DEFAULT_SENTENCE_PATTERN.to_string(),
            replace: Vec::new(),
            color: true,
        }
    }
}
