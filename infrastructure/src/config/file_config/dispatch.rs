//! Dispatch configuration from TOML (`[dispatch]` and `[reply]` sections)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDispatchConfig {
    /// Timeout in seconds for one backend call; 0 disables (default: 60)
    pub timeout_seconds: u64,
    /// Backend calls per turn, each on the next pool member (default: 1)
    pub attempts: usize,
    /// Sampling temperature; backends may override
    pub temperature: Option<f32>,
}

impl Default for FileDispatchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 60,
            attempts: 1,
            temperature: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReplyConfig {
    /// Tolerate a missing `status` and alternate reply field names
    pub allow_error_format: bool,
}
