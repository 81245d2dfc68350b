//! Admission queue configuration from TOML (`[queue]` section)

use serde::{Deserialize, Serialize};

/// One mixed window shared by several conversations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSlotConfig {
    pub name: String,
    /// Conversation keys (channel ids, or `private:<user>`)
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileQueueConfig {
    /// Window length per conversation (default: 20)
    pub slot_size: usize,
    /// Lower bound for trigger resets (default: 2)
    pub min_trigger_count: i64,
    /// Upper bound for trigger resets (default: 6)
    pub max_trigger_count: i64,
    /// Chance a mention forces an early dispatch (default: 0.5)
    pub at_react_possibility: f64,
    /// Messages containing any of these substrings are not admitted
    pub filter: Vec<String>,
    /// Write to every matching slot instead of only the first
    pub apply_to_all_matching: bool,
    pub slots: Vec<FileSlotConfig>,
}

impl Default for FileQueueConfig {
    fn default() -> Self {
        Self {
            slot_size: 20,
            min_trigger_count: 2,
            max_trigger_count: 6,
            at_react_possibility: 0.5,
            filter: Vec::new(),
            apply_to_all_matching: false,
            slots: Vec::new(),
        }
    }
}
