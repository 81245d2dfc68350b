//! Emoji table from TOML (`[emoji]` section)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEmojiConfig {
    /// Emoji name → platform face id
    pub table: HashMap<String, String>,
}
