//! Prompt configuration from TOML (`[prompt]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePromptConfig {
    /// Inline system prompt
    pub system_prompt: Option<String>,
    /// File holding the system prompt; takes precedence over `system_prompt`
    pub system_prompt_file: Option<PathBuf>,
    /// Optional assistant message sent before the window
    pub priming: Option<String>,
    /// Image markers kept verbatim, newest first (default: 2)
    pub retained_images: usize,
    /// Display name the bot answers to (mentions are `@bot_name`)
    pub bot_name: String,
    /// Sender id of the bot's own messages
    pub bot_id: String,
}

impl Default for FilePromptConfig {
    fn default() -> Self {
        Self {
            system_prompt: None,
            system_prompt_file: None,
            priming: None,
            retained_images: 2,
            bot_name: "turnstile".to_string(),
            bot_id: "bot".to_string(),
        }
    }
}

impl FilePromptConfig {
    /// Resolve the system prompt text, reading `system_prompt_file` if set.
    pub fn load_system_prompt(&self) -> std::io::Result<String> {
        match &self.system_prompt_file {
            Some(path) => std::fs::read_to_string(path),
            None => Ok(self.system_prompt.clone().unwrap_or_default()),
        }
    }
}
