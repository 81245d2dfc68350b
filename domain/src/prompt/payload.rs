//! Prompt payload rendering.
//!
//! A turn sends the system prompt, an optional assistant priming message,
//! and one user message holding the window as a JSON array:
//!
//! ```json
//! [{"id":"m1","author":"Alice","author_id":"1001","msg":"hello"}]
//! ```

use crate::conversation::entities::QueueEntry;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Text substituted for image markers older than the retention limit.
pub const ELIDED_IMAGE: &str = "[image]";

static IMAGE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<img\b[^>]*>").expect("image marker pattern is valid"));

/// Role of a message in the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// What a backend client receives for one dispatch.
///
/// `system` is kept apart from `messages` because some backends take it as a
/// top-level field rather than as the first message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPayload {
    pub system: String,
    pub messages: Vec<PromptMessage>,
}

impl PromptPayload {
    /// All messages with the system prompt first (empty system prompts are
    /// omitted).
    pub fn with_system_message(&self) -> Vec<PromptMessage> {
        let system = (!self.system.is_empty()).then(|| PromptMessage::system(&self.system));
        system.into_iter().chain(self.messages.iter().cloned()).collect()
    }
}

#[derive(Serialize)]
struct WindowLine<'a> {
    id: &'a str,
    author: &'a str,
    author_id: &'a str,
    msg: &'a str,
}

#[derive(Debug, Clone, Default)]
pub struct PayloadBuilder {
    system_prompt: String,
    priming: Option<String>,
    retained_images: usize,
}

impl PayloadBuilder {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            priming: None,
            retained_images: 0,
        }
    }

    pub fn with_priming(mut self, priming: impl Into<String>) -> Self {
        let priming = priming.into();
        self.priming = (!priming.is_empty()).then_some(priming);
        self
    }

    pub fn with_retained_images(mut self, retained_images: usize) -> Self {
        self.retained_images = retained_images;
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn build(&self, entries: &[QueueEntry]) -> PromptPayload {
        let mut messages = Vec::with_capacity(2);
        if let Some(priming) = &self.priming {
            messages.push(PromptMessage::assistant(priming));
        }
        messages.push(PromptMessage::user(render_window(
            entries,
            self.retained_images,
        )));
        PromptPayload {
            system: self.system_prompt.clone(),
            messages,
        }
    }
}

/// Render a window snapshot as a JSON array, keeping only the newest
/// `retained_images` image markers.
pub fn render_window(entries: &[QueueEntry], retained_images: usize) -> String {
    let total: usize = entries
        .iter()
        .map(|e| IMAGE_MARKER.find_iter(e.content()).count())
        .sum();
    let mut to_elide = total.saturating_sub(retained_images);

    let contents: Vec<String> = entries
        .iter()
        .map(|entry| {
            if to_elide == 0 {
                return entry.content().to_string();
            }
            IMAGE_MARKER
                .replace_all(entry.content(), |caps: &regex::Captures<'_>| {
                    if to_elide > 0 {
                        to_elide -= 1;
                        ELIDED_IMAGE.to_string()
                    } else {
                        caps[0].to_string()
                    }
                })
                .into_owned()
        })
        .collect();

    let lines: Vec<WindowLine<'_>> = entries
        .iter()
        .zip(&contents)
        .map(|(entry, msg)| WindowLine {
            id: entry.id(),
            author: entry.sender_display_name(),
            author_id: entry.sender_id(),
            msg,
        })
        .collect();

    // Serializing borrowed strings into a Vec cannot fail.
    serde_json::to_string(&lines).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn entry(id: &str, msg: &str) -> QueueEntry {
        QueueEntry::new(id, "u1", "Alice", msg)
    }

    #[test]
    fn renders_window_as_json_array() {
        let rendered = render_window(&[entry("m1", "你好")], 0);
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed[0]["id"], "m1");
        assert_eq!(parsed[0]["author"], "Alice");
        assert_eq!(parsed[0]["author_id"], "u1");
        assert_eq!(parsed[0]["msg"], "你好");
    }

    #[test]
    fn keeps_only_newest_images() {
        let entries = vec![
            entry("m1", r#"look <img src="a.png"/>"#),
            entry("m2", r#"<img src="b.png"/> and <img src="c.png"/>"#),
        ];
        let parsed: Value = serde_json::from_str(&render_window(&entries, 1)).unwrap();
        assert_eq!(parsed[0]["msg"], "look [image]");
        assert_eq!(parsed[1]["msg"], r#"[image] and <img src="c.png"/>"#);
    }

    #[test]
    fn zero_retention_elides_every_image() {
        let parsed: Value =
            serde_json::from_str(&render_window(&[entry("m1", "<img x/>")], 0)).unwrap();
        assert_eq!(parsed[0]["msg"], "[image]");
    }

    #[test]
    fn builder_orders_priming_before_window() {
        let payload = PayloadBuilder::new("be brief")
            .with_priming("{\"status\":\"skip\"}")
            .build(&[entry("m1", "hi")]);

        assert_eq!(payload.system, "be brief");
        assert_eq!(payload.messages.len(), 2);
        assert_eq!(payload.messages[0].role, Role::Assistant);
        assert_eq!(payload.messages[1].role, Role::User);

        let all = payload.with_system_message();
        assert_eq!(all[0], PromptMessage::system("be brief"));
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn empty_system_prompt_is_omitted() {
        let payload = PayloadBuilder::default().build(&[]);
        assert_eq!(payload.with_system_message().len(), 1);
        assert_eq!(payload.messages[0].content, "[]");
    }
}
