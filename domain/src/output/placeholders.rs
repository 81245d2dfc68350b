//! Mention, emoji and quote placeholder resolution.
//!
//! The model refers to people and stickers by name; the platform needs ids.
//!
//! | Placeholder | Resolved | Unresolved |
//! |-------------|----------|------------|
//! | `<at name="Alice"/>` | `<at id="1001"/>` | `@Alice` |
//! | `<emoji name="smile"/>` | `<face id="14"/>` | removed |

use crate::conversation::entities::QueueEntry;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

static MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<at\s+name\s*=\s*"([^"]*)"\s*/>"#).expect("mention pattern is valid")
});

static EMOJI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<emoji\s+name\s*=\s*"([^"]*)"\s*/>"#).expect("emoji pattern is valid")
});

/// Name → id lookups used while resolving placeholders.
pub trait PlaceholderResolver {
    fn mention_id(&self, display_name: &str) -> Option<String>;
    fn emoji_id(&self, name: &str) -> Option<String>;
}

/// Display-name directory built from a window snapshot. When two senders
/// share a display name, the most recent one wins.
#[derive(Debug, Clone, Default)]
pub struct SenderDirectory {
    by_name: HashMap<String, String>,
}

impl SenderDirectory {
    pub fn from_entries(entries: &[QueueEntry]) -> Self {
        let by_name = entries
            .iter()
            .map(|e| (e.sender_display_name().to_string(), e.sender_id().to_string()))
            .collect();
        Self { by_name }
    }

    pub fn id_for(&self, display_name: &str) -> Option<&str> {
        self.by_name.get(display_name).map(String::as_str)
    }
}

pub fn resolve_placeholders(text: &str, resolver: &dyn PlaceholderResolver) -> String {
    let mentioned = MENTION.replace_all(text, |caps: &Captures<'_>| {
        let name = &caps[1];
        match resolver.mention_id(name) {
            Some(id) => mention_tag(&id),
            None => format!("@{name}"),
        }
    });
    EMOJI
        .replace_all(&mentioned, |caps: &Captures<'_>| {
            resolver
                .emoji_id(&caps[1])
                .map(|id| format!(r#"<face id="{id}"/>"#))
                .unwrap_or_default()
        })
        .into_owned()
}

pub fn mention_tag(id: &str) -> String {
    format!(r#"<at id="{id}"/>"#)
}

pub fn quote_tag(message_id: &str) -> String {
    format!(r#"<quote id="{message_id}"/>"#)
}
