//! Conversation entities: keys and admitted messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix that marks a private (direct-message) conversation key.
pub const PRIVATE_CHAT_MARKER: &str = "private:";

/// Identifier of a channel or private chat whose messages share one
/// window and one trigger counter (Value Object).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationKey(String);

impl ConversationKey {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Key for a private chat with the given user.
    pub fn private(user_id: impl AsRef<str>) -> Self {
        Self(format!("{}{}", PRIVATE_CHAT_MARKER, user_id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_private(&self) -> bool {
        self.0.starts_with(PRIVATE_CHAT_MARKER)
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ConversationKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One admitted message (Entity).
///
/// Immutable once created: fields are only reachable through accessors.
/// `content` already carries the inline quote/attachment markers produced
/// by the platform adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    id: String,
    sender_id: String,
    sender_display_name: String,
    content: String,
    timestamp: DateTime<Utc>,
}

impl QueueEntry {
    /// Create an entry stamped with the current UTC time.
    pub fn new(
        id: impl Into<String>,
        sender_id: impl Into<String>,
        sender_display_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::with_timestamp(id, sender_id, sender_display_name, content, Utc::now())
    }

    pub fn with_timestamp(
        id: impl Into<String>,
        sender_id: impl Into<String>,
        sender_display_name: impl Into<String>,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            sender_id: sender_id.into(),
            sender_display_name: sender_display_name.into(),
            content: content.into(),
            timestamp,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sender_id(&self) -> &str {
        &self.sender_id
    }

    pub fn sender_display_name(&self) -> &str {
        &self.sender_display_name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_key_carries_marker() {
        let key = ConversationKey::private("42");
        assert_eq!(key.as_str(), "private:42");
        assert!(key.is_private());
        assert!(!ConversationKey::new("42").is_private());
    }

    #[test]
    fn key_serializes_as_plain_string() {
        let key = ConversationKey::new("1001");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"1001\"");
    }

    #[test]
    fn entry_accessors() {
        let entry = QueueEntry::new("m1", "u1", "Alice", "hello");
        assert_eq!(entry.id(), "m1");
        assert_eq!(entry.sender_id(), "u1");
        assert_eq!(entry.sender_display_name(), "Alice");
        assert_eq!(entry.content(), "hello");
    }
}
