//! Process-local message history.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use turnstile_application::{MessageStore, StoreError};
use turnstile_domain::{ConversationKey, QueueEntry};

/// Keeps every admitted entry per conversation, in arrival order.
///
/// `capacity` bounds each conversation's history; the oldest entries are
/// discarded first.
pub struct InMemoryMessageStore {
    entries: RwLock<HashMap<ConversationKey, Vec<QueueEntry>>>,
    capacity: usize,
}

impl InMemoryMessageStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity,
        }
    }
}

impl Default for InMemoryMessageStore {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(&self, key: &ConversationKey, entry: &QueueEntry) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        let history = entries.entry(key.clone()).or_default();
        history.push(entry.clone());
        if history.len() > self.capacity {
            let excess = history.len() - self.capacity;
            history.drain(..excess);
        }
        Ok(())
    }

    async fn get_ordered(
        &self,
        key: &ConversationKey,
        limit: usize,
    ) -> Result<Vec<QueueEntry>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .map(|history| history[history.len().saturating_sub(limit)..].to_vec())
            .unwrap_or_default())
    }

    async fn remove_by_conversation(&self, key: &ConversationKey) -> Result<usize, StoreError> {
        Ok(self
            .entries
            .write()
            .await
            .remove(key)
            .map_or(0, |history| history.len()))
    }

    async fn remove_by_sender(&self, sender_id: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().await;
        let mut removed = false;
        entries.retain(|_, history| {
            let before = history.len();
            history.retain(|entry| entry.sender_id() != sender_id);
            removed |= history.len() != before;
            !history.is_empty()
        });
        Ok(removed)
    }
}
