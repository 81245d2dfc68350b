//! Message store port
//!
//! Persistence of admitted messages. The engine only needs ordered history
//! per conversation; how it is stored is up to the adapter.

use async_trait::async_trait;
use thiserror::Error;
use turnstile_domain::{ConversationKey, QueueEntry};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Message store unavailable: {0}")]
    Unavailable(String),

    #[error("Stored record is corrupt: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn append(&self, key: &ConversationKey, entry: &QueueEntry) -> Result<(), StoreError>;

    /// Up to `limit` most recent entries, oldest first.
    async fn get_ordered(
        &self,
        key: &ConversationKey,
        limit: usize,
    ) -> Result<Vec<QueueEntry>, StoreError>;

    /// Returns the number of removed entries.
    async fn remove_by_conversation(&self, key: &ConversationKey) -> Result<usize, StoreError>;

    /// Drop every entry `sender_id` wrote, in any conversation. Returns
    /// whether anything was removed.
    async fn remove_by_sender(&self, sender_id: &str) -> Result<bool, StoreError>;
}
