//! Forget Conversation use case.
//!
//! Administrative reset: empties the window, restores the initial trigger
//! count, and drops persisted history for the key.

use crate::admission::AdmissionQueue;
use crate::ports::message_store::MessageStore;
use std::sync::Arc;
use tracing::{info, warn};
use turnstile_domain::ConversationKey;

pub struct ForgetConversationUseCase {
    queue: Arc<AdmissionQueue>,
    store: Option<Arc<dyn MessageStore>>,
}

impl ForgetConversationUseCase {
    pub fn new(queue: Arc<AdmissionQueue>) -> Self {
        Self { queue, store: None }
    }

    pub fn with_store(mut self, store: Arc<dyn MessageStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Returns whether the in-memory window held anything.
    ///
    /// The window is cleared even when the store fails; the store error is
    /// only logged.
    pub async fn execute(&self, key: &ConversationKey) -> bool {
        let had_entries = self.queue.clear(key);
        let removed = match &self.store {
            Some(store) => match store.remove_by_conversation(key).await {
                Ok(removed) => removed,
                Err(e) => {
                    warn!(conversation = %key, "Failed to drop stored history: {}", e);
                    0
                }
            },
            None => 0,
        };
        info!(
            conversation = %key,
            had_entries,
            removed,
            "Conversation forgotten"
        );
        had_entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueueSettings;
    use crate::ports::message_store::StoreError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use turnstile_domain::QueueEntry;

    #[derive(Default)]
    struct CountingStore {
        removed: Mutex<Vec<ConversationKey>>,
    }

    #[async_trait]
    impl MessageStore for CountingStore {
        async fn append(&self, _: &ConversationKey, _: &QueueEntry) -> Result<(), StoreError> {
            Ok(())
        }

        async fn get_ordered(&self, _: &ConversationKey, _: usize) -> Result<Vec<QueueEntry>, StoreError> {
            Ok(Vec::new())
        }

        async fn remove_by_conversation(&self, key: &ConversationKey) -> Result<usize, StoreError> {
            self.removed.lock().unwrap().push(key.clone());
            Ok(1)
        }

        async fn remove_by_sender(&self, _: &str) -> Result<bool, StoreError> {
            Ok(false)
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl MessageStore for BrokenStore {
        async fn append(&self, _: &ConversationKey, _: &QueueEntry) -> Result<(), StoreError> {
            Ok(())
        }

        async fn get_ordered(&self, _: &ConversationKey, _: usize) -> Result<Vec<QueueEntry>, StoreError> {
            Ok(Vec::new())
        }

        async fn remove_by_conversation(&self, _: &ConversationKey) -> Result<usize, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }

        async fn remove_by_sender(&self, _: &str) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
    }

    #[tokio::test]
    async fn test_forget_clears_window_and_store() {
        let queue = Arc::new(AdmissionQueue::new(QueueSettings::default()));
        let store = Arc::new(CountingStore::default());
        let use_case = ForgetConversationUseCase::new(queue.clone()).with_store(store.clone());
        let key = ConversationKey::new("c");

        queue
            .enqueue(&key, QueueEntry::new("m1", "u1", "A", "hello"))
            .await;

        assert!(use_case.execute(&key).await);
        assert!(!use_case.execute(&key).await);
        assert!(queue.snapshot(&key).is_empty());
        assert_eq!(store.removed.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_store_failure_still_reports_cleared_window() {
        let queue = Arc::new(AdmissionQueue::new(QueueSettings::default()));
        let use_case = ForgetConversationUseCase::new(queue.clone()).with_store(Arc::new(BrokenStore));
        let key = ConversationKey::new("c");

        queue
            .enqueue(&key, QueueEntry::new("m1", "u1", "A", "hello"))
            .await;

        assert!(use_case.execute(&key).await);
        assert!(queue.snapshot(&key).is_empty());
    }
}
