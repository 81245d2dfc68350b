//! Admission Queue.
//!
//! Owns one [`ConversationState`] per window. A key either has its own
//! window or belongs to a mixed slot, in which case the slot's window and
//! counter are authoritative for every member.
//!
//! All operations take the internal map lock only briefly; the store is
//! awaited outside of it. Callers serialize admission per key (see
//! [`ChatEngine`](crate::use_cases::handle_inbound::ChatEngine)).

use crate::config::QueueSettings;
use crate::ports::message_store::MessageStore;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};
use turnstile_domain::{ConversationKey, ConversationState, QueueEntry, TriggerRange, WindowId};

pub struct AdmissionQueue {
    settings: QueueSettings,
    windows: Mutex<HashMap<WindowId, ConversationState>>,
    rng: Mutex<StdRng>,
    store: Option<Arc<dyn MessageStore>>,
}

impl AdmissionQueue {
    pub fn new(settings: QueueSettings) -> Self {
        Self {
            settings,
            windows: Mutex::new(HashMap::new()),
            rng: Mutex::new(StdRng::from_os_rng()),
            store: None,
        }
    }

    /// Persist admitted entries and warm fresh windows from `store`.
    pub fn with_store(mut self, store: Arc<dyn MessageStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Deterministic draws, for tests and replays.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn settings(&self) -> &QueueSettings {
        &self.settings
    }

    pub fn trigger_range(&self) -> TriggerRange {
        self.settings.trigger_range
    }

    /// Whether the filter keeps `content` out of the queue.
    pub fn is_filtered(&self, content: &str) -> bool {
        self.settings.filter.blocks(content)
    }

    /// Append `entry` to every window `key` writes to, evicting the oldest
    /// entries past `slot_size`. Returns `false` when the filter rejected it.
    pub async fn enqueue(&self, key: &ConversationKey, entry: QueueEntry) -> bool {
        if self.is_filtered(entry.content()) {
            debug!(conversation = %key, id = entry.id(), "Message filtered");
            return false;
        }
        self.record(key, entry).await;
        true
    }

    /// Like [`enqueue`](Self::enqueue) but bypasses the filter. Used for the
    /// bot's own output.
    pub async fn record(&self, key: &ConversationKey, entry: QueueEntry) {
        self.warm_from_store(key).await;

        if let Some(store) = &self.store
            && let Err(e) = store.append(key, &entry).await
        {
            warn!(conversation = %key, "Failed to persist message: {}", e);
        }

        let targets = self.settings.routing.write_targets(key);
        let mut windows = self.windows();
        for id in targets {
            self.state_mut(&mut windows, id).enqueue(entry.clone());
        }
    }

    pub fn decrement_trigger(&self, key: &ConversationKey, authored_by_self: bool) {
        let id = self.settings.routing.resolve(key);
        let mut windows = self.windows();
        self.state_mut(&mut windows, id)
            .decrement_trigger(authored_by_self);
    }

    /// Counter exhausted, or a mention wins a draw with probability
    /// `mention_reply_probability` (clamped into `[0, 1]`).
    pub fn should_dispatch(
        &self,
        key: &ConversationKey,
        was_mentioned: bool,
        mention_reply_probability: f64,
    ) -> bool {
        let id = self.settings.routing.resolve(key);
        let windows = self.windows();
        let Some(state) = windows.get(&id) else {
            return false;
        };
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        state.should_dispatch(was_mentioned, mention_reply_probability, &mut *rng)
    }

    /// Store `next_count` clamped into the trigger range.
    pub fn reset_trigger(&self, key: &ConversationKey, next_count: i64) {
        let id = self.settings.routing.resolve(key);
        let mut windows = self.windows();
        self.state_mut(&mut windows, id).reset_trigger(next_count);
    }

    /// Store a uniform draw from the trigger range.
    pub fn reset_trigger_random(&self, key: &ConversationKey) {
        let id = self.settings.routing.resolve(key);
        let mut windows = self.windows();
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        self.state_mut(&mut windows, id)
            .reset_trigger_random(&mut *rng);
    }

    /// Empty the key's window and restore its initial counter. Returns
    /// whether anything was present.
    pub fn clear(&self, key: &ConversationKey) -> bool {
        let id = self.settings.routing.resolve(key);
        self.windows()
            .get_mut(&id)
            .map(ConversationState::clear)
            .unwrap_or(false)
    }

    /// Ordered copy of the key's authoritative window.
    pub fn snapshot(&self, key: &ConversationKey) -> Vec<QueueEntry> {
        let id = self.settings.routing.resolve(key);
        self.windows()
            .get(&id)
            .map(ConversationState::snapshot)
            .unwrap_or_default()
    }

    /// Remaining trigger count, if the key's window exists.
    pub fn trigger_remaining(&self, key: &ConversationKey) -> Option<i64> {
        let id = self.settings.routing.resolve(key);
        self.windows().get(&id).map(|s| s.counter().remaining())
    }

    pub fn window_count(&self) -> usize {
        self.windows().len()
    }

    async fn warm_from_store(&self, key: &ConversationKey) {
        let Some(store) = &self.store else {
            return;
        };
        let id = self.settings.routing.resolve(key);
        if !matches!(id, WindowId::Conversation(_)) || self.windows().contains_key(&id) {
            return;
        }

        match store.get_ordered(key, self.settings.slot_size).await {
            Ok(history) if !history.is_empty() => {
                debug!(conversation = %key, entries = history.len(), "Warming window from store");
                let mut windows = self.windows();
                let state = self.state_mut(&mut windows, id);
                if state.window().is_empty() {
                    state.warm(history);
                }
            }
            Ok(_) => {}
            Err(e) => warn!(conversation = %key, "Failed to load history: {}", e),
        }
    }

    fn windows(&self) -> MutexGuard<'_, HashMap<WindowId, ConversationState>> {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut<'a>(
        &self,
        windows: &'a mut HashMap<WindowId, ConversationState>,
        id: WindowId,
    ) -> &'a mut ConversationState {
        windows
            .entry(id)
            .or_insert_with(|| ConversationState::new(self.settings.slot_size, self.settings.trigger_range))
    }
}
