//! Bounded conversation window.
//!
//! [`ConversationWindow`] keeps the most recent `capacity` entries in
//! arrival order. Entries are never mutated after insertion; once the bound
//! is exceeded the oldest entries are evicted from the head.

use super::entities::QueueEntry;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct ConversationWindow {
    capacity: usize,
    entries: VecDeque<QueueEntry>,
}

impl ConversationWindow {
    /// Create an empty window. A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Append an entry, returning the entries evicted to stay within bounds.
    pub fn push(&mut self, entry: QueueEntry) -> Vec<QueueEntry> {
        self.entries.push_back(entry);
        let overflow = self.entries.len().saturating_sub(self.capacity);
        self.entries.drain(..overflow).collect()
    }

    /// Seed the window with already-ordered history (oldest first).
    pub fn extend(&mut self, history: impl IntoIterator<Item = QueueEntry>) {
        for entry in history {
            self.push(entry);
        }
    }

    /// Remove every entry. Returns whether anything was present.
    pub fn clear(&mut self) -> bool {
        let had_entries = !self.entries.is_empty();
        self.entries.clear();
        had_entries
    }

    pub fn entries(&self) -> impl Iterator<Item = &QueueEntry> {
        self.entries.iter()
    }

    /// Ordered copy of the current contents.
    pub fn snapshot(&self) -> Vec<QueueEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
