//! Admission state of a single window: entries plus trigger counter.

use super::entities::QueueEntry;
use super::trigger::{TriggerCounter, TriggerRange};
use super::window::ConversationWindow;
use rand::Rng;

/// Window and counter for one conversation (or one mixed slot).
///
/// Pure state; callers serialize access per conversation key.
#[derive(Debug, Clone)]
pub struct ConversationState {
    window: ConversationWindow,
    counter: TriggerCounter,
    range: TriggerRange,
}

impl ConversationState {
    /// Fresh state. The counter starts at `range.min()`.
    pub fn new(slot_size: usize, range: TriggerRange) -> Self {
        Self {
            window: ConversationWindow::new(slot_size),
            counter: TriggerCounter::new(range.min()),
            range,
        }
    }

    pub fn enqueue(&mut self, entry: QueueEntry) {
        self.window.push(entry);
    }

    pub fn warm(&mut self, history: Vec<QueueEntry>) {
        self.window.extend(history);
    }

    pub fn decrement_trigger(&mut self, authored_by_self: bool) {
        self.counter.decrement(authored_by_self);
    }

    /// Dispatch decision: counter exhausted, or a mention wins the draw.
    pub fn should_dispatch<R: Rng + ?Sized>(
        &self,
        was_mentioned: bool,
        mention_reply_probability: f64,
        rng: &mut R,
    ) -> bool {
        if self.counter.is_due() {
            return true;
        }
        was_mentioned && rng.random_bool(mention_reply_probability.clamp(0.0, 1.0))
    }

    pub fn reset_trigger(&mut self, next_count: i64) {
        self.counter.reset(self.range, next_count);
    }

    pub fn reset_trigger_random<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let next = self.range.draw(rng);
        self.counter.reset(self.range, next);
    }

    /// Empty the window and restore the initial counter.
    pub fn clear(&mut self) -> bool {
        self.counter = TriggerCounter::new(self.range.min());
        self.window.clear()
    }

    pub fn snapshot(&self) -> Vec<QueueEntry> {
        self.window.snapshot()
    }

    pub fn window(&self) -> &ConversationWindow {
        &self.window
    }

    pub fn counter(&self) -> TriggerCounter {
        self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn entry(n: usize) -> QueueEntry {
        QueueEntry::new(format!("m{n}"), "u1", "Alice", "hi")
    }

    #[test]
    fn range_of_one_dispatches_on_every_message() {
        let range = TriggerRange::new(1, 1).unwrap();
        let mut state = ConversationState::new(10, range);
        let mut rng = StdRng::seed_from_u64(1);
        for n in 0..25 {
            state.enqueue(entry(n));
            state.decrement_trigger(false);
            assert!(state.should_dispatch(false, 0.0, &mut rng));
            state.reset_trigger_random(&mut rng);
        }
    }

    #[test]
    fn mention_with_certain_probability_forces_dispatch() {
        let range = TriggerRange::new(5, 5).unwrap();
        let state = ConversationState::new(10, range);
        let mut rng = StdRng::seed_from_u64(2);
        assert!(!state.should_dispatch(false, 1.0, &mut rng));
        assert!(state.should_dispatch(true, 1.0, &mut rng));
        assert!(!state.should_dispatch(true, 0.0, &mut rng));
    }

    #[test]
    fn out_of_range_probability_is_clamped() {
        let range = TriggerRange::new(5, 5).unwrap();
        let state = ConversationState::new(10, range);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(state.should_dispatch(true, 7.5, &mut rng));
        assert!(!state.should_dispatch(true, -1.0, &mut rng));
    }

    #[test]
    fn clear_restores_initial_counter() {
        let range = TriggerRange::new(3, 8).unwrap();
        let mut state = ConversationState::new(10, range);
        state.enqueue(entry(0));
        state.decrement_trigger(false);
        assert!(state.clear());
        assert_eq!(state.counter().remaining(), 3);
        assert!(!state.clear());
    }
}
