//! Trigger countdown gating when the model is invoked.
//!
//! Every externally authored message decrements the [`TriggerCounter`];
//! once it reaches zero (or below) the conversation is due for a dispatch.
//! After each turn the counter is reset to a value inside [`TriggerRange`],
//! preferring the count suggested by the model itself.

use crate::core::error::DomainError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Inclusive range `[min, max]` that trigger resets are clamped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRange {
    min: i64,
    max: i64,
}

impl TriggerRange {
    pub fn new(min: i64, max: i64) -> Result<Self, DomainError> {
        if min < 0 || min > max {
            return Err(DomainError::InvalidTriggerRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.min, self.max)
    }

    /// Uniform draw from the range, used when the model gave no count.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        rng.random_range(self.min..=self.max)
    }
}

impl Default for TriggerRange {
    fn default() -> Self {
        Self { min: 2, max: 6 }
    }
}

/// Per-conversation countdown to the next model invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerCounter {
    remaining: i64,
}

impl TriggerCounter {
    pub fn new(initial: i64) -> Self {
        Self { remaining: initial }
    }

    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    /// Count one message. Messages authored by the bot itself are ignored.
    pub fn decrement(&mut self, authored_by_self: bool) {
        if !authored_by_self {
            self.remaining -= 1;
        }
    }

    pub fn is_due(&self) -> bool {
        self.remaining <= 0
    }

    /// Store `next` clamped into `range`; the result is always >= 0.
    pub fn reset(&mut self, range: TriggerRange, next: i64) {
        self.remaining = range.clamp(next);
    }
}
