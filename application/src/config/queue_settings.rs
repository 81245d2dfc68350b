//! Admission queue settings.

use turnstile_domain::{DomainError, MessageFilter, MixedSlot, SlotRouting, TriggerRange};

/// Validated settings for [`AdmissionQueue`](crate::admission::AdmissionQueue).
#[derive(Debug, Clone)]
pub struct QueueSettings {
    pub slot_size: usize,
    pub trigger_range: TriggerRange,
    pub routing: SlotRouting,
    pub filter: MessageFilter,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            slot_size: 20,
            trigger_range: TriggerRange::default(),
            routing: SlotRouting::default(),
            filter: MessageFilter::default(),
        }
    }
}

impl QueueSettings {
    pub fn new(slot_size: usize, min_trigger: i64, max_trigger: i64) -> Result<Self, DomainError> {
        if slot_size == 0 {
            return Err(DomainError::InvalidSlotSize);
        }
        Ok(Self {
            slot_size,
            trigger_range: TriggerRange::new(min_trigger, max_trigger)?,
            ..Self::default()
        })
    }

    pub fn with_slots(
        mut self,
        slots: Vec<MixedSlot>,
        apply_to_all_matching: bool,
    ) -> Result<Self, DomainError> {
        self.routing = SlotRouting::new(slots, apply_to_all_matching)?;
        Ok(self)
    }

    pub fn with_filter(mut self, filter: MessageFilter) -> Self {
        self.filter = filter;
        self
    }
}
