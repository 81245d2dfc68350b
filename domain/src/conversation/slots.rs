//! Mixed-window routing.
//!
//! A [`MixedSlot`] groups several conversation keys into one shared window.
//! [`SlotRouting`] resolves which window a key reads from and writes to:
//!
//! | Key matches | Reads | Writes |
//! |-------------|-------|--------|
//! | no slot | its own window | its own window |
//! | one or more slots | first slot in configured order | first slot, or every matching slot with `apply_to_all_matching` |

use super::entities::ConversationKey;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named group of conversation keys sharing one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixedSlot {
    pub name: String,
    pub members: Vec<ConversationKey>,
}

impl MixedSlot {
    pub fn new(name: impl Into<String>, members: Vec<ConversationKey>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }

    pub fn contains(&self, key: &ConversationKey) -> bool {
        self.members.contains(key)
    }
}

/// Identity of a window: either a single conversation or a mixed slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WindowId {
    Conversation(ConversationKey),
    Slot(String),
}

#[derive(Debug, Clone, Default)]
pub struct SlotRouting {
    slots: Vec<MixedSlot>,
    apply_to_all_matching: bool,
}

impl SlotRouting {
    /// Build routing over `slots` in their configured order.
    ///
    /// Fails when a key is claimed by more than one slot and
    /// `apply_to_all_matching` is off.
    pub fn new(slots: Vec<MixedSlot>, apply_to_all_matching: bool) -> Result<Self, DomainError> {
        if !apply_to_all_matching {
            let mut owner: HashMap<&ConversationKey, &str> = HashMap::new();
            for slot in &slots {
                for member in &slot.members {
                    if let Some(first) = owner.get(member)
                        && *first != slot.name
                    {
                        return Err(DomainError::OverlappingSlots {
                            key: member.to_string(),
                            first: first.to_string(),
                            second: slot.name.clone(),
                        });
                    }
                    owner.insert(member, &slot.name);
                }
            }
        }
        Ok(Self {
            slots,
            apply_to_all_matching,
        })
    }

    /// The authoritative window for `key`.
    pub fn resolve(&self, key: &ConversationKey) -> WindowId {
        self.slots
            .iter()
            .find(|slot| slot.contains(key))
            .map(|slot| WindowId::Slot(slot.name.clone()))
            .unwrap_or_else(|| WindowId::Conversation(key.clone()))
    }

    /// Every window an entry for `key` is written to; the authoritative
    /// window comes first.
    pub fn write_targets(&self, key: &ConversationKey) -> Vec<WindowId> {
        if !self.apply_to_all_matching {
            return vec![self.resolve(key)];
        }
        let targets: Vec<WindowId> = self
            .slots
            .iter()
            .filter(|slot| slot.contains(key))
            .map(|slot| WindowId::Slot(slot.name.clone()))
            .collect();
        if targets.is_empty() {
            vec![WindowId::Conversation(key.clone())]
        } else {
            targets
        }
    }

    pub fn slots(&self) -> &[MixedSlot] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> ConversationKey {
        ConversationKey::new(s)
    }

    fn slot(name: &str, members: &[&str]) -> MixedSlot {
        MixedSlot::new(name, members.iter().map(|m| key(m)).collect())
    }

    #[test]
    fn unmatched_key_uses_own_window() {
        let routing = SlotRouting::new(vec![slot("lobby", &["1", "2"])], false).unwrap();
        assert_eq!(routing.resolve(&key("3")), WindowId::Conversation(key("3")));
    }

    #[test]
    fn members_share_the_slot_window() {
        let routing = SlotRouting::new(vec![slot("lobby", &["1", "2"])], false).unwrap();
        assert_eq!(routing.resolve(&key("1")), WindowId::Slot("lobby".into()));
        assert_eq!(routing.resolve(&key("2")), routing.resolve(&key("1")));
    }

    #[test]
    fn overlapping_slots_are_rejected_without_apply_all() {
        let result = SlotRouting::new(vec![slot("a", &["1"]), slot("b", &["1"])], false);
        assert!(matches!(result, Err(DomainError::OverlappingSlots { .. })));
    }

    #[test]
    fn apply_all_writes_to_every_match_and_reads_first() {
        let routing =
            SlotRouting::new(vec![slot("a", &["1"]), slot("b", &["1", "2"])], true).unwrap();
        assert_eq!(routing.resolve(&key("1")), WindowId::Slot("a".into()));
        assert_eq!(
            routing.write_targets(&key("1")),
            vec![WindowId::Slot("a".into()), WindowId::Slot("b".into())]
        );
        assert_eq!(routing.write_targets(&key("2")), vec![WindowId::Slot("b".into())]);
        assert_eq!(
            routing.write_targets(&key("9")),
            vec![WindowId::Conversation(key("9"))]
        );
    }
}
