//! Output sequencing: turns reply text into ordered outbound fragments.

pub mod pacing;
pub mod placeholders;
pub mod rules;
pub mod scanner;
pub mod sequencer;
