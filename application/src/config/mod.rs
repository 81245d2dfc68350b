//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`QueueSettings`]: window size, trigger range, mixed slots, filter
//! - [`TurnParams`]: dispatch decision, timeouts, attempts, pacing

pub mod queue_settings;
pub mod turn_params;

pub use queue_settings::QueueSettings;
pub use turn_params::TurnParams;
