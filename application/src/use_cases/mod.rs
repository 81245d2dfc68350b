//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod forget;
pub mod handle_inbound;
pub mod run_turn;
