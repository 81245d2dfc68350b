//! Reply normalization.
//!
//! Converts a raw backend reply (a string that should, but may not,
//! contain a JSON object) into a typed [`NormalizedReply`](entities::NormalizedReply).

pub mod entities;
pub mod extract;
pub mod normalizer;
