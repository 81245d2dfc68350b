//! Admission Queue: per-conversation windows and trigger counters.

pub mod queue;

pub use queue::AdmissionQueue;
