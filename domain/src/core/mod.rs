//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: configuration validation errors

pub mod error;
