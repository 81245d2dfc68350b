//! Backend Pool: round-robin selection over configured backends.

pub mod backend_pool;

pub use backend_pool::{BackendHandle, BackendPool};
