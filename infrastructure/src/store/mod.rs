//! [`MessageStore`](turnstile_application::MessageStore) adapters.

mod memory;

pub use memory::InMemoryMessageStore;
