//! [`EmojiResolver`](turnstile_application::EmojiResolver) adapters.

mod table;

pub use table::StaticEmojiTable;
