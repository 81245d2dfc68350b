//! Emoji/sticker name → platform id lookup.

pub trait EmojiResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<String>;
}

/// Knows no emoji; every `<emoji/>` placeholder is dropped.
pub struct NoEmojiResolver;

impl EmojiResolver for NoEmojiResolver {
    fn resolve(&self, _name: &str) -> Option<String> {
        None
    }
}
