use std::collections::HashMap;
use turnstile_application::EmojiResolver;

/// Name → id table loaded from the `[emoji]` config section.
#[derive(Debug, Clone, Default)]
pub struct StaticEmojiTable {
    table: HashMap<String, String>,
}

impl StaticEmojiTable {
    pub fn new(table: HashMap<String, String>) -> Self {
        Self { table }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl EmojiResolver for StaticEmojiTable {
    fn resolve(&self, name: &str) -> Option<String> {
        self.table.get(name.trim()).cloned()
    }
}
