/// Substring filter that keeps matching messages out of the window.
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    needles: Vec<String>,
}

impl MessageFilter {
    /// Empty needles are dropped; they would match every message.
    pub fn new(needles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            needles: needles
                .into_iter()
                .map(Into::into)
                .filter(|n: &String| !n.is_empty())
                .collect(),
        }
    }

    pub fn blocks(&self, content: &str) -> bool {
        self.needles.iter().any(|needle| content.contains(needle.as_str()))
    }
}
