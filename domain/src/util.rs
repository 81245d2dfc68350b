//! Small helpers shared across layers.

use std::borrow::Cow;

/// Shorten `text` for log lines: at most `max_bytes` bytes (never splitting a
/// character) followed by `…` when anything was cut.
pub fn log_preview(text: &str, max_bytes: usize) -> Cow<'_, str> {
    if text.len() <= max_bytes {
        return Cow::Borrowed(text);
    }
    let end = (0..=max_bytes)
        .rev()
        .find(|&i| text.is_char_boundary(i))
        .unwrap_or(0);
    Cow::Owned(format!("{}…", &text[..end]))
}
