//! Backend-neutral request parameters and reply envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-request sampling parameters. `None` leaves the backend default.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChatParameters {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl Usage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Common envelope every backend reply is reshaped into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
    pub role_content: String,
    pub usage: Usage,
}

impl RawReply {
    pub fn new(role_content: impl Into<String>, usage: Usage) -> Self {
        Self {
            role_content: role_content.into(),
            usage,
        }
    }
}

/// Flatten a message `content` value into plain text.
///
/// Strings pass through; arrays of content parts are concatenated from
/// their `text` fields (or string elements); `null` becomes empty.
pub fn flatten_content(content: &Value) -> String {
    match content {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|part| match part {
                Value::String(s) => Some(s.as_str()),
                Value::Object(_) => part.get("text").and_then(Value::as_str),
                _ => None,
            })
            .collect(),
        Value::Object(_) => content
            .get("text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| content.to_string()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn usage_totals() {
        assert_eq!(Usage::new(10, 5).total_tokens, 15);
    }

    #[test]
    fn flattens_content_parts() {
        let content = json!([
            {"type": "text", "text": "{\"status\":"},
            {"type": "image_url", "image_url": {"url": "x"}},
            {"type": "text", "text": "\"skip\"}"}
        ]);
        assert_eq!(flatten_content(&content), "{\"status\":\"skip\"}");
    }

    #[test]
    fn flattens_scalars() {
        assert_eq!(flatten_content(&json!("plain")), "plain");
        assert_eq!(flatten_content(&Value::Null), "");
        assert_eq!(flatten_content(&json!(42)), "42");
        assert_eq!(flatten_content(&json!({"text": "t"})), "t");
    }
}
