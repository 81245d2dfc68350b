//! Staged, tolerant parse of a raw backend reply.
//!
//! The contract is "extract best-effort structure or fail loudly": every
//! path that cannot find the expected fields yields
//! [`NormalizedReply::Failure`] carrying the untouched raw text, never
//! invented content.
//!
//! # Reply schema
//!
//! ```json
//! {
//!   "status": "success" | "skip" | "function",
//!   "logic": "...", "reply": "...", "check": "...", "finalReply": "...",
//!   "quote": "message id or empty",
//!   "replyTo": "channel id, private:<user id>, or empty",
//!   "nextReplyIn": 3,
//!   "commands": []
//! }
//! ```
//!
//! Unknown extra fields are ignored.

use super::entities::{Command, FailureReason, NormalizedReply};
use super::extract::{escape_raw_control_chars, extract_json_span, unescape_high_unicode};
use crate::conversation::entities::{ConversationKey, PRIVATE_CHAT_MARKER};
use crate::conversation::trigger::TriggerRange;
use serde_json::{Map, Value};

/// Field names tried, in order, for the reply text in lenient mode after
/// `finalReply` and `reply`.
const LENIENT_REPLY_FIELDS: [&str; 4] = ["msg", "text", "message", "answer"];

#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizerOptions {
    /// Tolerate a missing `status` and alternate reply field names.
    pub allow_error_format: bool,
    /// Range `nextReplyIn` is clamped into.
    pub trigger_range: TriggerRange,
}

#[derive(Debug, Clone, Default)]
pub struct ReplyNormalizer {
    options: NormalizerOptions,
}

impl ReplyNormalizer {
    pub fn new(options: NormalizerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &NormalizerOptions {
        &self.options
    }

    /// Normalize one raw reply string.
    pub fn normalize(&self, raw: &str) -> NormalizedReply {
        let Some(span) = extract_json_span(raw) else {
            return failure(FailureReason::NoJsonObject, raw);
        };

        let unescaped = unescape_high_unicode(span);
        let prepared = escape_raw_control_chars(&unescaped);
        let value: Value = match serde_json::from_str(&prepared) {
            Ok(value) => value,
            Err(e) => return failure(FailureReason::ParseError(e.to_string()), raw),
        };
        let Value::Object(obj) = value else {
            return failure(
                FailureReason::ParseError("top-level value is not an object".to_string()),
                raw,
            );
        };

        let status = obj.get("status").and_then(Value::as_str).map(str::trim);
        let lenient = self.options.allow_error_format;

        match status {
            Some("success") => self.success(&obj, raw),
            Some("skip") => NormalizedReply::Skip {
                raw_text: raw.to_string(),
                next_trigger_count: self.next_trigger_count(&obj),
                commands: commands(&obj),
            },
            Some("function") => NormalizedReply::FunctionCall {
                commands: commands(&obj),
            },
            Some(other) if lenient && other.eq_ignore_ascii_case("success") => {
                self.success(&obj, raw)
            }
            Some(other) if lenient && other.eq_ignore_ascii_case("skip") => NormalizedReply::Skip {
                raw_text: raw.to_string(),
                next_trigger_count: self.next_trigger_count(&obj),
                commands: commands(&obj),
            },
            None if lenient && self.reply_text(&obj).is_some() => self.success(&obj, raw),
            other => failure(FailureReason::InvalidStatus(other.map(str::to_string)), raw),
        }
    }

    fn success(&self, obj: &Map<String, Value>, raw: &str) -> NormalizedReply {
        let Some(reply_text) = self.reply_text(obj) else {
            return failure(FailureReason::MissingReply, raw);
        };

        NormalizedReply::Success {
            reply_text,
            quoted_message_id: obj.get("quote").and_then(non_empty_string),
            reply_target: obj.get("replyTo").and_then(reply_target),
            next_trigger_count: self.next_trigger_count(obj),
            commands: commands(obj),
        }
    }

    /// `finalReply`, then `reply`; in lenient mode also the alternate names.
    fn reply_text(&self, obj: &Map<String, Value>) -> Option<String> {
        let primary = ["finalReply", "reply"].into_iter();
        let lenient = self
            .options
            .allow_error_format
            .then_some(LENIENT_REPLY_FIELDS.into_iter())
            .into_iter()
            .flatten();

        primary
            .chain(lenient)
            .find_map(|field| {
                obj.get(field)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
            })
            .map(str::to_string)
    }

    fn next_trigger_count(&self, obj: &Map<String, Value>) -> Option<i64> {
        let value = obj.get("nextReplyIn")?;
        let count = match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))?,
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))?
            }
            _ => return None,
        };
        Some(self.options.trigger_range.clamp(count))
    }
}

fn failure(reason: FailureReason, raw: &str) -> NormalizedReply {
    NormalizedReply::Failure {
        reason,
        raw_text: raw.to_string(),
    }
}

fn commands(obj: &Map<String, Value>) -> Vec<Command> {
    match obj.get("commands") {
        Some(Value::Array(items)) => items.iter().cloned().map(Command::from_value).collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![Command::Text(s.clone())],
        _ => Vec::new(),
    }
}

/// Strings and numbers both count; empty means absent.
fn non_empty_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Private targets are kept whole; anything else keeps only its leading
/// digit run (models sometimes append the channel name).
fn reply_target(value: &Value) -> Option<ConversationKey> {
    let target = non_empty_string(value)?;
    if target.starts_with(PRIVATE_CHAT_MARKER) {
        return Some(ConversationKey::new(target));
    }
    let digits: String = target.chars().take_while(|c| c.is_ascii_digit()).collect();
    (!digits.is_empty()).then(|| ConversationKey::new(digits))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> ReplyNormalizer {
        ReplyNormalizer::new(NormalizerOptions {
            allow_error_format: false,
            trigger_range: TriggerRange::new(1, 10).unwrap(),
        })
    }

    fn lenient() -> ReplyNormalizer {
        ReplyNormalizer::new(NormalizerOptions {
            allow_error_format: true,
            trigger_range: TriggerRange::new(1, 10).unwrap(),
        })
    }

    // ==================== Success ====================

    #[test]
    fn success_wrapped_in_noise() {
        let raw = r#"noise {"status":"success","finalReply":"hi","quote":"","nextReplyIn":2} trailing"#;
        match normalizer().normalize(raw) {
            NormalizedReply::Success {
                reply_text,
                quoted_message_id,
                next_trigger_count,
                commands,
                ..
            } => {
                assert_eq!(reply_text, "hi");
                assert_eq!(quoted_message_id, None);
                assert_eq!(next_trigger_count, Some(2));
                assert!(commands.is_empty());
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn final_reply_wins_over_reply() {
        let raw = r#"{"status":"success","reply":"draft","finalReply":"final"}"#;
        let NormalizedReply::Success { reply_text, .. } = normalizer().normalize(raw) else {
            panic!("expected success");
        };
        assert_eq!(reply_text, "final");
    }

    #[test]
    fn reply_used_when_final_reply_absent() {
        let raw = r#"{"status":"success","reply":"draft","quote":"m42"}"#;
        let NormalizedReply::Success {
            reply_text,
            quoted_message_id,
            ..
        } = normalizer().normalize(raw)
        else {
            panic!("expected success");
        };
        assert_eq!(reply_text, "draft");
        assert_eq!(quoted_message_id.as_deref(), Some("m42"));
    }

    #[test]
    fn next_reply_in_is_clamped() {
        let low = normalizer().normalize(r#"{"status":"success","reply":"a","nextReplyIn":-5}"#);
        let high = normalizer().normalize(r#"{"status":"success","reply":"a","nextReplyIn":999}"#);
        assert_eq!(low.next_trigger_count(), Some(1));
        assert_eq!(high.next_trigger_count(), Some(10));
    }

    #[test]
    fn next_reply_in_accepts_strings_and_floats() {
        let s = normalizer().normalize(r#"{"status":"success","reply":"a","nextReplyIn":"4"}"#);
        let f = normalizer().normalize(r#"{"status":"success","reply":"a","nextReplyIn":3.7}"#);
        let bad = normalizer().normalize(r#"{"status":"success","reply":"a","nextReplyIn":"soon"}"#);
        assert_eq!(s.next_trigger_count(), Some(4));
        assert_eq!(f.next_trigger_count(), Some(3));
        assert_eq!(bad.next_trigger_count(), None);
    }

    #[test]
    fn reply_to_keeps_leading_digits() {
        let raw = r#"{"status":"success","reply":"a","replyTo":"123456 (the dev channel)"}"#;
        let NormalizedReply::Success { reply_target, .. } = normalizer().normalize(raw) else {
            panic!("expected success");
        };
        assert_eq!(reply_target, Some(ConversationKey::new("123456")));
    }

    #[test]
    fn reply_to_private_target_is_kept_whole() {
        let raw = r#"{"status":"success","reply":"a","replyTo":"private:987"}"#;
        let NormalizedReply::Success { reply_target, .. } = normalizer().normalize(raw) else {
            panic!("expected success");
        };
        assert_eq!(reply_target, Some(ConversationKey::private("987")));
    }

    #[test]
    fn reply_to_without_digits_is_dropped() {
        let raw = r#"{"status":"success","reply":"a","replyTo":"somewhere"}"#;
        let NormalizedReply::Success { reply_target, .. } = normalizer().normalize(raw) else {
            panic!("expected success");
        };
        assert_eq!(reply_target, None);
    }

    #[test]
    fn multiline_reply_is_tolerated() {
        let raw = "{\"status\":\"success\",\"reply\":\"line one\nline two\"}";
        let NormalizedReply::Success { reply_text, .. } = normalizer().normalize(raw) else {
            panic!("expected success");
        };
        assert_eq!(reply_text, "line one\nline two");
    }

    #[test]
    fn commands_are_carried_through() {
        let raw = r#"{"status":"success","reply":"ok","commands":["mute 1 60",{"op":"kick"}]}"#;
        let reply = normalizer().normalize(raw);
        assert_eq!(reply.commands().len(), 2);
        assert_eq!(reply.commands()[0].as_text(), Some("mute 1 60"));
    }

    // ==================== Skip / Function ====================

    #[test]
    fn skip_keeps_raw_text_and_commands() {
        let raw = r#"{"status":"skip","commands":["noop"]}"#;
        let NormalizedReply::Skip {
            raw_text, commands, ..
        } = normalizer().normalize(raw)
        else {
            panic!("expected skip");
        };
        assert_eq!(raw_text, raw);
        assert_eq!(commands, vec![Command::Text("noop".into())]);
    }

    #[test]
    fn function_call_has_only_commands() {
        let raw = r#"{"status":"function","reply":"ignored","commands":["search cats"]}"#;
        assert_eq!(
            normalizer().normalize(raw),
            NormalizedReply::FunctionCall {
                commands: vec![Command::Text("search cats".into())]
            }
        );
    }

    // ==================== Failure ====================

    #[test]
    fn no_json_returns_raw_text_unchanged() {
        let raw = "I'd rather not answer in JSON today.";
        assert_eq!(
            normalizer().normalize(raw),
            NormalizedReply::Failure {
                reason: FailureReason::NoJsonObject,
                raw_text: raw.to_string(),
            }
        );
    }

    #[test]
    fn parse_error_is_reported() {
        let reply = normalizer().normalize("{status: success}");
        assert!(matches!(
            reply,
            NormalizedReply::Failure {
                reason: FailureReason::ParseError(_),
                ..
            }
        ));
    }

    #[test]
    fn missing_status_fails_in_strict_mode() {
        let reply = normalizer().normalize(r#"{"reply":"hi"}"#);
        assert!(matches!(
            reply,
            NormalizedReply::Failure {
                reason: FailureReason::InvalidStatus(None),
                ..
            }
        ));
    }

    #[test]
    fn unknown_status_fails() {
        let reply = lenient().normalize(r#"{"status":"maybe","reply":"hi"}"#);
        assert!(matches!(
            reply,
            NormalizedReply::Failure {
                reason: FailureReason::InvalidStatus(Some(ref s)),
                ..
            } if s == "maybe"
        ));
    }

    #[test]
    fn success_without_reply_fields_fails() {
        let reply = normalizer().normalize(r#"{"status":"success","msg":"hi"}"#);
        assert!(matches!(
            reply,
            NormalizedReply::Failure {
                reason: FailureReason::MissingReply,
                ..
            }
        ));
    }

    // ==================== allow_error_format ====================

    #[test]
    fn lenient_mode_accepts_missing_status_with_reply_field() {
        let NormalizedReply::Success { reply_text, .. } = lenient().normalize(r#"{"answer":"42"}"#)
        else {
            panic!("expected success");
        };
        assert_eq!(reply_text, "42");
    }

    #[test]
    fn lenient_mode_falls_back_through_alternate_fields_in_order() {
        let raw = r#"{"status":"success","message":"third","text":"second"}"#;
        let NormalizedReply::Success { reply_text, .. } = lenient().normalize(raw) else {
            panic!("expected success");
        };
        assert_eq!(reply_text, "second");
    }

    #[test]
    fn lenient_mode_without_any_reply_field_still_fails() {
        let reply = lenient().normalize(r#"{"logic":"thinking"}"#);
        assert!(reply.is_failure());
    }

    #[test]
    fn lenient_mode_still_rejects_unknown_status() {
        let reply = lenient().normalize(r#"{"status":"maybe","reply":"hi"}"#);
        assert!(reply.is_failure());
    }

    #[test]
    fn lenient_mode_accepts_status_case_variants() {
        let reply = lenient().normalize(r#"{"status":"SUCCESS","reply":"hi"}"#);
        assert_eq!(reply.status_label(), "success");
        let strict = normalizer().normalize(r#"{"status":"SUCCESS","reply":"hi"}"#);
        assert!(strict.is_failure());
    }
}
