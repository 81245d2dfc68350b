//! Normalized model reply types.

use crate::conversation::entities::ConversationKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A side command issued by the model.
///
/// Commands are opaque to the engine: they are carried through unchanged,
/// either as a bare string or as a structured record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Command {
    Text(String),
    Record(Value),
}

impl Command {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(s) => Command::Text(s),
            other => Command::Record(other),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Command::Text(s) => Some(s),
            Command::Record(_) => None,
        }
    }
}

/// Why a raw reply could not be normalized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    #[error("no JSON object found")]
    NoJsonObject,

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("invalid status: {}", .0.as_deref().unwrap_or("<missing>"))]
    InvalidStatus(Option<String>),

    #[error("missing reply field")]
    MissingReply,
}

/// Typed outcome of normalizing one backend reply.
///
/// `commands` is always present (possibly empty) except on `Failure`.
/// `next_trigger_count` is already clamped into the trigger range; `None`
/// means the caller draws a random fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedReply {
    Success {
        reply_text: String,
        quoted_message_id: Option<String>,
        reply_target: Option<ConversationKey>,
        next_trigger_count: Option<i64>,
        commands: Vec<Command>,
    },
    Skip {
        raw_text: String,
        next_trigger_count: Option<i64>,
        commands: Vec<Command>,
    },
    FunctionCall {
        commands: Vec<Command>,
    },
    Failure {
        reason: FailureReason,
        raw_text: String,
    },
}

impl NormalizedReply {
    pub fn commands(&self) -> &[Command] {
        match self {
            NormalizedReply::Success { commands, .. }
            | NormalizedReply::Skip { commands, .. }
            | NormalizedReply::FunctionCall { commands } => commands,
            NormalizedReply::Failure { .. } => &[],
        }
    }

    pub fn next_trigger_count(&self) -> Option<i64> {
        match self {
            NormalizedReply::Success {
                next_trigger_count, ..
            }
            | NormalizedReply::Skip {
                next_trigger_count, ..
            } => *next_trigger_count,
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, NormalizedReply::Failure { .. })
    }

    /// Short label for logs and transcripts.
    pub fn status_label(&self) -> &'static str {
        match self {
            NormalizedReply::Success { .. } => "success",
            NormalizedReply::Skip { .. } => "skip",
            NormalizedReply::FunctionCall { .. } => "function",
            NormalizedReply::Failure { .. } => "failure",
        }
    }
}
