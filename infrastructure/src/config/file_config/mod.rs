//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate;
//! the `to_*` methods turn them into validated domain and application values.

mod backends;
mod dispatch;
mod emoji;
mod logging;
mod output;
mod prompt;
mod queue;

pub use backends::FileBackendConfig;
pub use dispatch::{FileDispatchConfig, FileReplyConfig};
pub use emoji::FileEmojiConfig;
pub use logging::FileLoggingConfig;
pub use output::{FileOutputConfig, FileReplaceRule};
pub use prompt::FilePromptConfig;
pub use queue::{FileQueueConfig, FileSlotConfig};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use turnstile_application::{QueueSettings, TurnParams};
use turnstile_domain::{
    BackendDescriptor, ConversationKey, DomainError, MessageFilter, MixedSlot, NormalizerOptions,
    OutputSequencer, PayloadBuilder, ReplaceRule, ReplaceRules, ReplyNormalizer, TagAwareSplitter,
    TriggerRange,
};

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: Severity,
    /// Dotted path of the offending field, e.g. `queue.slot_size`.
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Window, trigger and slot settings
    pub queue: FileQueueConfig,
    /// Normalizer compatibility settings
    pub reply: FileReplyConfig,
    /// Sequencing and pacing settings
    pub output: FileOutputConfig,
    /// System prompt and bot identity
    pub prompt: FilePromptConfig,
    /// Timeouts, attempts and sampling
    pub dispatch: FileDispatchConfig,
    /// Backend pool, in round-robin order
    pub backends: Vec<FileBackendConfig>,
    pub emoji: FileEmojiConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Errors make the configuration unusable; warnings only flag behavior
    /// the operator probably did not intend.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Queue bounds
        let queue = &self.queue;
        if queue.slot_size == 0 {
            issues.push(ConfigIssue::error(
                "queue.slot_size",
                DomainError::InvalidSlotSize.to_string(),
            ));
        }
        if let Err(e) = TriggerRange::new(queue.min_trigger_count, queue.max_trigger_count) {
            issues.push(ConfigIssue::error("queue.min_trigger_count", e.to_string()));
        }
        if !(0.0..=1.0).contains(&queue.at_react_possibility) {
            issues.push(ConfigIssue::error(
                "queue.at_react_possibility",
                DomainError::InvalidProbability(queue.at_react_possibility).to_string(),
            ));
        }
        if let Err(e) = self.slot_routing_check() {
            issues.push(ConfigIssue::error("queue.slots", e.to_string()));
        }

        // 2. Regex patterns
        if let Err(e) = Regex::new(&self.output.sentence_pattern) {
            issues.push(ConfigIssue::error(
                "output.sentence_pattern",
                DomainError::invalid_pattern(&self.output.sentence_pattern, &e).to_string(),
            ));
        }
        for (i, rule) in self.output.replace.iter().enumerate() {
            if let Err(e) = Regex::new(&rule.pattern) {
                issues.push(ConfigIssue::error(
                    format!("output.replace[{}].pattern", i),
                    DomainError::invalid_pattern(&rule.pattern, &e).to_string(),
                ));
            }
        }

        // 3. Dispatch
        if self.dispatch.attempts == 0 {
            issues.push(ConfigIssue::error(
                "dispatch.attempts",
                "attempts must be at least 1",
            ));
        }

        // 4. Backends
        for (i, backend) in self.backends.iter().enumerate() {
            if backend.model.trim().is_empty() {
                issues.push(ConfigIssue::error(
                    format!("backends[{}].model", i),
                    "model name cannot be empty",
                ));
            }
        }
        for (i, backend) in self.backends.iter().enumerate() {
            if backend.enabled
                && let Some(var) = backend.key_env()
                && backend.to_descriptor(i).api_key.is_none()
            {
                issues.push(ConfigIssue::warning(
                    format!("backends[{}].api_key", i),
                    format!("no API key configured and ${} is not set", var),
                ));
            }
        }
        if !self.backends.iter().any(|b| b.enabled) {
            issues.push(ConfigIssue::warning(
                "backends",
                "no enabled backends; every dispatch will fail",
            ));
        }

        issues
    }

    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(|i| i.severity == Severity::Error)
    }

    // ==================== Conversions ====================

    pub fn to_queue_settings(&self) -> Result<QueueSettings, DomainError> {
        let queue = &self.queue;
        let settings = QueueSettings::new(
            queue.slot_size,
            queue.min_trigger_count,
            queue.max_trigger_count,
        )?;
        Ok(settings
            .with_slots(self.mixed_slots(), queue.apply_to_all_matching)?
            .with_filter(MessageFilter::new(queue.filter.iter().cloned())))
    }

    pub fn to_turn_params(&self) -> Result<TurnParams, DomainError> {
        let p = self.queue.at_react_possibility;
        if !(0.0..=1.0).contains(&p) {
            return Err(DomainError::InvalidProbability(p));
        }
        let timeout = (self.dispatch.timeout_seconds > 0)
            .then(|| Duration::from_secs(self.dispatch.timeout_seconds));
        Ok(TurnParams {
            at_react_possibility: p,
            dispatch_timeout: timeout,
            dispatch_attempts: self.dispatch.attempts,
            temperature: self.dispatch.temperature,
            words_per_second: self.output.words_per_second,
            bot_id: self.prompt.bot_id.clone(),
            bot_name: self.prompt.bot_name.clone(),
        })
    }

    pub fn to_normalizer(&self) -> Result<ReplyNormalizer, DomainError> {
        Ok(ReplyNormalizer::new(NormalizerOptions {
            allow_error_format: self.reply.allow_error_format,
            trigger_range: TriggerRange::new(
                self.queue.min_trigger_count,
                self.queue.max_trigger_count,
            )?,
        }))
    }

    pub fn to_sequencer(&self) -> Result<OutputSequencer, DomainError> {
        let splitter = TagAwareSplitter::new(&self.output.sentence_pattern)?;
        let rules = self
            .output
            .replace
            .iter()
            .map(|r| ReplaceRule::new(&r.pattern, r.replacement.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(OutputSequencer::new(
            splitter,
            ReplaceRules::new(rules),
            self.output.words_per_second,
        ))
    }

    pub fn to_payload_builder(&self) -> std::io::Result<PayloadBuilder> {
        let builder = PayloadBuilder::new(self.prompt.load_system_prompt()?)
            .with_retained_images(self.prompt.retained_images);
        Ok(match &self.prompt.priming {
            Some(priming) => builder.with_priming(priming.clone()),
            None => builder,
        })
    }

    pub fn backend_descriptors(&self) -> Vec<BackendDescriptor> {
        self.backends
            .iter()
            .enumerate()
            .map(|(i, b)| b.to_descriptor(i))
            .collect()
    }

    fn mixed_slots(&self) -> Vec<MixedSlot> {
        self.queue
            .slots
            .iter()
            .map(|s| {
                MixedSlot::new(
                    s.name.clone(),
                    s.members.iter().map(|m| ConversationKey::new(m.as_str())).collect(),
                )
            })
            .collect()
    }

    fn slot_routing_check(&self) -> Result<(), DomainError> {
        turnstile_domain::SlotRouting::new(self.mixed_slots(), self.queue.apply_to_all_matching)
            .map(|_| ())
    }
}
