//! Output Sequencer: reply text → ordered, paced outbound fragments.

use super::pacing::pacing_delay;
use super::placeholders::{PlaceholderResolver, quote_tag, resolve_placeholders};
use super::rules::ReplaceRules;
use super::scanner::{SequencingWarning, TagAwareSplitter};
use std::time::Duration;

/// One message to send, followed by `delay_after` before the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFragment {
    pub text: String,
    pub delay_after: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequencedOutput {
    pub fragments: Vec<OutboundFragment>,
    pub warnings: Vec<SequencingWarning>,
}

impl SequencedOutput {
    pub fn texts(&self) -> Vec<&str> {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct OutputSequencer {
    splitter: TagAwareSplitter,
    rules: ReplaceRules,
    chars_per_second: u32,
}

impl OutputSequencer {
    pub fn new(splitter: TagAwareSplitter, rules: ReplaceRules, chars_per_second: u32) -> Self {
        Self {
            splitter,
            rules,
            chars_per_second,
        }
    }

    pub fn chars_per_second(&self) -> u32 {
        self.chars_per_second
    }

    /// Resolve placeholders, split, apply replace rules and attach pacing.
    ///
    /// Fragments that become empty after the rules are dropped. The quote
    /// marker is prepended to the first surviving fragment. The last
    /// fragment never carries a delay.
    pub fn sequence(
        &self,
        reply_text: &str,
        quoted_message_id: Option<&str>,
        resolver: &dyn PlaceholderResolver,
    ) -> SequencedOutput {
        let resolved = resolve_placeholders(reply_text, resolver);
        let split = self.splitter.split(&resolved);

        let mut texts: Vec<String> = split
            .fragments
            .iter()
            .map(|fragment| self.rules.apply(fragment).trim().to_string())
            .filter(|fragment| !fragment.is_empty())
            .collect();

        if let Some(id) = quoted_message_id
            && let Some(first) = texts.first_mut()
        {
            first.insert_str(0, &quote_tag(id));
        }

        let last = texts.len().saturating_sub(1);
        let fragments = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                let delay_after = if i == last {
                    Duration::ZERO
                } else {
                    pacing_delay(&text, self.chars_per_second)
                };
                OutboundFragment { text, delay_after }
            })
            .collect();

        SequencedOutput {
            fragments,
            warnings: split.warnings,
        }
    }
}
