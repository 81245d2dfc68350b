//! Ordered regex post-processing rules applied to each fragment.

use crate::core::error::DomainError;
use regex::Regex;

#[derive(Debug, Clone)]
pub struct ReplaceRule {
    pattern: Regex,
    replacement: String,
}

impl ReplaceRule {
    /// `replacement` may reference capture groups (`$1`, `${name}`).
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, DomainError> {
        let compiled = Regex::new(pattern).map_err(|e| DomainError::invalid_pattern(pattern, &e))?;
        Ok(Self {
            pattern: compiled,
            replacement: replacement.into(),
        })
    }

    pub fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, self.replacement.as_str())
            .into_owned()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReplaceRules {
    rules: Vec<ReplaceRule>,
}

impl ReplaceRules {
    pub fn new(rules: Vec<ReplaceRule>) -> Self {
        Self { rules }
    }

    /// Apply every rule in configured order.
    pub fn apply(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |acc, rule| rule.apply(&acc))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
