//! Tag-aware sentence splitter.
//!
//! A small deterministic state machine:
//!
//! ```text
//! ScanningText --'<'--> ReadingTag
//! ReadingTag   --'>'--> classify tag, back to ScanningText
//!     self-closing  -> one fragment (when not inside a span)
//!     open tag      -> push on the stack
//!     close tag     -> pop to the matching open; an emptied stack emits the whole span
//! ```
//!
//! Plain text between tags is split on the sentence-boundary pattern, with
//! the punctuation kept on the preceding sentence. A tag span is never
//! split. Malformed input fails open: the unconsumed remainder is split as
//! plain text and a [`SequencingWarning`] is recorded.

use crate::core::error::DomainError;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Default sentence boundary: CJK and ASCII sentence punctuation, tildes,
/// ellipses and newlines.
pub const DEFAULT_SENTENCE_PATTERN: &str = r"[。！？!?；;~～…\n]+";

static DEFAULT_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(DEFAULT_SENTENCE_PATTERN).expect("default sentence pattern is valid")
});

/// Non-fatal problems found while scanning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequencingWarning {
    #[error("unterminated tag starting at byte {offset}")]
    UnterminatedTag { offset: usize },

    #[error("closing tag </{name}> has no matching open tag")]
    UnmatchedClose { name: String },

    #[error("tag <{name}> is never closed")]
    UnclosedTag { name: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitOutcome {
    pub fragments: Vec<String>,
    pub warnings: Vec<SequencingWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    ScanningText,
    /// Inside `<...`; `quote` is set while inside a quoted attribute value.
    ReadingTag { start: usize, quote: Option<char> },
}

#[derive(Debug, PartialEq, Eq)]
enum TagKind<'a> {
    SelfClosing,
    Open(&'a str),
    Close(&'a str),
    NotATag,
}

#[derive(Debug, Clone)]
pub struct TagAwareSplitter {
    boundary: Regex,
}

impl Default for TagAwareSplitter {
    fn default() -> Self {
        Self {
            boundary: DEFAULT_BOUNDARY.clone(),
        }
    }
}

impl TagAwareSplitter {
    pub fn new(sentence_pattern: &str) -> Result<Self, DomainError> {
        let boundary = Regex::new(sentence_pattern)
            .map_err(|e| DomainError::invalid_pattern(sentence_pattern, &e))?;
        Ok(Self { boundary })
    }

    pub fn split(&self, text: &str) -> SplitOutcome {
        let mut outcome = SplitOutcome::default();
        let mut stack: Vec<&str> = Vec::new();
        let mut text_start = 0;
        let mut state = ScanState::ScanningText;

        for (i, c) in text.char_indices() {
            state = match state {
                ScanState::ScanningText if c == '<' => ScanState::ReadingTag {
                    start: i,
                    quote: None,
                },
                ScanState::ScanningText => ScanState::ScanningText,
                ScanState::ReadingTag {
                    start,
                    quote: Some(q),
                } => ScanState::ReadingTag {
                    start,
                    quote: (c != q).then_some(q),
                },
                ScanState::ReadingTag { start, quote: None } => match c {
                    '"' | '\'' if opens_attribute_value(&text[start + 1..i]) => {
                        ScanState::ReadingTag {
                            start,
                            quote: Some(c),
                        }
                    }
                    // The earlier '<' was literal text.
                    '<' => ScanState::ReadingTag {
                        start: i,
                        quote: None,
                    },
                    '>' => {
                        let end = i + 1;
                        let tag = &text[start..end];
                        match classify(tag) {
                            TagKind::NotATag => {}
                            TagKind::SelfClosing => {
                                if stack.is_empty() {
                                    self.push_sentences(&text[text_start..start], &mut outcome);
                                    outcome.fragments.push(tag.to_string());
                                    text_start = end;
                                }
                            }
                            TagKind::Open(name) => {
                                if stack.is_empty() {
                                    self.push_sentences(&text[text_start..start], &mut outcome);
                                    text_start = start;
                                }
                                stack.push(name);
                            }
                            TagKind::Close(name) => {
                                match stack.iter().rposition(|open| *open == name) {
                                    Some(pos) => {
                                        stack.truncate(pos);
                                        if stack.is_empty() {
                                            push_trimmed(&text[text_start..end], &mut outcome);
                                            text_start = end;
                                        }
                                    }
                                    None => outcome.warnings.push(
                                        SequencingWarning::UnmatchedClose {
                                            name: name.to_string(),
                                        },
                                    ),
                                }
                            }
                        }
                        ScanState::ScanningText
                    }
                    _ => ScanState::ReadingTag { start, quote: None },
                },
            };
        }

        if let ScanState::ReadingTag { start, .. } = state {
            outcome
                .warnings
                .push(SequencingWarning::UnterminatedTag { offset: start });
        }
        if let Some(name) = stack.first() {
            outcome.warnings.push(SequencingWarning::UnclosedTag {
                name: name.to_string(),
            });
        }
        self.push_sentences(&text[text_start..], &mut outcome);
        outcome
    }

    fn push_sentences(&self, text: &str, outcome: &mut SplitOutcome) {
        let mut last = 0;
        for m in self.boundary.find_iter(text) {
            push_trimmed(&text[last..m.end()], outcome);
            last = m.end();
        }
        push_trimmed(&text[last..], outcome);
    }
}

fn push_trimmed(text: &str, outcome: &mut SplitOutcome) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        outcome.fragments.push(trimmed.to_string());
    }
}

/// `tag` includes the surrounding `<` and `>`.
fn classify(tag: &str) -> TagKind<'_> {
    let inner = tag[1..tag.len() - 1].trim();

    if let Some(rest) = inner.strip_prefix('/') {
        let name = rest.trim();
        return if is_tag_name(name) {
            TagKind::Close(name)
        } else {
            TagKind::NotATag
        };
    }

    let (body, self_closing) = match inner.strip_suffix('/') {
        Some(body) => (body, true),
        None => (inner, false),
    };
    let name = body.split_whitespace().next().unwrap_or("");
    match (is_tag_name(name), self_closing) {
        (false, _) => TagKind::NotATag,
        (true, true) => TagKind::SelfClosing,
        (true, false) => TagKind::Open(name),
    }
}

/// A quote opens an attribute value only after `name ... =`.
fn opens_attribute_value(read: &str) -> bool {
    let name = read
        .split(|c: char| c.is_whitespace() || c == '=')
        .next()
        .unwrap_or("");
    is_tag_name(name) && read.trim_end().ends_with('=')
}

fn is_tag_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str) -> SplitOutcome {
        TagAwareSplitter::default().split(text)
    }

    #[test]
    fn tag_is_never_split_from_its_span() {
        let outcome = split(r#"<at id="1"/>你好。再见！"#);
        assert_eq!(outcome.fragments, vec![r#"<at id="1"/>"#, "你好。", "再见！"]);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn paired_tag_span_is_one_fragment() {
        let outcome = split("前面。<quote>里面。还有！</quote>后面");
        assert_eq!(
            outcome.fragments,
            vec!["前面。", "<quote>里面。还有！</quote>", "后面"]
        );
    }

    #[test]
    fn nested_spans_close_at_outermost() {
        let outcome = split("<a><b>x。</b>y。</a>z");
        assert_eq!(outcome.fragments, vec!["<a><b>x。</b>y。</a>", "z"]);
    }

    #[test]
    fn self_closing_inside_span_stays_inside() {
        let outcome = split(r#"<quote>hi <at id="2"/> there</quote>"#);
        assert_eq!(outcome.fragments, vec![r#"<quote>hi <at id="2"/> there</quote>"#]);
    }

    #[test]
    fn quoted_attribute_may_contain_angle_bracket() {
        let outcome = split(r#"<img src="a>b.png"/>ok"#);
        assert_eq!(outcome.fragments, vec![r#"<img src="a>b.png"/>"#, "ok"]);
    }

    #[test]
    fn ascii_punctuation_and_newlines_split() {
        let outcome = split("Hello there! How are you?\nFine");
        assert_eq!(outcome.fragments, vec!["Hello there!", "How are you?", "Fine"]);
    }

    #[test]
    fn punctuation_runs_stay_together() {
        let outcome = split("真的吗？！好吧……");
        assert_eq!(outcome.fragments, vec!["真的吗？！", "好吧……"]);
    }

    #[test]
    fn comparison_is_not_a_tag() {
        let outcome = split("1 < 2 and 3 > 2. ok");
        assert_eq!(outcome.fragments, vec!["1 < 2 and 3 > 2. ok"]);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn apostrophe_after_literal_angle_bracket_does_not_swallow_tags() {
        let outcome = split("1 < 2 isn't news。<quote>一。二。</quote>");
        assert_eq!(
            outcome.fragments,
            vec!["1 < 2 isn't news。", "<quote>一。二。</quote>"]
        );
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn quote_outside_attribute_value_is_literal() {
        let outcome = split(r#"<b class='x' title="it's">ok。</b>"#);
        assert_eq!(outcome.fragments, vec![r#"<b class='x' title="it's">ok。</b>"#]);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn unterminated_tag_fails_open() {
        let outcome = split("前面。<at id=\"1\" 后面！");
        assert_eq!(outcome.fragments, vec!["前面。", "<at id=\"1\" 后面！"]);
        assert_eq!(
            outcome.warnings,
            vec![SequencingWarning::UnterminatedTag { offset: 9 }]
        );
    }

    #[test]
    fn unclosed_span_fails_open_as_plain_text() {
        let outcome = split("<quote>一。二。");
        assert_eq!(outcome.fragments, vec!["<quote>一。", "二。"]);
        assert_eq!(
            outcome.warnings,
            vec![SequencingWarning::UnclosedTag {
                name: "quote".into()
            }]
        );
    }

    #[test]
    fn unmatched_close_is_plain_text() {
        let outcome = split("hi</b> there");
        assert_eq!(outcome.fragments, vec!["hi</b> there"]);
        assert_eq!(
            outcome.warnings,
            vec![SequencingWarning::UnmatchedClose { name: "b".into() }]
        );
    }

    #[test]
    fn empty_fragments_are_dropped() {
        let outcome = split("  。\n\n  ");
        assert_eq!(outcome.fragments, vec!["。"]);
        assert!(split("   ").fragments.is_empty());
    }

    #[test]
    fn custom_pattern() {
        let splitter = TagAwareSplitter::new(r"[,]").unwrap();
        assert_eq!(splitter.split("a,b").fragments, vec!["a,", "b"]);
        assert!(TagAwareSplitter::new("[").is_err());
    }
}
