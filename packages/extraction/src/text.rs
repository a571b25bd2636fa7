//! Text normalization and the content validator.
//!
//! Every strategy's output goes through [`normalize`] before
//! [`ContentValidator::validate`] decides whether it is real article text.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Marker appended to text cut at the length ceiling.
pub const TRUNCATION_MARKER: &str = "...";

static RE_CONTROL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").expect("valid regex"));
static RE_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t\r]*\n){2,}").expect("valid regex"));
static RE_HORIZONTAL_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{00A0}]+").expect("valid regex"));

/// High-frequency function words (English and Portuguese). Running text is
/// full of them; navigation menus and link farms are not.
const FUNCTION_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "of", "to", "in", "on", "at", "for", "with", "by",
    "from", "as", "is", "are", "was", "were", "be", "been", "it", "its", "this", "that", "these",
    "those", "which", "who", "not", "has", "have", "had", "will", "can", "o", "os", "de",
    "da", "do", "das", "dos", "e", "em", "um", "uma", "com", "não", "para", "que", "se", "no",
    "na", "por",
];

static FUNCTION_WORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| FUNCTION_WORDS.iter().copied().collect());

/// Normalize extracted text.
///
/// Strips control characters, collapses runs of three or more newlines to a
/// blank line, collapses horizontal whitespace to one space, trims, and cuts
/// the result so that it never exceeds `max_chars` characters including the
/// truncation marker.
pub fn normalize(content: &str, max_chars: usize) -> String {
    let text = RE_CONTROL.replace_all(content, "");
    let text = RE_BLANK_LINES.replace_all(&text, "\n\n");
    let text = RE_HORIZONTAL_WS.replace_all(&text, " ");
    let text = text.trim();

    truncate_chars(text, max_chars)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(TRUNCATION_MARKER.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

/// Cut text to at most `max_chars` characters without any marker.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Why a candidate text was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("content too short: {chars} < {min} characters")]
    TooShort { chars: usize, min: usize },

    #[error("too few words: {words} < {min}")]
    TooFewWords { words: usize, min: usize },

    #[error("function-word ratio {ratio:.3} below {min:.3} (likely navigation or boilerplate)")]
    LowFunctionWordRatio { ratio: f64, min: f64 },
}

/// Measurements of an accepted text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub char_count: usize,
    pub word_count: usize,
    pub function_word_ratio: f64,
}

/// Accept/reject gate for extracted text.
#[derive(Debug, Clone)]
pub struct ContentValidator {
    pub min_chars: usize,
    pub min_words: usize,
    pub min_function_word_ratio: f64,
}

impl Default for ContentValidator {
    fn default() -> Self {
        Self {
            min_chars: 500,
            min_words: 50,
            min_function_word_ratio: 0.10,
        }
    }
}

impl ContentValidator {
    /// Check a normalized text, returning its metrics when accepted.
    pub fn validate(&self, text: &str) -> Result<TextMetrics, Rejection> {
        let char_count = text.chars().count();
        if char_count < self.min_chars {
            return Err(Rejection::TooShort {
                chars: char_count,
                min: self.min_chars,
            });
        }

        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() < self.min_words {
            return Err(Rejection::TooFewWords {
                words: words.len(),
                min: self.min_words,
            });
        }

        let ratio = function_word_ratio(&words);
        if ratio < self.min_function_word_ratio {
            return Err(Rejection::LowFunctionWordRatio {
                ratio,
                min: self.min_function_word_ratio,
            });
        }

        Ok(TextMetrics {
            char_count,
            word_count: words.len(),
            function_word_ratio: ratio,
        })
    }
}

fn is_function_word(word: &str) -> bool {
    let token = word
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    FUNCTION_WORD_SET.contains(token.as_str())
}

fn function_word_ratio(words: &[&str]) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    let hits = words.iter().filter(|w| is_function_word(w)).count();
    hits as f64 / words.len() as f64
}

/// Number of function words in a text.
pub(crate) fn function_word_hits(text: &str) -> usize {
    text.split_whitespace().filter(|w| is_function_word(w)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn prose(words: usize) -> String {
        let sentence = "The market for fitness apps is growing because people want to train at home and track their progress. ";
        sentence.repeat(words / 18 + 1)
    }

    #[test]
    fn collapses_blank_lines_and_spaces() {
        let out = normalize("Title\n\n\n\n\nBody   text\t\there\n \n \nEnd", 1000);
        assert_eq!(out, "Title\n\nBody text here\n\nEnd");
    }

    #[test]
    fn function_words_are_listed_once() {
        assert_eq!(FUNCTION_WORD_SET.len(), FUNCTION_WORDS.len());
    }

    #[test]
    fn keeps_single_blank_line() {
        assert_eq!(normalize("a\n\nb", 100), "a\n\nb");
    }

    #[test]
    fn strips_control_characters() {
        assert_eq!(normalize("  he\u{0}llo\u{7f} \u{1b}world  ", 100), "hello world");
    }

    #[test]
    fn truncates_with_marker_within_ceiling() {
        let long = "x".repeat(60_000);
        let out = normalize(&long, 50_000);
        assert_eq!(out.chars().count(), 50_000);
        assert!(out.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let long = "é".repeat(20);
        let out = normalize(&long, 10);
        assert_eq!(out.chars().count(), 10);
    }

    #[test]
    fn excerpt_cuts_on_char_boundary() {
        assert_eq!(excerpt("ação rápida", 4), "ação");
        assert_eq!(excerpt("short", 100), "short");
    }

    #[test]
    fn validator_accepts_prose() {
        let text = prose(120);
        let metrics = ContentValidator::default().validate(&text).unwrap();
        assert!(metrics.char_count >= 500);
        assert!(metrics.word_count >= 50);
        assert!(metrics.function_word_ratio >= 0.10);
    }

    #[test]
    fn validator_rejects_short_text() {
        let err = ContentValidator::default().validate("too short").unwrap_err();
        assert!(matches!(err, Rejection::TooShort { chars: 9, .. }));
    }

    #[test]
    fn validator_rejects_few_long_words() {
        let text = format!("{} {}", "a".repeat(300), "b".repeat(300));
        let err = ContentValidator::default().validate(&text).unwrap_err();
        assert!(matches!(err, Rejection::TooFewWords { words: 2, .. }));
    }

    #[test]
    fn validator_rejects_navigation_text() {
        let nav = "Home About Pricing Login Signup Blog Careers Contact Support Docs ".repeat(20);
        let err = ContentValidator::default().validate(&nav).unwrap_err();
        assert!(matches!(err, Rejection::LowFunctionWordRatio { .. }));
    }

    #[test]
    fn function_words_ignore_punctuation_and_case() {
        assert_eq!(function_word_ratio(&["The,", "AND", "market"]), 2.0 / 3.0);
    }

    proptest! {
        #[test]
        fn normalized_text_respects_bounds(input in "[a-z \\n\\t\\x00-\\x1f]{0,400}", max in 10usize..200) {
            let out = normalize(&input, max);
            prop_assert!(out.chars().count() <= max);
            prop_assert!(!out.contains("\n\n\n"));
            prop_assert!(!out.contains("  "));
            prop_assert!(!out.chars().any(|c| c.is_control() && c != '\n' && c != '\r'));
            prop_assert_eq!(out.trim(), out.as_str());
        }
    }
}
