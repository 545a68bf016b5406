//! `[word]` markers the learner types to flag unknown vocabulary.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

static BRACKET_PATTERN: OnceLock<Regex> = OnceLock::new();

#[expect(
    clippy::expect_used,
    reason = "Static regex pattern validated at compile time"
)]
fn bracket_pattern() -> &'static Regex {
    BRACKET_PATTERN.get_or_init(|| {
        Regex::new(r"\[(.*?)\]").expect("Static regex pattern is guaranteed to be valid")
    })
}

/// Extract the bracketed words of `input`, trimmed, without blanks or repeats,
/// in order of first appearance.
#[must_use]
pub fn extract_bracket_flags(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut seen = HashSet::new();

    for cap in bracket_pattern().captures_iter(input) {
        if let Some(word) = cap.get(1) {
            let word = word.as_str().trim();
            if !word.is_empty() && seen.insert(word) {
                words.push(word.to_string());
            }
        }
    }

    words
}
