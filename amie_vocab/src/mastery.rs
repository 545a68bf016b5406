//! Parsing of free-text mastery ratings returned by the oracle.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::store::VocabStore;

/// What a rating pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingOutcome {
    /// Final score applied per word
    pub updated: BTreeMap<String, u32>,
    /// Words named on some line that carried no usable number; their mastery is unchanged
    pub malformed: Vec<String>,
    /// Words the rating text never mentioned
    pub unmentioned: Vec<String>,
}

impl RatingOutcome {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.malformed.is_empty() && self.unmentioned.is_empty()
    }
}

/// The first run of ASCII digits in `line`, if it fits a `u32`.
fn first_number(line: &str) -> Option<u32> {
    let start = line.find(|c: char| c.is_ascii_digit())?;
    let digits = &line[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

/// Write ratings from `rating_text` into `store` for the given session words.
///
/// Each line naming a word (plain substring match) rates it with the first
/// number on that line; later lines win. Lines without a number leave the word
/// alone. Scores outside 0-10 are applied as given and only logged.
pub fn apply_ratings<S>(
    store: &mut VocabStore,
    session_words: &[S],
    rating_text: &str,
) -> RatingOutcome
where
    S: AsRef<str>,
{
    let mut updated = BTreeMap::new();
    let mut mentioned = Vec::new();

    for line in rating_text.lines() {
        for word in session_words.iter().map(AsRef::as_ref) {
            if word.is_empty() || !line.contains(word) {
                continue;
            }
            if !mentioned.contains(&word) {
                mentioned.push(word);
            }
            if let Some(score) = first_number(line) {
                updated.insert(word.to_string(), score);
            } else {
                debug!("No score on rating line for '{word}': {line}");
            }
        }
    }

    for (word, &score) in &updated {
        if score > 10 {
            warn!("Rating {score} for '{word}' is outside 0-10");
        }
        if !store.set_mastery(word, score) {
            debug!("Rated word '{word}' is not in the store");
        }
    }

    let mut outcome = RatingOutcome {
        updated,
        ..RatingOutcome::default()
    };
    for word in session_words.iter().map(AsRef::as_ref) {
        if outcome.updated.contains_key(word) {
            continue;
        }
        if mentioned.contains(&word) {
            outcome.malformed.push(word.to_string());
        } else {
            outcome.unmentioned.push(word.to_string());
        }
    }
    outcome
}
