//! Keyword Parser: turns the free-text criteria box into deduplicated descriptors.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::matching::normalize::{normalize, tokenize};

/// Functional words (French and English) never used as scoring tokens.
/// Entries are stored normalized, so "être" appears as "etre".
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "les", "des", "une", "dans", "sur", "par", "aux", "vos", "notre",
    "vous", "nous", "this", "that", "from", "avec", "pour", "est", "sont", "entre", "chez", "afin",
    "etre", "avoir",
];

/// A parsed keyword. Identity is `normalized`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordDescriptor {
    /// As typed by the user, first occurrence wins.
    pub label: String,
    pub normalized: String,
    /// Scoring tokens in first-seen order, no duplicates.
    pub tokens: Vec<String>,
}

/// Splits on newline, comma or semicolon and collapses case/accent variants.
///
/// Never fails: blank input gives an empty list.
pub fn parse_keywords(input: &str) -> Vec<KeywordDescriptor> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut descriptors = Vec::new();

    for segment in input.split(['\n', ',', ';']) {
        let label = segment.trim();
        if label.is_empty() {
            continue;
        }
        let normalized = normalize(label);
        if normalized.is_empty() || !seen.insert(normalized.clone()) {
            continue;
        }

        let mut tokens: Vec<String> = Vec::new();
        for token in tokenize(&normalized) {
            if token.chars().count() <= 1 || STOP_WORDS.contains(&token) {
                continue;
            }
            if !tokens.iter().any(|t| t == token) {
                tokens.push(token.to_string());
            }
        }

        descriptors.push(KeywordDescriptor {
            label: label.to_string(),
            normalized,
            tokens,
        });
    }

    descriptors
}
