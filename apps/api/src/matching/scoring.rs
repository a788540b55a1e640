//! Match scoring: composite keyword score and sentence highlights per document.
//!
//! Algorithm (all comparisons on normalized text):
//! 1. token score  = Σ document frequency of every distinct descriptor token
//! 2. phrase score = Σ non-overlapping label occurrences × max(token count, 1)
//! 3. coverage     = share of descriptors found at least once
//! 4. composite    = 0.55·min(token/20, 1) + 0.25·min(phrase/8, 1) + 0.20·coverage
//!
//! Pure and synchronous: safe to recompute on every corpus or keyword change.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::matching::keywords::KeywordDescriptor;
use crate::matching::normalize::{normalize, tokenize};
use crate::models::Document;

const TOKEN_WEIGHT: f64 = 0.55;
const PHRASE_WEIGHT: f64 = 0.25;
const COVERAGE_WEIGHT: f64 = 0.20;

/// Calibration divisors. Not configurable.
const TOKEN_SATURATION: f64 = 20.0;
const PHRASE_SATURATION: f64 = 8.0;

const MAX_HIGHLIGHTS: usize = 3;

/// A descriptor found in the document, reported with its literal label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMatch {
    pub keyword: String,
    pub occurrences: usize,
}

/// Score of one document against the current descriptor list.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub document: Document,
    /// Raw composite in [0, 1]; the ranking key.
    pub score: f64,
    pub normalized_score: f64, // 0 – 100, 2 dp
    pub coverage: f64,         // 0 – 100, 2 dp
    pub matched_keywords: Vec<KeywordMatch>,
    pub highlighted_sentences: Vec<String>,
}

/// Scores a single document. Empty descriptors or empty text give a zero result.
pub fn score_document(document: &Document, descriptors: &[KeywordDescriptor]) -> MatchResult {
    let normalized_text = normalize(&document.text);

    let mut frequency: HashMap<&str, usize> = HashMap::new();
    for token in tokenize(&normalized_text) {
        *frequency.entry(token).or_insert(0) += 1;
    }

    let keyword_tokens: HashSet<&str> = descriptors
        .iter()
        .flat_map(|d| d.tokens.iter().map(String::as_str))
        .collect();
    let token_score: usize = keyword_tokens
        .iter()
        .filter_map(|token| frequency.get(token))
        .sum();

    let mut phrase_score = 0usize;
    let mut matched_keywords = Vec::new();
    for descriptor in descriptors {
        let occurrences = count_occurrences(&normalized_text, &descriptor.normalized);
        if occurrences == 0 {
            continue;
        }
        phrase_score += occurrences * descriptor.tokens.len().max(1);
        matched_keywords.push(KeywordMatch {
            keyword: descriptor.label.clone(),
            occurrences,
        });
    }

    let coverage = if descriptors.is_empty() {
        0.0
    } else {
        matched_keywords.len() as f64 / descriptors.len() as f64
    };

    let token_part = (token_score as f64 / TOKEN_SATURATION).clamp(0.0, 1.0);
    let phrase_part = (phrase_score as f64 / PHRASE_SATURATION).clamp(0.0, 1.0);
    let coverage_part = coverage.clamp(0.0, 1.0);
    let score = (TOKEN_WEIGHT * token_part
        + PHRASE_WEIGHT * phrase_part
        + COVERAGE_WEIGHT * coverage_part)
        .clamp(0.0, 1.0);

    MatchResult {
        document: document.clone(),
        score,
        normalized_score: round2(score * 100.0),
        coverage: round2(coverage_part * 100.0),
        matched_keywords,
        highlighted_sentences: pick_highlights(&document.text, descriptors),
    }
}

/// Non-overlapping occurrences of `needle` in `haystack`; an empty needle never matches.
fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// First sentences (original casing) that contain any descriptor.
fn pick_highlights(text: &str, descriptors: &[KeywordDescriptor]) -> Vec<String> {
    if descriptors.is_empty() {
        return vec![];
    }
    split_sentences(text)
        .into_iter()
        .filter(|sentence| {
            let normalized = normalize(sentence);
            descriptors
                .iter()
                .any(|d| normalized.contains(d.normalized.as_str()))
        })
        .take(MAX_HIGHLIGHTS)
        .map(str::to_string)
        .collect()
}

/// Splits on `.`/`!`/`?` followed by whitespace, or on newlines. Spans are trimmed
/// and empty ones dropped; terminal punctuation stays with its sentence.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        let end = if ch == '\n' {
            Some(idx)
        } else if matches!(ch, '.' | '!' | '?')
            && chars.peek().is_some_and(|(_, next)| next.is_whitespace())
        {
            Some(idx + ch.len_utf8())
        } else {
            None
        };

        if let Some(end) = end {
            push_span(&mut spans, &text[start..end]);
            while chars.peek().is_some_and(|(_, next)| next.is_whitespace()) {
                chars.next();
            }
            start = chars.peek().map_or(text.len(), |(i, _)| *i);
        }
    }
    push_span(&mut spans, &text[start..]);
    spans
}

fn push_span<'a>(spans: &mut Vec<&'a str>, span: &'a str) {
    let span = span.trim();
    if !span.is_empty() {
        spans.push(span);
    }
}
