//! Text canonicalization shared by keyword parsing, scoring and highlighting.
//!
//! Document text and keyword labels must go through the same `normalize` call
//! before any comparison, otherwise accents or casing silently break matches.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Lower-cases, strips diacritics (NFD then drop combining marks) and trims.
pub fn normalize(value: &str) -> String {
    value
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Splits already-normalized text on runs of non-alphanumeric characters.
pub fn tokenize(normalized: &str) -> impl Iterator<Item = &str> {
    normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_accents_and_case() {
        assert_eq!(normalize("  Gestion de PROJET Été "), "gestion de projet ete");
        assert_eq!(normalize("Développeur Čeština"), "developpeur cestina");
    }

    #[test]
    fn test_normalize_empty_and_whitespace() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t\n "), "");
    }

    #[test]
    fn test_tokenize_splits_on_punctuation_runs() {
        let tokens: Vec<&str> = tokenize("c++ / node.js, 5 ans--d'experience").collect();
        assert_eq!(tokens, vec!["c", "node", "js", "5", "ans", "d", "experience"]);
    }

    #[test]
    fn test_tokenize_empty_input() {
        assert_eq!(tokenize("").count(), 0);
        assert_eq!(tokenize("--- ...").count(), 0);
    }
}
