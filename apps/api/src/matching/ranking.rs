use crate::matching::keywords::KeywordDescriptor;
use crate::matching::scoring::{score_document, MatchResult};
use crate::models::Document;

/// Scores every document and returns them best first.
pub fn rank_documents(documents: &[Document], descriptors: &[KeywordDescriptor]) -> Vec<MatchResult> {
    let mut results: Vec<MatchResult> = documents
        .iter()
        .map(|doc| score_document(doc, descriptors))
        .collect();
    sort_by_score(&mut results);
    results
}

/// Descending by composite score. `sort_by` is stable, so ties keep input order.
pub fn sort_by_score(results: &mut [MatchResult]) {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
