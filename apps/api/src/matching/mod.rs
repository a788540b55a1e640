// Keyword matching engine: normalization, keyword parsing, scoring, ranking.
// No I/O here; everything is pure and recomputed on demand.

pub mod keywords;
pub mod normalize;
pub mod ranking;
pub mod scoring;

pub use keywords::{parse_keywords, KeywordDescriptor};
pub use ranking::rank_documents;
pub use scoring::{score_document, KeywordMatch, MatchResult};
