//! Relevance ranking: score normalization, keyword similarity gate and passage ranking

mod config;
mod jaccard;
mod normalize;
mod ranker;

pub use config::{RelevanceThresholds, DEFAULT_JACCARD_THRESHOLD, DEFAULT_RELATIVE_CUTOFF};
pub use jaccard::fuzzy_jaccard;
pub use normalize::normalize_by_top_score;
pub use ranker::{edit_similarity, PassageRanker};
