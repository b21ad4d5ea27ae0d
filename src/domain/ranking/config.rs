use serde::{Deserialize, Serialize};

use crate::domain::ingestion::DEFAULT_DUPLICATE_SIMILARITY;

pub const DEFAULT_RELATIVE_CUTOFF: f32 = 0.85;
pub const DEFAULT_JACCARD_THRESHOLD: f32 = 0.3;

/// Thresholds of the relevance gate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelevanceThresholds {
    /// Hits whose score divided by the top score is not above this are dropped
    #[serde(default = "default_relative_cutoff")]
    pub relative_cutoff: f32,

    /// Keyword similarity at or above which stored knowledge is used
    #[serde(default = "default_jaccard_threshold")]
    pub jaccard_threshold: f32,

    #[serde(default = "default_duplicate_similarity")]
    pub duplicate_similarity: f32,
}

fn default_relative_cutoff() -> f32 {
    DEFAULT_RELATIVE_CUTOFF
}

fn default_jaccard_threshold() -> f32 {
    DEFAULT_JACCARD_THRESHOLD
}

fn default_duplicate_similarity() -> f32 {
    DEFAULT_DUPLICATE_SIMILARITY
}

impl Default for RelevanceThresholds {
    fn default() -> Self {
        Self {
            relative_cutoff: default_relative_cutoff(),
            jaccard_threshold: default_jaccard_threshold(),
            duplicate_similarity: default_duplicate_similarity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let thresholds: RelevanceThresholds = serde_json::from_str("{}").unwrap();
        assert_eq!(thresholds, RelevanceThresholds::default());
        assert_eq!(thresholds.relative_cutoff, 0.85);
        assert_eq!(thresholds.jaccard_threshold, 0.3);
        assert_eq!(thresholds.duplicate_similarity, 0.99);
    }
}
