//! Duplicate detection for ingested passages

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::passage::Passage;
use crate::domain::DomainError;

/// Default cosine similarity above which two passages are the same fact
pub const DEFAULT_DUPLICATE_SIMILARITY: f32 = 0.99;

/// How duplicates are detected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupStrategy {
    /// SHA-256 of the normalized text is the entry id
    #[default]
    Hash,
    /// Nearest-neighbour search over stored vectors
    Similarity,
}

/// Decides whether a passage is already stored, and stores it
#[async_trait]
pub trait Deduplicator: Send + Sync + Debug {
    fn strategy(&self) -> DedupStrategy;

    /// Attach whatever `exists` and `register` both need, computed once
    async fn prepare(&self, passage: Passage) -> Result<Passage, DomainError> {
        Ok(passage)
    }

    async fn exists(&self, passage: &Passage) -> Result<bool, DomainError>;

    /// Store the passage and return its entry id
    async fn register(&self, passage: &Passage) -> Result<String, DomainError>;
}

/// Collapse whitespace runs and trim
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Hex SHA-256 of the normalized text
pub fn content_hash(text: &str) -> String {
    let digest = Sha256::digest(normalize_text(text).as_bytes());
    hex::encode(digest)
}
