//! Retrieval gateway trait

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::{IndexEntry, IndexName, SearchHit, SearchResult};
use crate::domain::error::DomainError;

/// Size of the candidate pool fetched per side before a hybrid merge
pub const HYBRID_CANDIDATE_POOL: usize = 20;

/// Full-text, vector and hybrid queries plus index maintenance
///
/// Querying a missing index is `NotFound`; a vector of the wrong
/// dimensionality is `Validation`; engine transport failures are `Retrieval`.
#[async_trait]
pub trait RetrievalGateway: Send + Sync + Debug {
    /// Get the backend name
    fn backend_name(&self) -> &'static str;

    /// Lexical search; `boost` is a required, up-weighted match when non-empty
    async fn full_text(
        &self,
        index: &IndexName,
        query: &str,
        boost: &str,
        limit: usize,
    ) -> Result<SearchResult, DomainError>;

    /// Nearest-neighbour search over `vector_embedding`
    async fn vector(
        &self,
        index: &IndexName,
        vector: &[f32],
        limit: usize,
    ) -> Result<SearchResult, DomainError>;

    /// Lexical and vector search merged by summed score
    async fn hybrid(
        &self,
        index: &IndexName,
        query: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<SearchResult, DomainError> {
        let pool = limit.max(HYBRID_CANDIDATE_POOL);
        let (lexical, semantic) = futures::try_join!(
            self.full_text(index, query, "", pool),
            self.vector(index, vector, pool),
        )?;

        Ok(merge_hybrid(lexical, semantic, limit))
    }

    /// Create an index; returns false when it already exists
    async fn create_index(
        &self,
        index: &IndexName,
        dimensions: Option<usize>,
    ) -> Result<bool, DomainError>;

    /// Delete an index; returns false when it did not exist
    async fn delete_index(&self, index: &IndexName) -> Result<bool, DomainError>;

    async fn index_exists(&self, index: &IndexName) -> Result<bool, DomainError>;

    /// Store an entry under its id, replacing any entry with the same id
    async fn add_entry(&self, index: &IndexName, entry: IndexEntry) -> Result<(), DomainError>;

    async fn get_entry(
        &self,
        index: &IndexName,
        id: &str,
    ) -> Result<Option<IndexEntry>, DomainError>;

    async fn delete_entry(&self, index: &IndexName, id: &str) -> Result<bool, DomainError>;

    /// List entries in insertion order, capped at `limit`
    async fn list_entries(
        &self,
        index: &IndexName,
        limit: usize,
    ) -> Result<Vec<IndexEntry>, DomainError>;
}

/// Merge lexical and vector hits by id, sum their scores, break ties by the
/// lexical score and truncate to `limit` after merging
pub fn merge_hybrid(lexical: SearchResult, semantic: SearchResult, limit: usize) -> SearchResult {
    let mut merged: HashMap<String, (SearchHit, f32)> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for hit in lexical.hits {
        let lexical_score = hit.score;
        order.push(hit.id.clone());
        merged.insert(hit.id.clone(), (hit, lexical_score));
    }

    for hit in semantic.hits {
        match merged.get_mut(&hit.id) {
            Some((existing, _)) => existing.score += hit.score,
            None => {
                order.push(hit.id.clone());
                merged.insert(hit.id.clone(), (hit, 0.0));
            }
        }
    }

    let mut hits: Vec<SearchHit> = order
        .into_iter()
        .filter_map(|id| merged.remove(&id))
        .map(|(hit, lexical_score)| hit.with_lexical_score(lexical_score))
        .collect();

    hits.sort_by(|a, b| {
        b.score.total_cmp(&a.score).then_with(|| {
            b.lexical_score
                .unwrap_or(0.0)
                .total_cmp(&a.lexical_score.unwrap_or(0.0))
        })
    });
    hits.truncate(limit);

    SearchResult::new(hits)
}
