//! Retrieval store domain: index names, entries, results and the gateway trait

mod entity;
mod gateway;
mod validation;

pub use entity::{IndexEntry, IndexName, SearchHit, SearchResult};
pub use gateway::{merge_hybrid, RetrievalGateway, HYBRID_CANDIDATE_POOL};
pub use validation::{validate_index_name, IndexValidationError, MAX_INDEX_NAME_LENGTH};

#[cfg(test)]
pub use gateway::mock::MockRetrievalGateway;
