//! Content-hash deduplication

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ingestion::{content_hash, DedupStrategy, Deduplicator, Passage};
use crate::domain::knowledge_base::{IndexEntry, IndexName, RetrievalGateway};
use crate::domain::{DomainError, EmbeddingProvider};

/// Uses the SHA-256 of the normalized text as the entry id, so storing the
/// same text twice overwrites one entry
#[derive(Debug, Clone)]
pub struct HashDeduplicator {
    gateway: Arc<dyn RetrievalGateway>,
    index: IndexName,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
}

impl HashDeduplicator {
    pub fn new(gateway: Arc<dyn RetrievalGateway>, index: IndexName) -> Self {
        Self {
            gateway,
            index,
            embedder: None,
        }
    }

    /// Attach vectors to stored entries
    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    fn id_for(passage: &Passage) -> String {
        passage
            .hash
            .clone()
            .unwrap_or_else(|| content_hash(&passage.text))
    }
}

#[async_trait]
impl Deduplicator for HashDeduplicator {
    fn strategy(&self) -> DedupStrategy {
        DedupStrategy::Hash
    }

    async fn exists(&self, passage: &Passage) -> Result<bool, DomainError> {
        match self.gateway.get_entry(&self.index, &Self::id_for(passage)).await {
            Ok(entry) => Ok(entry.is_some()),
            Err(DomainError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn register(&self, passage: &Passage) -> Result<String, DomainError> {
        let id = Self::id_for(passage);
        let mut entry = IndexEntry::new(id.clone(), passage.text.clone())
            .with_metadata("source", serde_json::json!(passage.source));

        match (&passage.embedding, &self.embedder) {
            (Some(vector), _) => entry = entry.with_vector(vector.clone()),
            (None, Some(embedder)) => entry = entry.with_vector(embedder.embed_one(&passage.text).await?),
            (None, None) => {}
        }

        self.gateway.add_entry(&self.index, entry).await?;
        Ok(id)
    }
}
