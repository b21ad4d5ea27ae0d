//! Near-duplicate detection by vector similarity

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ingestion::{DedupStrategy, Deduplicator, Passage, DEFAULT_DUPLICATE_SIMILARITY};
use crate::domain::knowledge_base::{IndexEntry, IndexName, RetrievalGateway};
use crate::domain::{DomainError, EmbeddingProvider};

/// Treats a passage as stored when its nearest neighbour scores above the threshold
///
/// Two concurrent registrations of the same text can both pass `exists`.
#[derive(Debug, Clone)]
pub struct SimilarityDeduplicator {
    gateway: Arc<dyn RetrievalGateway>,
    index: IndexName,
    embedder: Arc<dyn EmbeddingProvider>,
    threshold: f32,
}

impl SimilarityDeduplicator {
    pub fn new(
        gateway: Arc<dyn RetrievalGateway>,
        index: IndexName,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            gateway,
            index,
            embedder,
            threshold: DEFAULT_DUPLICATE_SIMILARITY,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    async fn vector_for(&self, passage: &Passage) -> Result<Vec<f32>, DomainError> {
        match &passage.embedding {
            Some(vector) => Ok(vector.clone()),
            None => self.embedder.embed_one(&passage.text).await,
        }
    }
}

#[async_trait]
impl Deduplicator for SimilarityDeduplicator {
    fn strategy(&self) -> DedupStrategy {
        DedupStrategy::Similarity
    }

    async fn prepare(&self, passage: Passage) -> Result<Passage, DomainError> {
        if passage.embedding.is_some() {
            return Ok(passage);
        }
        let vector = self.embedder.embed_one(&passage.text).await?;
        Ok(passage.with_embedding(vector))
    }

    async fn exists(&self, passage: &Passage) -> Result<bool, DomainError> {
        let vector = self.vector_for(passage).await?;

        let nearest = match self.gateway.vector(&self.index, &vector, 1).await {
            Ok(result) => result,
            Err(DomainError::NotFound { .. }) => return Ok(false),
            Err(e) => return Err(e),
        };

        let top = nearest.top_score().unwrap_or(0.0);
        debug!(top, threshold = self.threshold, "Nearest stored passage");
        Ok(top > self.threshold)
    }

    async fn register(&self, passage: &Passage) -> Result<String, DomainError> {
        let vector = self.vector_for(passage).await?;
        let id = Uuid::new_v4().to_string();

        let entry = IndexEntry::new(id.clone(), passage.text.clone())
            .with_vector(vector)
            .with_metadata("source", serde_json::json!(passage.source));

        self.gateway.add_entry(&self.index, entry).await?;
        Ok(id)
    }
}
