//! Embedding provider trait and vector helpers

mod provider;

pub use provider::{cosine_similarity, EmbeddingProvider};

#[cfg(test)]
pub use provider::mock::MockEmbeddingProvider;
