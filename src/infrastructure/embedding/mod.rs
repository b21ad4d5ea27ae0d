//! Embedding provider implementations

mod factory;
mod openai;

pub use factory::EmbeddingProviderFactory;
pub use openai::{OpenAiEmbeddingProvider, DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_EMBEDDING_MODEL};
