use std::sync::Arc;

use tracing::info;

use super::OpenAiEmbeddingProvider;
use crate::config::EmbeddingConfig;
use crate::domain::{DomainError, EmbeddingProvider};
use crate::infrastructure::http_client::HttpClient;

/// Factory for the optional embedding provider
#[derive(Debug)]
pub struct EmbeddingProviderFactory;

impl EmbeddingProviderFactory {
    /// `None` when embeddings are disabled
    pub fn create(config: &EmbeddingConfig) -> Result<Option<Arc<dyn EmbeddingProvider>>, DomainError> {
        if !config.enabled {
            return Ok(None);
        }

        if config.base_url.trim().is_empty() {
            return Err(DomainError::configuration("embedding.base_url cannot be empty"));
        }
        if config.dimensions == 0 {
            return Err(DomainError::configuration("embedding.dimensions must be greater than 0"));
        }

        info!(model = %config.model, dimensions = config.dimensions, "Embeddings enabled");
        Ok(Some(Arc::new(
            OpenAiEmbeddingProvider::with_base_url(
                HttpClient::new(),
                config.api_key.clone(),
                config.base_url.clone(),
            )
            .with_model(config.model.clone(), config.dimensions),
        )))
    }
}
