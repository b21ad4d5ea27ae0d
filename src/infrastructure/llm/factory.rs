use std::sync::Arc;

use tracing::warn;

use super::OpenAiCompatibleProvider;
use crate::config::LlmConfig;
use crate::domain::{CompletionClient, DomainError, LlmProvider};
use crate::infrastructure::http_client::HttpClient;

/// Factory for creating LLM providers
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create a provider from configuration
    pub fn create(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, DomainError> {
        if config.base_url.trim().is_empty() {
            return Err(DomainError::configuration("llm.base_url cannot be empty"));
        }

        if config.api_key.is_empty() {
            warn!(base_url = %config.base_url, "No LLM API key configured");
        }

        Ok(Arc::new(OpenAiCompatibleProvider::with_base_url(
            HttpClient::new(),
            config.api_key.clone(),
            config.base_url.clone(),
        )))
    }

    /// Create a completion client with the configured model and temperature
    pub fn completion_client(config: &LlmConfig) -> Result<CompletionClient, DomainError> {
        let provider = Self::create(config)?;
        Ok(CompletionClient::new(provider, config.model.clone()).with_temperature(config.temperature))
    }
}
