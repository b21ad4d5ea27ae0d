//! Retrieval gateway factory

use std::sync::Arc;

use tracing::info;

use super::{ElasticsearchGateway, InMemoryRetrievalGateway};
use crate::config::{KnowledgeBackend, KnowledgeConfig};
use crate::domain::{DomainError, RetrievalGateway, Tokenizer};
use crate::infrastructure::http_client::HttpClient;

/// Factory for creating retrieval gateways
#[derive(Debug)]
pub struct RetrievalGatewayFactory;

impl RetrievalGatewayFactory {
    /// Create the configured gateway; the in-memory one shares `tokenizer`
    pub fn create(
        config: &KnowledgeConfig,
        tokenizer: Tokenizer,
    ) -> Result<Arc<dyn RetrievalGateway>, DomainError> {
        match config.backend {
            KnowledgeBackend::Memory => {
                info!("Using in-memory retrieval gateway");
                Ok(Arc::new(InMemoryRetrievalGateway::with_tokenizer(tokenizer)))
            }
            KnowledgeBackend::Elasticsearch => {
                if config.url.trim().is_empty() {
                    return Err(DomainError::configuration(
                        "knowledge.url is required for the elasticsearch backend",
                    ));
                }
                info!(url = %config.url, "Using Elasticsearch retrieval gateway");
                Ok(Arc::new(ElasticsearchGateway::new(HttpClient::new(), config.url.clone())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backend_is_memory() {
        let gateway =
            RetrievalGatewayFactory::create(&KnowledgeConfig::default(), Tokenizer::default()).unwrap();
        assert_eq!(gateway.backend_name(), "memory");
    }

    #[test]
    fn test_elasticsearch_requires_url() {
        let config = KnowledgeConfig {
            backend: KnowledgeBackend::Elasticsearch,
            url: String::new(),
            ..KnowledgeConfig::default()
        };
        assert!(RetrievalGatewayFactory::create(&config, Tokenizer::default()).is_err());

        let config = KnowledgeConfig {
            backend: KnowledgeBackend::Elasticsearch,
            url: "http://localhost:9200".to_string(),
            ..KnowledgeConfig::default()
        };
        let gateway = RetrievalGatewayFactory::create(&config, Tokenizer::default()).unwrap();
        assert_eq!(gateway.backend_name(), "elasticsearch");
    }
}
