//! Lorebot
//!
//! Knowledge retrieval and answer orchestration for a conversational agent:
//! - Paragraph segmentation, deduplication and ingestion into an index engine
//! - Keyword extraction and relevance ranking of retrieved passages
//! - Deep and shallow answering flows driven by JSON-contract LLM prompts
//! - Chat event handling over OneBot and an HTTP API

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use api::state::AppState;
use domain::{
    DedupStrategy, Deduplicator, DomainError, EmbeddingProvider, IndexName, RetrievalGateway,
    Tokenizer, WebAcquisition,
};
use infrastructure::{
    chat::{ChatHandler, OneBotTransport},
    embedding::EmbeddingProviderFactory,
    http_client::HttpClient,
    ingestion::{HashDeduplicator, KnowledgeIngestor, SimilarityDeduplicator},
    knowledge_base::RetrievalGatewayFactory,
    llm::LlmProviderFactory,
    web::HttpBrowser,
    workflow::WorkflowOrchestrator,
};

/// Page loads slower than this count as acquisition failures
const WEB_TIMEOUT: Duration = Duration::from_secs(30);

/// Create the application state from configuration
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    // One dictionary for extraction, ranking and in-memory search
    let tokenizer = Tokenizer::default();

    let index = IndexName::new(config.knowledge.index.clone())
        .map_err(|e| anyhow::anyhow!("Invalid knowledge.index: {}", e))?;
    let gateway = RetrievalGatewayFactory::create(&config.knowledge, tokenizer.clone())?;
    let embedder = EmbeddingProviderFactory::create(&config.embedding)?;

    ensure_index(gateway.as_ref(), &index, embedder.as_deref()).await;

    let deduplicator = create_deduplicator(config, gateway.clone(), &index, embedder.clone())?;
    let ingestor = KnowledgeIngestor::new(deduplicator).with_segmenter(config.knowledge.segmenter()?);

    let web: Arc<dyn WebAcquisition> = Arc::new(HttpBrowser::new(
        HttpClient::with_timeout(WEB_TIMEOUT)?,
        &config.web,
    )?);

    let llm = LlmProviderFactory::completion_client(&config.llm)?;
    info!(model = %llm.model(), index = %index, "Answering with LLM");

    let orchestrator = Arc::new(
        WorkflowOrchestrator::new(llm, gateway.clone(), web.clone(), ingestor.clone(), index)
            .with_tokenizer(tokenizer)
            .with_config(config.relevance.clone()),
    );

    let mut state = AppState::new(orchestrator.clone(), gateway, Arc::new(ingestor), web)
        .with_directories(&config.knowledge.inbox_dir, &config.knowledge.processed_dir);

    if let Some(embedder) = embedder {
        state = state.with_embedder(embedder);
    }

    if config.chat.bot_id.trim().is_empty() {
        info!("No chat bot id configured; chat surface disabled");
    } else {
        let transport = OneBotTransport::new(HttpClient::new(), config.chat.base_url.clone())
            .with_access_token(&config.chat.access_token);
        let handler = ChatHandler::new(Arc::new(transport), orchestrator, config.chat.clone());
        info!(bot_id = %config.chat.bot_id, flow = ?config.chat.flow, "Chat surface enabled");
        state = state.with_chat(Arc::new(handler));
    }

    Ok(state)
}

fn create_deduplicator(
    config: &AppConfig,
    gateway: Arc<dyn RetrievalGateway>,
    index: &IndexName,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
) -> Result<Arc<dyn Deduplicator>, DomainError> {
    match (config.knowledge.dedup, embedder) {
        (DedupStrategy::Hash, None) => Ok(Arc::new(HashDeduplicator::new(gateway, index.clone()))),
        (DedupStrategy::Hash, Some(embedder)) => Ok(Arc::new(
            HashDeduplicator::new(gateway, index.clone()).with_embedder(embedder),
        )),
        (DedupStrategy::Similarity, Some(embedder)) => Ok(Arc::new(
            SimilarityDeduplicator::new(gateway, index.clone(), embedder)
                .with_threshold(config.relevance.thresholds.duplicate_similarity),
        )),
        (DedupStrategy::Similarity, None) => Err(DomainError::configuration(
            "knowledge.dedup = \"similarity\" requires embedding.enabled",
        )),
    }
}

/// Create the knowledge index up front so vector mappings get the right
/// dimensionality; an unreachable engine is reported but not fatal
async fn ensure_index(
    gateway: &dyn RetrievalGateway,
    index: &IndexName,
    embedder: Option<&dyn EmbeddingProvider>,
) {
    let dimensions = embedder.map(|e| e.dimensions());

    match gateway.create_index(index, dimensions).await {
        Ok(true) => info!(index = %index, ?dimensions, "Knowledge index created"),
        Ok(false) => info!(index = %index, "Knowledge index ready"),
        Err(e) => warn!(index = %index, error = %e, "Could not ensure knowledge index"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChatConfig, EmbeddingConfig, KnowledgeConfig};

    #[tokio::test]
    async fn test_default_state_uses_memory_backend_without_chat() {
        let state = create_app_state(&AppConfig::default()).await.unwrap();

        assert_eq!(state.gateway.backend_name(), "memory");
        assert_eq!(state.knowledge_index().as_str(), "knowledge_library");
        assert!(state.gateway.index_exists(state.knowledge_index()).await.unwrap());
        assert!(state.embedder.is_none());
        assert!(state.chat.is_none());
    }

    #[tokio::test]
    async fn test_state_debug_names_backend_and_index() {
        let state = create_app_state(&AppConfig::default()).await.unwrap();
        let debug = format!("{:?}", state);

        assert!(debug.contains("\"memory\""));
        assert!(debug.contains("knowledge_library"));
        assert!(debug.contains("chat: None"));
    }

    #[tokio::test]
    async fn test_bot_id_enables_chat_surface() {
        let config = AppConfig {
            chat: ChatConfig {
                bot_id: "10001".to_string(),
                ..ChatConfig::default()
            },
            ..AppConfig::default()
        };

        let state = create_app_state(&config).await.unwrap();
        assert!(state.chat.is_some());
    }

    #[tokio::test]
    async fn test_similarity_dedup_requires_embeddings() {
        let config = AppConfig {
            knowledge: KnowledgeConfig {
                dedup: DedupStrategy::Similarity,
                ..KnowledgeConfig::default()
            },
            ..AppConfig::default()
        };

        let err = create_app_state(&config).await.unwrap_err();
        assert!(err.to_string().contains("similarity"));
    }

    #[tokio::test]
    async fn test_similarity_dedup_with_embeddings() {
        let config = AppConfig {
            knowledge: KnowledgeConfig {
                dedup: DedupStrategy::Similarity,
                ..KnowledgeConfig::default()
            },
            embedding: EmbeddingConfig {
                enabled: true,
                ..EmbeddingConfig::default()
            },
            ..AppConfig::default()
        };

        let state = create_app_state(&config).await.unwrap();
        assert_eq!(state.embedder.as_ref().map(|e| e.dimensions()), Some(1024));
    }

    #[tokio::test]
    async fn test_invalid_index_name_is_rejected() {
        let config = AppConfig {
            knowledge: KnowledgeConfig {
                index: "Not Valid".to_string(),
                ..KnowledgeConfig::default()
            },
            ..AppConfig::default()
        };

        assert!(create_app_state(&config).await.is_err());
    }
}
