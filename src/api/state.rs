//! Application state for shared services

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::KnowledgeConfig;
use crate::domain::{EmbeddingProvider, IndexName, RetrievalGateway, WebAcquisition};
use crate::infrastructure::chat::ChatHandler;
use crate::infrastructure::ingestion::KnowledgeIngestor;
use crate::infrastructure::workflow::WorkflowOrchestrator;

/// Services shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<WorkflowOrchestrator>,
    pub gateway: Arc<dyn RetrievalGateway>,
    pub ingestor: Arc<KnowledgeIngestor>,
    pub web: Arc<dyn WebAcquisition>,
    /// Present when an embedding endpoint is configured
    pub embedder: Option<Arc<dyn EmbeddingProvider>>,
    /// Present when a bot id is configured
    pub chat: Option<Arc<ChatHandler>>,
    pub inbox_dir: PathBuf,
    pub processed_dir: PathBuf,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<WorkflowOrchestrator>,
        gateway: Arc<dyn RetrievalGateway>,
        ingestor: Arc<KnowledgeIngestor>,
        web: Arc<dyn WebAcquisition>,
    ) -> Self {
        let knowledge = KnowledgeConfig::default();

        Self {
            orchestrator,
            gateway,
            ingestor,
            web,
            embedder: None,
            chat: None,
            inbox_dir: PathBuf::from(knowledge.inbox_dir),
            processed_dir: PathBuf::from(knowledge.processed_dir),
        }
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn with_chat(mut self, chat: Arc<ChatHandler>) -> Self {
        self.chat = Some(chat);
        self
    }

    pub fn with_directories(mut self, inbox: impl Into<PathBuf>, processed: impl Into<PathBuf>) -> Self {
        self.inbox_dir = inbox.into();
        self.processed_dir = processed.into();
        self
    }

    /// The index the answering flows read from
    pub fn knowledge_index(&self) -> &IndexName {
        self.orchestrator.index()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("backend", &self.gateway.backend_name())
            .field("index", self.knowledge_index())
            .field("embedder", &self.embedder.as_ref().map(|e| e.dimensions()))
            .field("chat", &self.chat)
            .field("inbox_dir", &self.inbox_dir)
            .field("processed_dir", &self.processed_dir)
            .finish_non_exhaustive()
    }
}
