//! Domain layer - Core entities, traits and text algorithms

pub mod chat;
pub mod embedding;
pub mod error;
pub mod ingestion;
pub mod keywords;
pub mod knowledge_base;
pub mod llm;
pub mod ranking;
pub mod web;
pub mod workflow;

pub use chat::{ChatTransport, ConversationLocks, InboundEvent};
pub use embedding::{cosine_similarity, EmbeddingProvider};
pub use error::DomainError;
pub use ingestion::{
    content_hash, normalize_text, DedupStrategy, Deduplicator, Document, Passage, Segmenter,
};
pub use keywords::{CustomDictionary, KeywordExtractor, StopWords, Tokenizer};
pub use knowledge_base::{IndexEntry, IndexName, RetrievalGateway, SearchHit, SearchResult};
pub use llm::{CompletionClient, LlmProvider, LlmRequest, LlmResponse, Message, MessageRole};
pub use ranking::{fuzzy_jaccard, normalize_by_top_score, PassageRanker, RelevanceThresholds};
pub use web::WebAcquisition;
pub use workflow::{
    AnswerLevel, AnswerSource, Question, WorkflowConfig, WorkflowOutcome, WorkflowState,
};
