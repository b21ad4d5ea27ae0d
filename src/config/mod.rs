//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, ChatConfig, ChatFlow, EmbeddingConfig, KnowledgeBackend, KnowledgeConfig,
    LlmConfig, LogFormat, LoggingConfig, ServerConfig, WebConfig,
};
