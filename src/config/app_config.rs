use serde::Deserialize;

use crate::domain::ingestion::{
    DedupStrategy, Segmenter, DEFAULT_MAX_PARAGRAPH_LENGTH, DEFAULT_MIN_PARAGRAPH_LENGTH,
};
use crate::domain::llm::DEFAULT_TEMPERATURE;
use crate::domain::workflow::DEFAULT_KNOWLEDGE_INDEX;
use crate::domain::{DomainError, WorkflowConfig};
use crate::infrastructure::embedding::{DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_EMBEDDING_MODEL};
use crate::infrastructure::llm::DEFAULT_COMPATIBLE_BASE_URL;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    /// Thresholds and sizes of the answering flows
    #[serde(default)]
    pub relevance: WorkflowConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// Optional embeddings endpoint; vector search and similarity dedup need it
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeBackend {
    #[default]
    Memory,
    Elasticsearch,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeConfig {
    #[serde(default)]
    pub backend: KnowledgeBackend,
    /// Elasticsearch base URL
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_index")]
    pub index: String,
    #[serde(default = "default_min_paragraph_length")]
    pub min_paragraph_length: usize,
    #[serde(default = "default_max_paragraph_length")]
    pub max_paragraph_length: usize,
    #[serde(default)]
    pub dedup: DedupStrategy,
    #[serde(default = "default_inbox_dir")]
    pub inbox_dir: String,
    #[serde(default = "default_processed_dir")]
    pub processed_dir: String,
}

impl KnowledgeConfig {
    pub fn segmenter(&self) -> Result<Segmenter, DomainError> {
        Segmenter::new(self.min_paragraph_length, self.max_paragraph_length)
    }
}

/// Search engine and encyclopedia endpoints used for acquisition
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_search_url")]
    pub search_url: String,
    /// Query-string parameter carrying the search terms
    #[serde(default = "default_search_param")]
    pub search_param: String,
    /// Base URL the entity name is appended to as a path segment
    #[serde(default = "default_entity_url")]
    pub entity_url: String,
    #[serde(default = "default_result_selector")]
    pub result_selector: String,
    #[serde(default = "default_content_selector")]
    pub content_selector: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Which answering flow handles chat mentions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChatFlow {
    Deep,
    #[default]
    Shallow,
}

/// OneBot chat surface
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_onebot_url")]
    pub base_url: String,
    #[serde(default)]
    pub access_token: String,
    /// The bot's own user id; mentions of it are questions
    #[serde(default)]
    pub bot_id: String,
    #[serde(default)]
    pub flow: ChatFlow,
    #[serde(default = "default_poke_replies")]
    pub poke_replies: Vec<String>,
    /// Run at most one question per conversation at a time
    #[serde(default = "default_true")]
    pub serialize_conversations: bool,
    #[serde(default = "default_error_reply")]
    pub error_reply: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_llm_base_url() -> String {
    DEFAULT_COMPATIBLE_BASE_URL.to_string()
}

fn default_llm_model() -> String {
    "qwen-turbo".to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_embedding_dimensions() -> usize {
    DEFAULT_EMBEDDING_DIMENSIONS
}

fn default_index() -> String {
    DEFAULT_KNOWLEDGE_INDEX.to_string()
}

fn default_min_paragraph_length() -> usize {
    DEFAULT_MIN_PARAGRAPH_LENGTH
}

fn default_max_paragraph_length() -> usize {
    DEFAULT_MAX_PARAGRAPH_LENGTH
}

fn default_inbox_dir() -> String {
    "data/inbox".to_string()
}

fn default_processed_dir() -> String {
    "data/processed".to_string()
}

fn default_search_url() -> String {
    "https://www.baidu.com/s".to_string()
}

fn default_search_param() -> String {
    "wd".to_string()
}

fn default_entity_url() -> String {
    "https://baike.baidu.com/item/".to_string()
}

fn default_result_selector() -> String {
    "#content_left".to_string()
}

fn default_content_selector() -> String {
    ".mainContent_TWv4s".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0 Safari/537.36"
        .to_string()
}

fn default_onebot_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_poke_replies() -> Vec<String> {
    ["喵？", "别戳啦！", "再戳就要生气了喵！", "Nya? What is it?"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_true() -> bool {
    true
}

fn default_error_reply() -> String {
    "Something went wrong, nya... please try again later.".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key: String::new(),
            model: default_llm_model(),
            temperature: default_temperature(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_llm_base_url(),
            api_key: String::new(),
            model: default_embedding_model(),
            dimensions: default_embedding_dimensions(),
        }
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            backend: KnowledgeBackend::default(),
            url: String::new(),
            index: default_index(),
            min_paragraph_length: default_min_paragraph_length(),
            max_paragraph_length: default_max_paragraph_length(),
            dedup: DedupStrategy::default(),
            inbox_dir: default_inbox_dir(),
            processed_dir: default_processed_dir(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            search_param: default_search_param(),
            entity_url: default_entity_url(),
            result_selector: default_result_selector(),
            content_selector: default_content_selector(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: default_onebot_url(),
            access_token: String::new(),
            bot_id: String::new(),
            flow: ChatFlow::default(),
            poke_replies: default_poke_replies(),
            serialize_conversations: true,
            error_reply: default_error_reply(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("LOREBOT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(source: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_empty_configuration_is_valid() {
        let config = from_toml("");

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.llm.model, "qwen-turbo");
        assert_eq!(config.llm.temperature, 0.5);
        assert_eq!(config.knowledge.backend, KnowledgeBackend::Memory);
        assert_eq!(config.knowledge.index, "knowledge_library");
        assert_eq!(config.relevance.thresholds.relative_cutoff, 0.85);
        assert_eq!(config.chat.flow, ChatFlow::Shallow);
        assert!(!config.embedding.enabled);
    }

    #[test]
    fn test_sections_override_defaults() {
        let config = from_toml(
            r#"
            [logging]
            format = "json"

            [knowledge]
            backend = "elasticsearch"
            url = "http://localhost:9200"
            dedup = "similarity"

            [relevance]
            keyword_top_n = 8

            [relevance.thresholds]
            jaccard_threshold = 0.4

            [chat]
            bot_id = "10001"
            flow = "deep"
            "#,
        );

        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.knowledge.backend, KnowledgeBackend::Elasticsearch);
        assert_eq!(config.knowledge.dedup, DedupStrategy::Similarity);
        assert_eq!(config.relevance.keyword_top_n, 8);
        assert_eq!(config.relevance.thresholds.jaccard_threshold, 0.4);
        assert_eq!(config.relevance.thresholds.relative_cutoff, 0.85);
        assert_eq!(config.chat.bot_id, "10001");
        assert_eq!(config.chat.flow, ChatFlow::Deep);
        assert_eq!(config.chat.poke_replies.len(), 4);
    }

    #[test]
    fn test_knowledge_segmenter() {
        let segmenter = KnowledgeConfig::default().segmenter().unwrap();
        assert_eq!(segmenter.max_paragraph_length, 500);

        let invalid = KnowledgeConfig {
            max_paragraph_length: 0,
            ..KnowledgeConfig::default()
        };
        assert!(invalid.segmenter().is_err());
    }
}
