use serde::{Deserialize, Serialize};

use crate::domain::keywords::DEFAULT_STOP_WORDS;
use crate::domain::ranking::RelevanceThresholds;

pub const DEFAULT_KNOWLEDGE_INDEX: &str = "knowledge_library";

/// Tunables of the answering flows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Hits fetched from the store by the relevance gate
    #[serde(default = "default_knowledge_limit")]
    pub knowledge_limit: usize,

    #[serde(default = "default_keyword_top_n")]
    pub keyword_top_n: usize,

    #[serde(default = "default_top_passages")]
    pub top_passages: usize,

    /// Leading characters of the search text shown to the entity prompt
    #[serde(default = "default_entity_probe_chars")]
    pub entity_probe_chars: usize,

    /// Minimum paragraph length when ingesting an acquired article
    #[serde(default = "default_article_min_paragraph_length")]
    pub article_min_paragraph_length: usize,

    /// Characters of acquired data shown to the final shallow prompt
    #[serde(default = "default_data_max_chars")]
    pub data_max_chars: usize,

    #[serde(default = "default_small_sample_size")]
    pub small_sample_size: usize,

    #[serde(default = "default_large_sample_size")]
    pub large_sample_size: usize,

    #[serde(default)]
    pub thresholds: RelevanceThresholds,

    #[serde(default = "default_stop_words")]
    pub stop_words: Vec<String>,

    #[serde(default = "default_persona")]
    pub persona: String,
}

fn default_knowledge_limit() -> usize {
    4
}

fn default_keyword_top_n() -> usize {
    5
}

fn default_top_passages() -> usize {
    3
}

fn default_entity_probe_chars() -> usize {
    100
}

fn default_article_min_paragraph_length() -> usize {
    5000
}

fn default_data_max_chars() -> usize {
    10_000
}

fn default_small_sample_size() -> usize {
    2
}

fn default_large_sample_size() -> usize {
    4
}

fn default_stop_words() -> Vec<String> {
    DEFAULT_STOP_WORDS.iter().map(|s| s.to_string()).collect()
}

fn default_persona() -> String {
    "You are Mango, a cat-girl chatting with friends in a group chat. \
     Stay in character and answer in a playful cat-girl voice."
        .to_string()
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            knowledge_limit: default_knowledge_limit(),
            keyword_top_n: default_keyword_top_n(),
            top_passages: default_top_passages(),
            entity_probe_chars: default_entity_probe_chars(),
            article_min_paragraph_length: default_article_min_paragraph_length(),
            data_max_chars: default_data_max_chars(),
            small_sample_size: default_small_sample_size(),
            large_sample_size: default_large_sample_size(),
            thresholds: RelevanceThresholds::default(),
            stop_words: default_stop_words(),
            persona: default_persona(),
        }
    }
}
