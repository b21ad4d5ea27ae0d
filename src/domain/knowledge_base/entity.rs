//! Index entries and search results

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_index_name, IndexValidationError};

/// Name of an index in the retrieval store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IndexName(String);

impl IndexName {
    pub fn new(name: impl Into<String>) -> Result<Self, IndexValidationError> {
        let name = name.into();
        validate_index_name(&name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for IndexName {
    type Error = IndexValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IndexName> for String {
    fn from(name: IndexName) -> Self {
        name.0
    }
}

impl std::fmt::Display for IndexName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted form of a passage; created on ingestion and never mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub content: String,
    #[serde(
        default,
        rename = "vector_embedding",
        skip_serializing_if = "Option::is_none"
    )]
    pub vector: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl IndexEntry {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            vector: None,
            metadata: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_vector(mut self, vector: Vec<f32>) -> Self {
        self.vector = Some(vector);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").and_then(|v| v.as_str())
    }
}

/// One scored match; scores are engine-native and not normalized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub content: String,
    pub score: f32,
    /// Lexical component of a hybrid score, used to break ties
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lexical_score: Option<f32>,
}

impl SearchHit {
    pub fn new(id: impl Into<String>, content: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            score,
            lexical_score: None,
        }
    }

    pub fn with_lexical_score(mut self, score: f32) -> Self {
        self.lexical_score = Some(score);
        self
    }
}

/// Ranked, transient result of one query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub hits: Vec<SearchHit>,
}

impl SearchResult {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self { hits }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn top_score(&self) -> Option<f32> {
        self.hits.iter().map(|h| h.score).reduce(f32::max)
    }

    pub fn scores(&self) -> Vec<f32> {
        self.hits.iter().map(|h| h.score).collect()
    }

    /// Contents of all hits, one per line
    pub fn joined_text(&self) -> String {
        self.hits
            .iter()
            .map(|h| h.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn truncate(mut self, limit: usize) -> Self {
        self.hits.truncate(limit);
        self
    }
}

impl FromIterator<SearchHit> for SearchResult {
    fn from_iter<I: IntoIterator<Item = SearchHit>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
