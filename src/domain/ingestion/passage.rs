//! Documents and the passages they decompose into

use serde::{Deserialize, Serialize};

/// Bounded-length span of text owned by one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
    /// Name of the owning document
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Query-scoped relevance, never persisted
    #[serde(skip)]
    pub score: Option<f32>,
}

impl Passage {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
            hash: None,
            embedding: None,
            score: None,
        }
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Named body of text: a file, a scraped page or a knowledge hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub content: String,
}

impl Document {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passage_builders() {
        let passage = Passage::new("Saber is a servant.", "Saber")
            .with_hash("abc")
            .with_score(0.5);

        assert_eq!(passage.source, "Saber");
        assert_eq!(passage.hash.as_deref(), Some("abc"));
        assert_eq!(passage.score, Some(0.5));
    }

    #[test]
    fn test_char_len_counts_characters_not_bytes() {
        let passage = Passage::new("阿尔托莉雅", "src");
        assert_eq!(passage.char_len(), 5);
    }

    #[test]
    fn test_score_is_not_serialized() {
        let passage = Passage::new("text", "src").with_score(1.0);
        let json = serde_json::to_string(&passage).unwrap();
        assert!(!json.contains("score"));
    }

    #[test]
    fn test_blank_document() {
        assert!(Document::new("empty", " \n\t").is_blank());
        assert!(!Document::new("full", "x").is_blank());
    }
}
