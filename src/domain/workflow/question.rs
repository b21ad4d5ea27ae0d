//! Question input and answer-level hint

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// How aggressively a run pursues external sources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AnswerLevel {
    /// Answer from the knowledge store only; never fetch encyclopedia pages
    KnowledgeOnly,
    #[default]
    Standard,
    /// Always acquire fresh material, even when stored knowledge looks relevant
    Eager,
}

impl AnswerLevel {
    pub fn as_u8(self) -> u8 {
        match self {
            Self::KnowledgeOnly => 0,
            Self::Standard => 1,
            Self::Eager => 2,
        }
    }
}

impl TryFrom<u8> for AnswerLevel {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::KnowledgeOnly),
            1 => Ok(Self::Standard),
            2 => Ok(Self::Eager),
            other => Err(DomainError::validation(format!(
                "Invalid level {}: expected 0, 1 or 2",
                other
            ))),
        }
    }
}

impl From<AnswerLevel> for u8 {
    fn from(level: AnswerLevel) -> Self {
        level.as_u8()
    }
}

/// A validated, immutable question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    level: AnswerLevel,
}

impl Question {
    pub fn new(text: impl Into<String>) -> Result<Self, DomainError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::validation("Question cannot be empty"));
        }

        Ok(Self {
            text,
            level: AnswerLevel::default(),
        })
    }

    pub fn with_level(mut self, level: AnswerLevel) -> Self {
        self.level = level;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn level(&self) -> AnswerLevel {
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_question_is_rejected() {
        for text in ["", "   ", "\n\t"] {
            let err = Question::new(text).unwrap_err();
            assert!(matches!(err, DomainError::Validation { .. }));
        }
    }

    #[test]
    fn test_question_keeps_text_verbatim() {
        let question = Question::new("  Who is Saber? ").unwrap();
        assert_eq!(question.text(), "  Who is Saber? ");
        assert_eq!(question.level(), AnswerLevel::Standard);
    }

    #[test]
    fn test_level_from_number() {
        assert_eq!(AnswerLevel::try_from(0).unwrap(), AnswerLevel::KnowledgeOnly);
        assert_eq!(AnswerLevel::try_from(2).unwrap(), AnswerLevel::Eager);
        assert!(AnswerLevel::try_from(3).is_err());

        let level: AnswerLevel = serde_json::from_str("2").unwrap();
        assert_eq!(level, AnswerLevel::Eager);
        assert_eq!(serde_json::to_string(&AnswerLevel::KnowledgeOnly).unwrap(), "0");
    }
}
