//! Index name validation

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length for index names
pub const MAX_INDEX_NAME_LENGTH: usize = 255;

/// Lowercase alphanumerics, dots, hyphens and underscores; must start alphanumeric
static INDEX_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9._-]*$").unwrap());

/// Index name validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum IndexValidationError {
    EmptyName,
    NameTooLong { length: usize, max: usize },
    InvalidNameFormat { name: String },
}

impl fmt::Display for IndexValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Index name cannot be empty"),
            Self::NameTooLong { length, max } => {
                write!(f, "Index name too long: {} characters (max {})", length, max)
            }
            Self::InvalidNameFormat { name } => write!(
                f,
                "Invalid index name '{}': must be lowercase alphanumeric with '.', '-' or '_'",
                name
            ),
        }
    }
}

impl std::error::Error for IndexValidationError {}

impl From<IndexValidationError> for crate::domain::DomainError {
    fn from(err: IndexValidationError) -> Self {
        crate::domain::DomainError::validation(err.to_string())
    }
}

pub fn validate_index_name(name: &str) -> Result<(), IndexValidationError> {
    if name.is_empty() {
        return Err(IndexValidationError::EmptyName);
    }

    if name.len() > MAX_INDEX_NAME_LENGTH {
        return Err(IndexValidationError::NameTooLong {
            length: name.len(),
            max: MAX_INDEX_NAME_LENGTH,
        });
    }

    if !INDEX_NAME_PATTERN.is_match(name) {
        return Err(IndexValidationError::InvalidNameFormat {
            name: name.to_string(),
        });
    }

    Ok(())
}
