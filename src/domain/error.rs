use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The LLM did not answer in the agreed JSON shape
    #[error("Contract violation: {message}")]
    ContractViolation { message: String, raw: String },

    /// The index engine was unreachable or rejected the query
    #[error("Retrieval error: {message}")]
    Retrieval { message: String },

    /// Web acquisition failed; callers recover from this locally
    #[error("Acquisition failure: {message}")]
    Acquisition { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn contract_violation(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::ContractViolation {
            message: message.into(),
            raw: raw.into(),
        }
    }

    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval {
            message: message.into(),
        }
    }

    pub fn acquisition(message: impl Into<String>) -> Self {
        Self::Acquisition {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error belongs to a best-effort step that callers may swallow
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Acquisition { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Index 'knowledge_library' not found");
        assert_eq!(
            error.to_string(),
            "Not found: Index 'knowledge_library' not found"
        );
    }

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("Question cannot be empty");
        assert_eq!(error.to_string(), "Validation error: Question cannot be empty");
    }

    #[test]
    fn test_contract_violation_keeps_raw_text() {
        let error = DomainError::contract_violation("missing field `ans`", "{\"foo\": 1}");
        assert_eq!(error.to_string(), "Contract violation: missing field `ans`");

        match error {
            DomainError::ContractViolation { raw, .. } => assert_eq!(raw, "{\"foo\": 1}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_only_acquisition_is_recoverable() {
        assert!(DomainError::acquisition("timeout").is_recoverable());
        assert!(!DomainError::retrieval("connection refused").is_recoverable());
        assert!(!DomainError::contract_violation("bad json", "").is_recoverable());
    }
}
