use std::sync::Arc;

use tracing::debug;

use super::contract::{parse_contract_or_error, ResponseContract};
use super::{LlmProvider, LlmRequest};
use crate::domain::DomainError;

pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// Single-prompt completion over a chat provider
#[derive(Debug, Clone)]
pub struct CompletionClient {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
}

impl CompletionClient {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Complete a prompt with the configured temperature and model
    pub async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        self.complete_with(prompt, self.temperature, None).await
    }

    /// Complete a prompt, overriding temperature and optionally the model
    pub async fn complete_with(
        &self,
        prompt: &str,
        temperature: f32,
        model_hint: Option<&str>,
    ) -> Result<String, DomainError> {
        let model = model_hint.unwrap_or(&self.model);
        let request = LlmRequest::builder()
            .user(prompt)
            .temperature(temperature)
            .build();

        let response = self.provider.chat(model, request).await?;
        debug!(model, reply = response.content(), "LLM reply");

        Ok(response.content().to_string())
    }

    /// Complete a prompt and parse the reply against a JSON contract
    pub async fn ask<T: ResponseContract>(&self, prompt: &str) -> Result<T, DomainError> {
        let raw = self.complete(prompt).await?;
        parse_contract_or_error(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::contract::AnswerReply;
    use crate::domain::llm::MockLlmProvider;

    #[tokio::test]
    async fn test_ask_parses_contract() {
        let provider = Arc::new(MockLlmProvider::new().with_reply("```json\n{\"ans\": \"4\"}\n```"));
        let client = CompletionClient::new(provider.clone(), "qwen-turbo");

        let reply: AnswerReply = client.ask("What's 2+2?").await.unwrap();

        assert_eq!(reply.answer, "4");
        assert_eq!(provider.prompts(), vec!["What's 2+2?"]);
    }

    #[tokio::test]
    async fn test_ask_surfaces_contract_violation() {
        let provider = Arc::new(MockLlmProvider::new().with_reply("four"));
        let client = CompletionClient::new(provider, "qwen-turbo");

        let err = client.ask::<AnswerReply>("What's 2+2?").await.unwrap_err();

        assert!(matches!(err, DomainError::ContractViolation { .. }));
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = Arc::new(MockLlmProvider::new().with_error("rate limited"));
        let client = CompletionClient::new(provider, "qwen-turbo");

        let err = client.complete("hello").await.unwrap_err();

        assert!(matches!(err, DomainError::Provider { .. }));
    }

    #[test]
    fn test_temperature_is_clamped() {
        let provider = Arc::new(MockLlmProvider::new());
        let client = CompletionClient::new(provider, "m").with_temperature(5.0);
        assert_eq!(client.temperature, 2.0);
    }
}
