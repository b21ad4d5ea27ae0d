//! LLM completion domain models and traits

mod completion;
pub mod contract;
mod message;
mod provider;
mod request;
mod response;

pub use completion::{CompletionClient, DEFAULT_TEMPERATURE};
pub use contract::{
    parse_contract, AnswerReply, AnswerWithKeywords, CanAnswer, ContractViolation, EntityName,
    KeywordJudgment, ResponseContract,
};
pub use message::{Message, MessageRole};
pub use provider::LlmProvider;
pub use request::{LlmRequest, LlmRequestBuilder, LlmResponseFormat};
pub use response::{FinishReason, LlmResponse, Usage};

#[cfg(test)]
pub use provider::mock::MockLlmProvider;
