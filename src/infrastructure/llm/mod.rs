//! LLM provider implementations

mod factory;
mod openai;

pub use factory::LlmProviderFactory;
pub use openai::{OpenAiCompatibleProvider, DEFAULT_COMPATIBLE_BASE_URL};
