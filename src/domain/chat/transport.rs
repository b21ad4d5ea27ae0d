//! Chat transport trait

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::DomainError;

/// Outbound side of the chat platform
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_text(&self, conversation: &str, text: &str) -> Result<(), DomainError>;

    /// Send an image given a URL or a local file path
    async fn send_image(&self, conversation: &str, file: &str) -> Result<(), DomainError>;
}
