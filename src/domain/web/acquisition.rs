//! Web acquisition trait

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Fetches search results and encyclopedia pages from the open web
///
/// Missing content is an empty string or `None`; `Acquisition` errors are
/// reserved for failures of the browser or the remote site.
#[async_trait]
pub trait WebAcquisition: Send + Sync + Debug {
    /// Visible text of the search results page for `query`
    async fn fetch_search_results(&self, query: &str) -> Result<String, DomainError>;

    /// Article body of the encyclopedia page for `name`, if one exists
    async fn fetch_entity_page(&self, name: &str) -> Result<Option<String>, DomainError>;
}
