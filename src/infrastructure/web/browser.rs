//! HTTP-backed web acquisition
//!
//! A search engine results page and an encyclopedia article page are fetched
//! through one shared browser session. Callers check the session out for the
//! duration of a navigation; the guard releases it on every exit path.

use async_trait::async_trait;
use reqwest::Url;
use scraper::Selector;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use super::html::{body_text, parse_selector, select_text};
use crate::config::WebConfig;
use crate::domain::{DomainError, WebAcquisition};
use crate::infrastructure::http_client::{HttpClientTrait, HttpMethod, HttpResponse};

/// Mutable state of the single browser tab
#[derive(Debug, Default)]
pub struct PageState {
    pub current_url: Option<String>,
    pub pages_loaded: u64,
}

#[derive(Debug, Default)]
pub struct BrowserSession {
    page: Mutex<PageState>,
}

impl BrowserSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclusive access to the page until the guard is dropped
    pub async fn checkout(&self) -> MutexGuard<'_, PageState> {
        self.page.lock().await
    }
}

#[derive(Debug)]
pub struct HttpBrowser<C: HttpClientTrait> {
    client: C,
    session: BrowserSession,
    search_url: Url,
    search_param: String,
    entity_url: Url,
    result_selector: Selector,
    content_selector: Selector,
    user_agent: String,
}

impl<C: HttpClientTrait> HttpBrowser<C> {
    pub fn new(client: C, config: &WebConfig) -> Result<Self, DomainError> {
        Ok(Self {
            client,
            session: BrowserSession::new(),
            search_url: parse_url(&config.search_url)?,
            search_param: config.search_param.clone(),
            entity_url: parse_url(&config.entity_url)?,
            result_selector: parse_selector(&config.result_selector)?,
            content_selector: parse_selector(&config.content_selector)?,
            user_agent: config.user_agent.clone(),
        })
    }

    pub fn session(&self) -> &BrowserSession {
        &self.session
    }

    async fn navigate(&self, page: &mut PageState, url: Url) -> Result<HttpResponse, DomainError> {
        debug!(url = %url, "Navigating");

        let response = self
            .client
            .send(
                HttpMethod::Get,
                url.as_str(),
                vec![("User-Agent", self.user_agent.as_str())],
                None,
            )
            .await
            .map_err(|e| DomainError::acquisition(e.to_string()))?;

        page.current_url = Some(url.into());
        page.pages_loaded += 1;
        Ok(response)
    }

    fn entity_url_for(&self, name: &str) -> Result<Url, DomainError> {
        let mut url = self.entity_url.clone();
        url.path_segments_mut()
            .map_err(|_| DomainError::configuration("Entity URL cannot be a base URL"))?
            .pop_if_empty()
            .push(name);
        Ok(url)
    }
}

#[async_trait]
impl<C: HttpClientTrait> WebAcquisition for HttpBrowser<C> {
    async fn fetch_search_results(&self, query: &str) -> Result<String, DomainError> {
        let mut url = self.search_url.clone();
        url.query_pairs_mut().append_pair(&self.search_param, query);

        let mut page = self.session.checkout().await;
        let response = self.navigate(&mut page, url).await?;

        if !response.is_success() {
            return Err(DomainError::acquisition(format!(
                "Search returned HTTP {}",
                response.status
            )));
        }

        let text = select_text(&response.body, &self.result_selector)
            .unwrap_or_else(|| body_text(&response.body));
        info!(query, chars = text.chars().count(), "Fetched search results");
        Ok(text)
    }

    async fn fetch_entity_page(&self, name: &str) -> Result<Option<String>, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }
        let url = self.entity_url_for(name)?;

        let mut page = self.session.checkout().await;
        let response = self.navigate(&mut page, url).await?;

        if response.status == 404 {
            debug!(name, "No encyclopedia page");
            return Ok(None);
        }
        if !response.is_success() {
            return Err(DomainError::acquisition(format!(
                "Entity page returned HTTP {}",
                response.status
            )));
        }

        let article = select_text(&response.body, &self.content_selector);
        info!(
            name,
            chars = article.as_ref().map(|a| a.chars().count()).unwrap_or(0),
            "Fetched entity page"
        );
        Ok(article)
    }
}

fn parse_url(url: &str) -> Result<Url, DomainError> {
    Url::parse(url).map_err(|e| DomainError::configuration(format!("Invalid URL '{}': {}", url, e)))
}
