//! OpenAI-compatible embedding provider

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{DomainError, EmbeddingProvider};
use crate::infrastructure::http_client::HttpClientTrait;
use crate::infrastructure::llm::DEFAULT_COMPATIBLE_BASE_URL;

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-v3";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1024;

/// Embedding provider for any `/v1/embeddings` endpoint
#[derive(Debug)]
pub struct OpenAiEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl<C: HttpClientTrait> OpenAiEmbeddingProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_COMPATIBLE_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }

    fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_request(&self, texts: &[String]) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "input": texts,
            "dimensions": self.dimensions,
            "encoding_format": "float",
        })
    }

    fn parse_response(
        &self,
        json: serde_json::Value,
        expected: usize,
    ) -> Result<Vec<Vec<f32>>, DomainError> {
        let response: EmbeddingResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("embedding", format!("Failed to parse embedding response: {}", e))
        })?;

        let mut data = response.data;
        data.sort_by_key(|d| d.index);

        if data.len() != expected {
            return Err(DomainError::provider(
                "embedding",
                format!("Expected {} embeddings, got {}", expected, data.len()),
            ));
        }

        if let Some(bad) = data.iter().find(|d| d.embedding.len() != self.dimensions) {
            return Err(DomainError::provider(
                "embedding",
                format!(
                    "Expected {} dimensions, got {}",
                    self.dimensions,
                    bad.embedding.len()
                ),
            ));
        }

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OpenAiEmbeddingProvider<C> {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.embeddings_url();
        let body = self.build_request(&texts);
        let response = self.client.post_json(&url, self.headers(), &body).await?;

        self.parse_response(response, texts.len())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}
