//! Elasticsearch retrieval gateway over the REST API

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::domain::knowledge_base::{
    IndexEntry, IndexName, RetrievalGateway, SearchHit, SearchResult,
};
use crate::domain::DomainError;
use crate::infrastructure::http_client::{HttpClientTrait, HttpMethod, HttpResponse};

/// Hits fetched per lexical query before truncating to the caller's limit
const FULL_TEXT_FETCH_SIZE: usize = 20;
const KNN_NUM_CANDIDATES: usize = 100;
const BOOST: f32 = 2.0;

/// Gateway backed by an Elasticsearch cluster
#[derive(Debug)]
pub struct ElasticsearchGateway<C: HttpClientTrait> {
    client: C,
    base_url: String,
}

impl<C: HttpClientTrait> ElasticsearchGateway<C> {
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn index_url(&self, index: &IndexName) -> String {
        format!("{}/{}", self.base_url, index)
    }

    fn doc_url(&self, index: &IndexName, id: &str) -> String {
        format!("{}/{}/_doc/{}", self.base_url, index, id)
    }

    fn headers() -> Vec<(&'static str, &'static str)> {
        vec![("Content-Type", "application/json")]
    }

    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<HttpResponse, DomainError> {
        self.client
            .send(method, url, Self::headers(), body)
            .await
            .map_err(|e| DomainError::retrieval(e.to_string()))
    }

    async fn search(
        &self,
        index: &IndexName,
        body: serde_json::Value,
    ) -> Result<Vec<EsHit>, DomainError> {
        let url = format!("{}/_search", self.index_url(index));
        let response = self.send(HttpMethod::Post, &url, Some(&body)).await?;
        check_status(&response, index)?;

        let parsed: EsSearchResponse = response
            .json()
            .map_err(|e| DomainError::retrieval(e.to_string()))?;
        Ok(parsed.hits.hits)
    }

    fn mapping(dimensions: Option<usize>) -> serde_json::Value {
        let mut properties = json!({
            "content": { "type": "text" },
            "metadata": { "type": "object", "enabled": false },
            "created_at": { "type": "date" }
        });

        if let Some(dims) = dimensions {
            properties["vector_embedding"] = json!({
                "type": "dense_vector",
                "dims": dims,
                "index": true,
                "similarity": "cosine"
            });
        }

        json!({ "mappings": { "properties": properties } })
    }
}

fn is_index_missing(response: &HttpResponse) -> bool {
    response.status == 404 && response.body.contains("index_not_found_exception")
}

fn check_status(response: &HttpResponse, index: &IndexName) -> Result<(), DomainError> {
    if is_index_missing(response) {
        return Err(DomainError::not_found(format!("Index '{}' not found", index)));
    }
    if !response.is_success() {
        return Err(DomainError::retrieval(format!(
            "Elasticsearch returned HTTP {}: {}",
            response.status, response.body
        )));
    }
    Ok(())
}

fn to_result(hits: Vec<EsHit>, limit: usize) -> SearchResult {
    hits.into_iter()
        .take(limit)
        .map(|hit| SearchHit::new(hit.id, hit.source.content, hit.score.unwrap_or(0.0)))
        .collect()
}

#[async_trait]
impl<C: HttpClientTrait> RetrievalGateway for ElasticsearchGateway<C> {
    fn backend_name(&self) -> &'static str {
        "elasticsearch"
    }

    async fn full_text(
        &self,
        index: &IndexName,
        query: &str,
        boost: &str,
        limit: usize,
    ) -> Result<SearchResult, DomainError> {
        let mut bool_query = serde_json::Map::new();

        if !boost.trim().is_empty() {
            bool_query.insert(
                "must".to_string(),
                json!([{ "match": { "content": {
                    "query": boost,
                    "boost": BOOST,
                    "fuzziness": "AUTO"
                } } }]),
            );
        }

        if !query.trim().is_empty() {
            bool_query.insert(
                "should".to_string(),
                json!([{ "match": { "content": { "query": query } } }]),
            );
        }

        let body = json!({
            "size": FULL_TEXT_FETCH_SIZE.max(limit),
            "query": { "bool": bool_query },
            "_source": { "excludes": ["vector_embedding"] }
        });

        debug!(index = %index, query, boost, "Full-text search");
        let hits = self.search(index, body).await?;
        Ok(to_result(hits, limit))
    }

    async fn vector(
        &self,
        index: &IndexName,
        vector: &[f32],
        limit: usize,
    ) -> Result<SearchResult, DomainError> {
        let body = json!({
            "size": limit,
            "knn": {
                "field": "vector_embedding",
                "query_vector": vector,
                "k": limit,
                "num_candidates": KNN_NUM_CANDIDATES.max(limit)
            },
            "_source": { "excludes": ["vector_embedding"] }
        });

        let url = format!("{}/_search", self.index_url(index));
        let response = self.send(HttpMethod::Post, &url, Some(&body)).await?;

        // The only client error a well-formed knn query can hit is a dimension mismatch
        if response.status == 400 {
            return Err(DomainError::validation(format!(
                "Vector rejected by index '{}': {}",
                index, response.body
            )));
        }
        check_status(&response, index)?;

        let parsed: EsSearchResponse = response
            .json()
            .map_err(|e| DomainError::retrieval(e.to_string()))?;
        Ok(to_result(parsed.hits.hits, limit))
    }

    async fn create_index(
        &self,
        index: &IndexName,
        dimensions: Option<usize>,
    ) -> Result<bool, DomainError> {
        if dimensions == Some(0) {
            return Err(DomainError::validation("Index dimensions must be greater than 0"));
        }
        if self.index_exists(index).await? {
            return Ok(false);
        }

        let body = Self::mapping(dimensions);
        let response = self
            .send(HttpMethod::Put, &self.index_url(index), Some(&body))
            .await?;

        if response.status == 400 && response.body.contains("resource_already_exists_exception") {
            return Ok(false);
        }
        check_status(&response, index)?;
        Ok(true)
    }

    async fn delete_index(&self, index: &IndexName) -> Result<bool, DomainError> {
        let response = self
            .send(HttpMethod::Delete, &self.index_url(index), None)
            .await?;

        if is_index_missing(&response) {
            return Ok(false);
        }
        check_status(&response, index)?;
        Ok(true)
    }

    async fn index_exists(&self, index: &IndexName) -> Result<bool, DomainError> {
        let response = self.send(HttpMethod::Head, &self.index_url(index), None).await?;

        match response.status {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(DomainError::retrieval(format!(
                "Elasticsearch returned HTTP {} checking index '{}'",
                status, index
            ))),
        }
    }

    async fn add_entry(&self, index: &IndexName, entry: IndexEntry) -> Result<(), DomainError> {
        let mut body = json!({
            "content": entry.content,
            "created_at": entry.created_at,
        });
        if let Some(vector) = &entry.vector {
            body["vector_embedding"] = json!(vector);
        }
        if !entry.metadata.is_empty() {
            body["metadata"] = json!(entry.metadata);
        }

        let url = format!("{}?refresh=true", self.doc_url(index, &entry.id));
        let response = self.send(HttpMethod::Put, &url, Some(&body)).await?;

        if response.status == 400 && response.body.contains("dense_vector") {
            return Err(DomainError::validation(format!(
                "Vector rejected by index '{}': {}",
                index, response.body
            )));
        }
        check_status(&response, index)
    }

    async fn get_entry(
        &self,
        index: &IndexName,
        id: &str,
    ) -> Result<Option<IndexEntry>, DomainError> {
        let response = self
            .send(HttpMethod::Get, &self.doc_url(index, id), None)
            .await?;

        if response.status == 404 && !is_index_missing(&response) {
            return Ok(None);
        }
        check_status(&response, index)?;

        let doc: EsHit = response
            .json()
            .map_err(|e| DomainError::retrieval(e.to_string()))?;
        Ok(Some(doc.into_entry()))
    }

    async fn delete_entry(&self, index: &IndexName, id: &str) -> Result<bool, DomainError> {
        let url = format!("{}?refresh=true", self.doc_url(index, id));
        let response = self.send(HttpMethod::Delete, &url, None).await?;

        if response.status == 404 && !is_index_missing(&response) {
            return Ok(false);
        }
        check_status(&response, index)?;
        Ok(true)
    }

    async fn list_entries(
        &self,
        index: &IndexName,
        limit: usize,
    ) -> Result<Vec<IndexEntry>, DomainError> {
        let body = json!({
            "size": limit,
            "query": { "match_all": {} },
            "sort": [{ "created_at": { "order": "asc", "unmapped_type": "date" } }]
        });

        let hits = self.search(index, body).await?;
        Ok(hits.into_iter().map(EsHit::into_entry).collect())
    }
}

#[derive(Debug, Deserialize)]
struct EsSearchResponse {
    hits: EsHits,
}

#[derive(Debug, Deserialize)]
struct EsHits {
    #[serde(default)]
    hits: Vec<EsHit>,
}

#[derive(Debug, Deserialize)]
struct EsHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_score", default)]
    score: Option<f32>,
    #[serde(rename = "_source")]
    source: EsSource,
}

#[derive(Debug, Deserialize)]
struct EsSource {
    #[serde(default)]
    content: String,
    #[serde(default)]
    vector_embedding: Option<Vec<f32>>,
    #[serde(default)]
    metadata: HashMap<String, serde_json::Value>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl EsHit {
    fn into_entry(self) -> IndexEntry {
        let mut entry = IndexEntry::new(self.id, self.source.content);
        entry.vector = self.source.vector_embedding;
        entry.metadata = self.source.metadata;
        if let Some(created_at) = self.source.created_at {
            entry.created_at = created_at;
        }
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::HttpClient;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn index() -> IndexName {
        IndexName::new("knowledge_library").unwrap()
    }

    fn search_body(hits: &[(&str, f32, &str)]) -> serde_json::Value {
        let hits: Vec<_> = hits
            .iter()
            .map(|(id, score, content)| {
                json!({ "_id": id, "_score": score, "_source": { "content": content } })
            })
            .collect();
        json!({ "hits": { "total": { "value": hits.len() }, "hits": hits } })
    }

    fn index_missing() -> ResponseTemplate {
        ResponseTemplate::new(404).set_body_json(json!({
            "error": { "type": "index_not_found_exception" },
            "status": 404
        }))
    }

    async fn gateway(server: &MockServer) -> ElasticsearchGateway<HttpClient> {
        ElasticsearchGateway::new(HttpClient::new(), format!("{}/", server.uri()))
    }

    #[tokio::test]
    async fn test_full_text_builds_boosted_bool_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/knowledge_library/_search"))
            .and(body_partial_json(json!({
                "size": 20,
                "query": { "bool": {
                    "must": [{ "match": { "content": {
                        "query": "Artoria", "boost": 2.0, "fuzziness": "AUTO"
                    } } }],
                    "should": [{ "match": { "content": { "query": "saber sword" } } }]
                } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body(&[
                ("a", 10.0, "first"),
                ("b", 9.0, "second"),
                ("c", 5.0, "third"),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let result = gateway(&server)
            .await
            .full_text(&index(), "saber sword", "Artoria", 2)
            .await
            .unwrap();

        assert_eq!(result.scores(), vec![10.0, 9.0]);
        assert_eq!(result.hits[0].content, "first");
    }

    #[tokio::test]
    async fn test_full_text_without_boost_has_no_must_clause() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/knowledge_library/_search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body(&[])))
            .mount(&server)
            .await;

        let gateway = gateway(&server).await;
        gateway.full_text(&index(), "saber", "", 4).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(body["query"]["bool"].get("must").is_none());
        assert_eq!(body["query"]["bool"]["should"][0]["match"]["content"]["query"], "saber");
    }

    #[tokio::test]
    async fn test_missing_index_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/knowledge_library/_search"))
            .respond_with(index_missing())
            .mount(&server)
            .await;

        let err = gateway(&server)
            .await
            .full_text(&index(), "saber", "", 4)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_engine_failure_is_retrieval_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/knowledge_library/_search"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let err = gateway(&server)
            .await
            .full_text(&index(), "saber", "", 4)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Retrieval { .. }));

        let unreachable = ElasticsearchGateway::new(HttpClient::new(), "http://127.0.0.1:1");
        let err = unreachable.full_text(&index(), "saber", "", 4).await.unwrap_err();
        assert!(matches!(err, DomainError::Retrieval { .. }));
    }

    #[tokio::test]
    async fn test_vector_search_and_dimension_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/knowledge_library/_search"))
            .and(body_partial_json(json!({ "knn": { "query_vector": [1.0, 0.0] } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body(&[("a", 0.99, "east")])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/knowledge_library/_search"))
            .and(body_partial_json(json!({ "knn": { "query_vector": [1.0] } })))
            .respond_with(ResponseTemplate::new(400).set_body_string("dimension mismatch"))
            .mount(&server)
            .await;

        let gateway = gateway(&server).await;
        let result = gateway.vector(&index(), &[1.0, 0.0], 1).await.unwrap();
        assert_eq!(result.hits[0].id, "a");

        let err = gateway.vector(&index(), &[1.0], 1).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_index_skips_existing() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/knowledge_library"))
            .respond_with(ResponseTemplate::new(404))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/knowledge_library"))
            .and(body_partial_json(json!({ "mappings": { "properties": {
                "vector_embedding": { "type": "dense_vector", "dims": 1024 }
            } } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/knowledge_library"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let gateway = gateway(&server).await;
        assert!(gateway.create_index(&index(), Some(1024)).await.unwrap());
        assert!(!gateway.create_index(&index(), Some(1024)).await.unwrap());
    }

    #[tokio::test]
    async fn test_entry_crud() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/knowledge_library/_doc/abc"))
            .and(body_partial_json(json!({ "content": "Saber", "vector_embedding": [0.5] })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "result": "created" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/knowledge_library/_doc/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_id": "abc",
                "found": true,
                "_source": { "content": "Saber", "vector_embedding": [0.5] }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/knowledge_library/_doc/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "_id": "missing", "found": false
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/knowledge_library/_doc/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "result": "not_found" })))
            .mount(&server)
            .await;

        let gateway = gateway(&server).await;
        gateway
            .add_entry(&index(), IndexEntry::new("abc", "Saber").with_vector(vec![0.5]))
            .await
            .unwrap();

        let entry = gateway.get_entry(&index(), "abc").await.unwrap().unwrap();
        assert_eq!(entry.content, "Saber");
        assert_eq!(entry.vector, Some(vec![0.5]));

        assert!(gateway.get_entry(&index(), "missing").await.unwrap().is_none());
        assert!(!gateway.delete_entry(&index(), "missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_entries_uses_match_all() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/knowledge_library/_search"))
            .and(body_partial_json(json!({ "size": 100, "query": { "match_all": {} } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body(&[
                ("a", 1.0, "first"),
                ("b", 1.0, "second"),
            ])))
            .mount(&server)
            .await;

        let entries = gateway(&server).await.list_entries(&index(), 100).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].id, "b");
    }

    #[tokio::test]
    async fn test_delete_missing_index_returns_false() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/knowledge_library"))
            .respond_with(index_missing())
            .mount(&server)
            .await;

        assert!(!gateway(&server).await.delete_index(&index()).await.unwrap());
    }
}
