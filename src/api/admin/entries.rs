//! Index entry endpoints

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::parse_index;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{content_hash, IndexEntry};

const DEFAULT_LIST_LIMIT: usize = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct ListEntriesParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIST_LIMIT
}

#[derive(Debug, Clone, Serialize)]
pub struct ListEntriesResponse {
    pub index: String,
    pub entries: Vec<IndexEntry>,
    pub total: usize,
}

/// Body of `POST /admin/indexes/:index/entries`
#[derive(Debug, Clone, Deserialize)]
pub struct AddEntryRequest {
    /// Defaults to the content hash, matching hash deduplication ids
    pub id: Option<String>,
    pub content: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// GET /admin/indexes/:index/entries
pub async fn list_entries(
    State(state): State<AppState>,
    Path(index): Path<String>,
    Query(params): Query<ListEntriesParams>,
) -> Result<Json<ListEntriesResponse>, ApiError> {
    let index = parse_index(&index)?;
    let entries = state.gateway.list_entries(&index, params.limit).await?;

    Ok(Json(ListEntriesResponse {
        index: index.to_string(),
        total: entries.len(),
        entries,
    }))
}

/// POST /admin/indexes/:index/entries
///
/// Embeds the content when an embedding provider is configured.
pub async fn add_entry(
    State(state): State<AppState>,
    Path(index): Path<String>,
    Json(request): Json<AddEntryRequest>,
) -> Result<(StatusCode, Json<IndexEntry>), ApiError> {
    let index = parse_index(&index)?;
    if request.content.trim().is_empty() {
        return Err(ApiError::bad_request("Entry content cannot be empty"));
    }

    let id = request
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| content_hash(&request.content));
    let mut entry = IndexEntry::new(id, request.content);
    entry.metadata = request.metadata;

    if let Some(embedder) = &state.embedder {
        let vector = embedder.embed_one(&entry.content).await?;
        entry = entry.with_vector(vector);
    }

    debug!(index = %index, id = %entry.id, "Adding entry");
    state.gateway.add_entry(&index, entry.clone()).await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /admin/indexes/:index/entries/:entry_id
pub async fn get_entry(
    State(state): State<AppState>,
    Path((index, entry_id)): Path<(String, String)>,
) -> Result<Json<IndexEntry>, ApiError> {
    let index = parse_index(&index)?;

    state
        .gateway
        .get_entry(&index, &entry_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Entry '{}' not found", entry_id)))
}

/// DELETE /admin/indexes/:index/entries/:entry_id
pub async fn delete_entry(
    State(state): State<AppState>,
    Path((index, entry_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let index = parse_index(&index)?;

    if state.gateway.delete_entry(&index, &entry_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("Entry '{}' not found", entry_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_entry_request_minimal() {
        let request: AddEntryRequest =
            serde_json::from_str(r#"{"content": "Saber wields Excalibur."}"#).unwrap();

        assert!(request.id.is_none());
        assert!(request.metadata.is_empty());
    }

    #[test]
    fn test_list_params_default_limit() {
        let params: ListEntriesParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.limit, DEFAULT_LIST_LIMIT);
    }
}
