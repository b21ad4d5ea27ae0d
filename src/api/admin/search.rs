//! Direct index search

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::parse_index;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{EmbeddingProvider, SearchHit};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    #[default]
    FullText,
    Vector,
    Hybrid,
}

/// Body of `POST /admin/indexes/:index/search`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub mode: SearchMode,
    /// Required, up-weighted term for full-text searches
    #[serde(default)]
    pub boost: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    5
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub index: String,
    pub mode: SearchMode,
    pub hits: Vec<SearchHit>,
    pub total: usize,
}

/// POST /admin/indexes/:index/search
pub async fn search_index(
    State(state): State<AppState>,
    Path(index): Path<String>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let index = parse_index(&index)?;
    if request.query.trim().is_empty() {
        return Err(ApiError::bad_request("Search query cannot be empty"));
    }
    debug!(index = %index, mode = ?request.mode, limit = request.limit, "Admin search");

    let result = match request.mode {
        SearchMode::FullText => {
            state
                .gateway
                .full_text(&index, &request.query, &request.boost, request.limit)
                .await?
        }
        SearchMode::Vector => {
            let vector = embed(&state, &request.query).await?;
            state.gateway.vector(&index, &vector, request.limit).await?
        }
        SearchMode::Hybrid => {
            let vector = embed(&state, &request.query).await?;
            state
                .gateway
                .hybrid(&index, &request.query, &vector, request.limit)
                .await?
        }
    };

    Ok(Json(SearchResponse {
        index: index.to_string(),
        mode: request.mode,
        total: result.len(),
        hits: result.hits,
    }))
}

async fn embed(state: &AppState, query: &str) -> Result<Vec<f32>, ApiError> {
    let embedder: &dyn EmbeddingProvider = state
        .embedder
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("Vector search requires an embedding provider"))?;

    Ok(embedder.embed_one(query).await?)
}
