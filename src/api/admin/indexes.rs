//! Index lifecycle endpoints

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::parse_index;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateIndexParams {
    /// Vector dimensionality; defaults to the embedding provider's
    pub dimensions: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexResponse {
    pub index: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

/// PUT /admin/indexes/:index
pub async fn create_index(
    State(state): State<AppState>,
    Path(index): Path<String>,
    Query(params): Query<CreateIndexParams>,
) -> Result<(StatusCode, Json<IndexResponse>), ApiError> {
    let index = parse_index(&index)?;
    let dimensions = params
        .dimensions
        .or_else(|| state.embedder.as_ref().map(|e| e.dimensions()));

    let created = state.gateway.create_index(&index, dimensions).await?;
    if created {
        info!(index = %index, ?dimensions, "Index created");
    }

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((
        status,
        Json(IndexResponse {
            index: index.to_string(),
            created: Some(created),
            deleted: None,
        }),
    ))
}

/// DELETE /admin/indexes/:index
pub async fn delete_index(
    State(state): State<AppState>,
    Path(index): Path<String>,
) -> Result<Json<IndexResponse>, ApiError> {
    let index = parse_index(&index)?;

    if !state.gateway.delete_index(&index).await? {
        return Err(ApiError::not_found(format!("Index '{}' not found", index)));
    }
    info!(index = %index, "Index deleted");

    Ok(Json(IndexResponse {
        index: index.to_string(),
        created: None,
        deleted: Some(true),
    }))
}
