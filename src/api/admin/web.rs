//! Raw web acquisition probe

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};

#[derive(Debug, Clone, Deserialize)]
pub struct WebSearchParams {
    pub query: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebSearchResponse {
    pub query: String,
    pub text: String,
    pub chars: usize,
}

/// GET /admin/web/search?query=
pub async fn probe_search(
    State(state): State<AppState>,
    Query(params): Query<WebSearchParams>,
) -> Result<Json<WebSearchResponse>, ApiError> {
    if params.query.trim().is_empty() {
        return Err(ApiError::bad_request("Query cannot be empty"));
    }

    let text = state.web.fetch_search_results(&params.query).await?;

    Ok(Json(WebSearchResponse {
        query: params.query,
        chars: text.chars().count(),
        text,
    }))
}
