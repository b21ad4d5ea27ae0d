//! Admin API endpoints for index maintenance, ingestion and acquisition probes

pub mod entries;
pub mod indexes;
pub mod ingest;
pub mod search;
pub mod web;

use axum::{
    routing::{get, post, put},
    Router,
};

use super::state::AppState;
use super::types::ApiError;
use crate::domain::{DomainError, IndexName};

pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route(
            "/indexes/{index}",
            put(indexes::create_index).delete(indexes::delete_index),
        )
        .route(
            "/indexes/{index}/entries",
            get(entries::list_entries).post(entries::add_entry),
        )
        .route(
            "/indexes/{index}/entries/{entry_id}",
            get(entries::get_entry).delete(entries::delete_entry),
        )
        .route("/indexes/{index}/search", post(search::search_index))
        .route("/ingest", post(ingest::ingest_text))
        .route("/ingest/directory", post(ingest::ingest_directory))
        .route("/web/search", get(web::probe_search))
}

/// Validate an index name taken from the path
pub(crate) fn parse_index(name: &str) -> Result<IndexName, ApiError> {
    IndexName::new(name).map_err(|e| ApiError::from(DomainError::from(e)))
}
