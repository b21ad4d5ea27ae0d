//! Knowledge ingestion endpoints

use axum::extract::State;
use serde::Deserialize;
use tracing::{info, warn};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{Document, Segmenter};
use crate::infrastructure::ingestion::{DirectoryReport, IngestReport};

/// Body of `POST /admin/ingest`
#[derive(Debug, Clone, Deserialize)]
pub struct IngestTextRequest {
    pub content: String,
    #[serde(default = "default_source")]
    pub source: String,
    /// Overrides the configured minimum segment length for this document
    pub min_paragraph_length: Option<usize>,
}

fn default_source() -> String {
    "api".to_string()
}

/// POST /admin/ingest
pub async fn ingest_text(
    State(state): State<AppState>,
    Json(request): Json<IngestTextRequest>,
) -> Result<Json<IngestReport>, ApiError> {
    if request.content.trim().is_empty() {
        return Err(ApiError::bad_request("Content cannot be empty"));
    }

    let configured = state.ingestor.segmenter();
    let segmenter = match request.min_paragraph_length {
        Some(min) => Segmenter::new(min, configured.max_paragraph_length.max(min))?,
        None => configured,
    };

    let document = Document::new(request.source, request.content);
    let report = state.ingestor.ingest(&document, segmenter).await?;

    Ok(Json(report))
}

/// POST /admin/ingest/directory
///
/// Drains the configured inbox into the knowledge index.
pub async fn ingest_directory(
    State(state): State<AppState>,
) -> Result<Json<DirectoryReport>, ApiError> {
    let report = state
        .ingestor
        .ingest_directory(&state.inbox_dir, &state.processed_dir)
        .await?;

    if !report.failed.is_empty() {
        warn!(failed = report.failed.len(), "Some inbox files were not ingested");
    }
    info!(files = report.files.len(), added = report.added(), "Inbox drained");

    Ok(Json(report))
}
