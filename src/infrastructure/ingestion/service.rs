//! Knowledge ingestion: segment, deduplicate and store

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::domain::ingestion::{normalize_text, Deduplicator, Document, Segmenter};
use crate::domain::DomainError;

/// Counts for one ingested document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub source: String,
    pub segments: usize,
    pub added: usize,
    pub skipped: usize,
}

/// Outcome of draining an inbox directory
#[derive(Debug, Clone, Default, Serialize)]
pub struct DirectoryReport {
    pub files: Vec<IngestReport>,
    /// Files left in the inbox, with the reason
    pub failed: Vec<(String, String)>,
}

impl DirectoryReport {
    pub fn added(&self) -> usize {
        self.files.iter().map(|f| f.added).sum()
    }
}

#[derive(Debug, Clone)]
pub struct KnowledgeIngestor {
    deduplicator: Arc<dyn Deduplicator>,
    segmenter: Segmenter,
}

impl KnowledgeIngestor {
    pub fn new(deduplicator: Arc<dyn Deduplicator>) -> Self {
        Self {
            deduplicator,
            segmenter: Segmenter::default(),
        }
    }

    pub fn with_segmenter(mut self, segmenter: Segmenter) -> Self {
        self.segmenter = segmenter;
        self
    }

    pub fn segmenter(&self) -> Segmenter {
        self.segmenter
    }

    /// Store every passage of `document` that is not already known
    #[instrument(skip(self, document), fields(source = %document.name))]
    pub async fn ingest(
        &self,
        document: &Document,
        segmenter: Segmenter,
    ) -> Result<IngestReport, DomainError> {
        let mut report = IngestReport {
            source: document.name.clone(),
            ..Default::default()
        };

        if document.is_blank() {
            return Ok(report);
        }

        for passage in segmenter.passages(document) {
            report.segments += 1;
            let passage = self.deduplicator.prepare(passage).await?;
            if self.deduplicator.exists(&passage).await? {
                report.skipped += 1;
                continue;
            }
            let id = self.deduplicator.register(&passage).await?;
            debug!(id = %id, chars = passage.char_len(), "Stored passage");
            report.added += 1;
        }

        info!(
            segments = report.segments,
            added = report.added,
            skipped = report.skipped,
            "Document ingested"
        );
        Ok(report)
    }

    pub async fn ingest_text(&self, content: &str, source: &str) -> Result<IngestReport, DomainError> {
        self.ingest(&Document::new(source, content), self.segmenter).await
    }

    /// Ingest each `.txt` file in `inbox`, write its normalized segments to
    /// `processed/<file name>` and remove the original
    #[instrument(skip(self))]
    pub async fn ingest_directory(
        &self,
        inbox: &Path,
        processed: &Path,
    ) -> Result<DirectoryReport, DomainError> {
        tokio::fs::create_dir_all(processed).await.map_err(|e| {
            DomainError::internal(format!("Cannot create '{}': {}", processed.display(), e))
        })?;

        let mut report = DirectoryReport::default();
        for path in text_files(inbox).await? {
            let name = file_name(&path);
            match self.ingest_file(&path, &processed.join(&name)).await {
                Ok(file_report) => report.files.push(file_report),
                Err(e) => {
                    warn!(file = %name, error = %e, "Failed to ingest file");
                    report.failed.push((name, e.to_string()));
                }
            }
        }

        info!(
            files = report.files.len(),
            failed = report.failed.len(),
            added = report.added(),
            "Inbox drained"
        );
        Ok(report)
    }

    async fn ingest_file(&self, path: &Path, target: &Path) -> Result<IngestReport, DomainError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DomainError::internal(format!("Cannot read '{}': {}", path.display(), e)))?;

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let document = Document::new(stem, content);
        let report = self.ingest(&document, self.segmenter).await?;

        let normalized: Vec<String> = self
            .segmenter
            .segment(&document.content)
            .map(|segment| normalize_text(&segment))
            .collect();

        tokio::fs::write(target, normalized.join("\n\n"))
            .await
            .map_err(|e| DomainError::internal(format!("Cannot write '{}': {}", target.display(), e)))?;
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| DomainError::internal(format!("Cannot remove '{}': {}", path.display(), e)))?;

        Ok(report)
    }
}

async fn text_files(dir: &Path) -> Result<Vec<PathBuf>, DomainError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| DomainError::not_found(format!("Inbox '{}': {}", dir.display(), e)))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| DomainError::internal(e.to_string()))?
    {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
