//! Ingest command - loads text into the knowledge index

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::infrastructure::ingestion::{IngestReport, KnowledgeIngestor};

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// A text file, or a directory drained like the configured inbox
    pub path: PathBuf,

    /// Where a drained directory's files are moved; defaults to knowledge.processed_dir
    #[arg(long)]
    pub processed: Option<PathBuf>,
}

pub async fn run(args: IngestArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let state = crate::create_app_state(&config).await?;

    if args.path.is_dir() {
        let processed = args
            .processed
            .unwrap_or_else(|| PathBuf::from(&config.knowledge.processed_dir));
        let report = state.ingestor.ingest_directory(&args.path, &processed).await?;

        for file in &report.files {
            println!("{}: {} added, {} skipped", file.source, file.added, file.skipped);
        }
        for (name, reason) in &report.failed {
            println!("{}: failed ({})", name, reason);
        }
        info!(files = report.files.len(), added = report.added(), "Directory ingested");
    } else {
        let report = ingest_file(&state.ingestor, &args.path).await?;
        println!("{}: {} added, {} skipped", report.source, report.added, report.skipped);
    }

    Ok(())
}

async fn ingest_file(
    ingestor: &KnowledgeIngestor,
    path: &Path,
) -> anyhow::Result<IngestReport> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(ingestor.ingest_text(&content, &source).await?)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::knowledge_base::MockRetrievalGateway;
    use crate::domain::IndexName;
    use crate::infrastructure::ingestion::HashDeduplicator;

    #[tokio::test]
    async fn test_ingest_file_uses_file_name_as_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saber.txt");
        std::fs::write(&path, "Saber wields Excalibur.\n\nShe is the King of Knights.").unwrap();

        let gateway = Arc::new(MockRetrievalGateway::new());
        let index = IndexName::new("knowledge_library").unwrap();
        let ingestor = KnowledgeIngestor::new(Arc::new(HashDeduplicator::new(gateway.clone(), index)));

        let report = ingest_file(&ingestor, &path).await.unwrap();

        assert_eq!(report.source, "saber.txt");
        assert_eq!(report.added, 2);
        assert_eq!(gateway.entries().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_file_is_reported() {
        let gateway = Arc::new(MockRetrievalGateway::new());
        let index = IndexName::new("knowledge_library").unwrap();
        let ingestor = KnowledgeIngestor::new(Arc::new(HashDeduplicator::new(gateway, index)));

        let err = ingest_file(&ingestor, Path::new("/nonexistent/lore.txt")).await.unwrap_err();
        assert!(err.to_string().contains("Cannot read"));
    }
}
