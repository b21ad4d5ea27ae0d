//! Knowledge ingestion infrastructure
//!
//! Deduplicators backed by the retrieval gateway, and the service that
//! feeds documents through segmentation and deduplication into the index.

pub mod hash_dedup;
pub mod service;
pub mod similarity_dedup;

pub use hash_dedup::HashDeduplicator;
pub use service::{DirectoryReport, IngestReport, KnowledgeIngestor};
pub use similarity_dedup::SimilarityDeduplicator;
