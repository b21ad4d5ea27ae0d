//! Ingestion domain: documents, passages, segmentation and deduplication

pub mod dedup;
pub mod passage;
pub mod segmenter;

pub use dedup::{
    content_hash, normalize_text, DedupStrategy, Deduplicator, DEFAULT_DUPLICATE_SIMILARITY,
};
pub use passage::{Document, Passage};
pub use segmenter::{
    Segmenter, Segments, DEFAULT_MAX_PARAGRAPH_LENGTH, DEFAULT_MIN_PARAGRAPH_LENGTH,
};
