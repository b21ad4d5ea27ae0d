//! In-memory retrieval gateway for development and testing

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::keywords::{is_function_word, Tokenizer};
use crate::domain::knowledge_base::{
    IndexEntry, IndexName, RetrievalGateway, SearchHit, SearchResult,
};
use crate::domain::{cosine_similarity, DomainError};

const BM25_K1: f32 = 1.2;
const BM25_B: f32 = 0.75;
const BOOST_WEIGHT: f32 = 2.0;

#[derive(Debug)]
struct StoredEntry {
    entry: IndexEntry,
    /// Content tokens under the dictionary of `StoredIndex::generation`
    tokens: Vec<String>,
}

#[derive(Debug, Default)]
struct StoredIndex {
    dimensions: Option<usize>,
    entries: Vec<StoredEntry>,
    generation: u64,
}

impl StoredIndex {
    fn check_dimensions(&self, vector: &[f32]) -> Result<(), DomainError> {
        let expected = self.dimensions.or_else(|| {
            self.entries
                .iter()
                .find_map(|e| e.entry.vector.as_ref().map(Vec::len))
        });

        match expected {
            Some(dims) if dims != vector.len() => Err(DomainError::validation(format!(
                "Vector has {} dimensions, index expects {}",
                vector.len(),
                dims
            ))),
            _ => Ok(()),
        }
    }
}

/// Gateway keeping every index in process memory
///
/// Lexical scoring is BM25 over the crate tokenizer; vector scores are
/// `(1 + cosine) / 2` so they fall in `[0, 1]`.
#[derive(Debug, Default)]
pub struct InMemoryRetrievalGateway {
    tokenizer: Tokenizer,
    indexes: RwLock<HashMap<String, StoredIndex>>,
}

impl InMemoryRetrievalGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokenizer(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            indexes: RwLock::new(HashMap::new()),
        }
    }

    fn terms(&self, text: &str) -> Vec<String> {
        self.tokenizer
            .tokenize(text)
            .into_iter()
            .filter(|t| !is_function_word(t))
            .collect()
    }

    /// Re-tokenize stored content once the dictionary has grown since it was cached
    async fn refresh_tokens(&self, index: &IndexName) {
        let dictionary = self.tokenizer.dictionary();
        let stale = |stored: &StoredIndex| stored.generation != dictionary.generation();

        if !self.indexes.read().await.get(index.as_str()).is_some_and(stale) {
            return;
        }

        let mut indexes = self.indexes.write().await;
        if let Some(stored) = indexes.get_mut(index.as_str()) {
            let generation = dictionary.generation();
            for stored_entry in &mut stored.entries {
                stored_entry.tokens = self.tokenizer.tokenize(&stored_entry.entry.content);
            }
            stored.generation = generation;
        }
    }

    fn not_found(index: &IndexName) -> DomainError {
        DomainError::not_found(format!("Index '{}' not found", index))
    }
}

/// BM25 scorer over one index snapshot
struct Bm25<'a> {
    documents: Vec<&'a [String]>,
    document_frequency: HashMap<&'a str, usize>,
    average_length: f32,
}

impl<'a> Bm25<'a> {
    fn new(documents: Vec<&'a [String]>, terms: &'a [String]) -> Self {
        let mut document_frequency = HashMap::new();
        for term in terms {
            let df = documents.iter().filter(|doc| doc.contains(term)).count();
            document_frequency.insert(term.as_str(), df);
        }

        let total: usize = documents.iter().map(|doc| doc.len()).sum();
        let average_length = if documents.is_empty() {
            0.0
        } else {
            total as f32 / documents.len() as f32
        };

        Self {
            documents,
            document_frequency,
            average_length,
        }
    }

    fn score(&self, doc: usize, terms: &[String]) -> f32 {
        let document = self.documents[doc];
        let n = self.documents.len() as f32;
        let length = document.len() as f32;

        terms
            .iter()
            .map(|term| {
                let tf = document.iter().filter(|t| *t == term).count() as f32;
                if tf == 0.0 {
                    return 0.0;
                }
                let df = self.document_frequency.get(term.as_str()).copied().unwrap_or(0) as f32;
                let idf = (1.0 + (n - df + 0.5) / (df + 0.5)).ln();
                let norm = 1.0 - BM25_B + BM25_B * length / self.average_length.max(1.0);
                idf * tf * (BM25_K1 + 1.0) / (tf + BM25_K1 * norm)
            })
            .sum()
    }
}

#[async_trait]
impl RetrievalGateway for InMemoryRetrievalGateway {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn full_text(
        &self,
        index: &IndexName,
        query: &str,
        boost: &str,
        limit: usize,
    ) -> Result<SearchResult, DomainError> {
        self.refresh_tokens(index).await;

        let indexes = self.indexes.read().await;
        let stored = indexes.get(index.as_str()).ok_or_else(|| Self::not_found(index))?;

        let query_terms = self.terms(query);
        let boost_terms = self.terms(boost);
        let mut all_terms = query_terms.clone();
        all_terms.extend(boost_terms.iter().cloned());

        let documents: Vec<&[String]> = stored.entries.iter().map(|e| e.tokens.as_slice()).collect();
        let bm25 = Bm25::new(documents, &all_terms);

        let mut hits: Vec<SearchHit> = stored
            .entries
            .iter()
            .map(|e| &e.entry)
            .enumerate()
            .filter_map(|(i, entry)| {
                let boost_score = bm25.score(i, &boost_terms);
                if !boost_terms.is_empty() && boost_score == 0.0 {
                    return None;
                }
                let score = BOOST_WEIGHT * boost_score + bm25.score(i, &query_terms);
                (score > 0.0).then(|| SearchHit::new(entry.id.clone(), entry.content.clone(), score))
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);

        Ok(SearchResult::new(hits))
    }

    async fn vector(
        &self,
        index: &IndexName,
        vector: &[f32],
        limit: usize,
    ) -> Result<SearchResult, DomainError> {
        let indexes = self.indexes.read().await;
        let stored = indexes.get(index.as_str()).ok_or_else(|| Self::not_found(index))?;
        stored.check_dimensions(vector)?;

        let mut hits: Vec<SearchHit> = stored
            .entries
            .iter()
            .map(|e| &e.entry)
            .filter_map(|entry| {
                let stored_vector = entry.vector.as_ref()?;
                let score = (1.0 + cosine_similarity(vector, stored_vector)) / 2.0;
                Some(SearchHit::new(entry.id.clone(), entry.content.clone(), score))
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);

        Ok(SearchResult::new(hits))
    }

    async fn create_index(
        &self,
        index: &IndexName,
        dimensions: Option<usize>,
    ) -> Result<bool, DomainError> {
        if dimensions == Some(0) {
            return Err(DomainError::validation("Index dimensions must be greater than 0"));
        }

        let mut indexes = self.indexes.write().await;
        if indexes.contains_key(index.as_str()) {
            return Ok(false);
        }

        indexes.insert(
            index.as_str().to_string(),
            StoredIndex {
                dimensions,
                ..StoredIndex::default()
            },
        );
        Ok(true)
    }

    async fn delete_index(&self, index: &IndexName) -> Result<bool, DomainError> {
        Ok(self.indexes.write().await.remove(index.as_str()).is_some())
    }

    async fn index_exists(&self, index: &IndexName) -> Result<bool, DomainError> {
        Ok(self.indexes.read().await.contains_key(index.as_str()))
    }

    async fn add_entry(&self, index: &IndexName, entry: IndexEntry) -> Result<(), DomainError> {
        let mut indexes = self.indexes.write().await;
        // Writing to a missing index creates it, as the search engine does
        let stored = indexes.entry(index.as_str().to_string()).or_default();

        if let Some(vector) = &entry.vector {
            stored.check_dimensions(vector)?;
        }

        // Tokens cached under an older dictionary are refreshed at query time
        let tokens = self.tokenizer.tokenize(&entry.content);
        let stored_entry = StoredEntry { entry, tokens };
        match stored.entries.iter_mut().find(|e| e.entry.id == stored_entry.entry.id) {
            Some(existing) => *existing = stored_entry,
            None => stored.entries.push(stored_entry),
        }
        Ok(())
    }

    async fn get_entry(
        &self,
        index: &IndexName,
        id: &str,
    ) -> Result<Option<IndexEntry>, DomainError> {
        let indexes = self.indexes.read().await;
        let stored = indexes.get(index.as_str()).ok_or_else(|| Self::not_found(index))?;
        Ok(stored
            .entries
            .iter()
            .find(|e| e.entry.id == id)
            .map(|e| e.entry.clone()))
    }

    async fn delete_entry(&self, index: &IndexName, id: &str) -> Result<bool, DomainError> {
        let mut indexes = self.indexes.write().await;
        let stored = indexes
            .get_mut(index.as_str())
            .ok_or_else(|| Self::not_found(index))?;

        let before = stored.entries.len();
        stored.entries.retain(|e| e.entry.id != id);
        Ok(stored.entries.len() < before)
    }

    async fn list_entries(
        &self,
        index: &IndexName,
        limit: usize,
    ) -> Result<Vec<IndexEntry>, DomainError> {
        let indexes = self.indexes.read().await;
        let stored = indexes.get(index.as_str()).ok_or_else(|| Self::not_found(index))?;
        Ok(stored
            .entries
            .iter()
            .take(limit)
            .map(|e| e.entry.clone())
            .collect())
    }
}
