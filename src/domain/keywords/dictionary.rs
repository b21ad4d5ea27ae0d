//! Custom dictionary of terms the tokenizer must keep whole

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::warn;

/// Upper bound on stored terms; further inserts are ignored
pub const MAX_DICTIONARY_TERMS: usize = 10_000;

/// Process-wide set of multi-word names inserted at keyword-extraction time
///
/// Readers take an immutable [`TermIndex`] snapshot; inserts copy on write.
#[derive(Debug, Default)]
pub struct CustomDictionary {
    inner: RwLock<Arc<TermIndex>>,
    generation: AtomicU64,
    full: AtomicBool,
}

/// Lowercased terms bucketed by first character, longest first in each bucket
#[derive(Debug, Clone, Default)]
pub struct TermIndex {
    seen: HashSet<String>,
    by_first_char: HashMap<char, Vec<String>>,
}

impl TermIndex {
    /// Candidate terms for a match beginning with `c`
    pub fn starting_with(&self, c: char) -> &[String] {
        self.by_first_char.get(&c).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl CustomDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let dictionary = Self::new();
        for term in terms {
            dictionary.insert(term.as_ref());
        }
        dictionary
    }

    /// Insert a term; returns false when it was blank, known, or the dictionary is full
    pub fn insert(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        let Some(first) = term.chars().next() else {
            return false;
        };

        let Ok(mut inner) = self.inner.write() else {
            return false;
        };

        if inner.seen.contains(&term) {
            return false;
        }
        if inner.seen.len() >= MAX_DICTIONARY_TERMS {
            if !self.full.swap(true, Ordering::Relaxed) {
                warn!(limit = MAX_DICTIONARY_TERMS, term = %term, "Custom dictionary full; ignoring new terms");
            }
            return false;
        }

        let index = Arc::make_mut(&mut *inner);
        index.seen.insert(term.clone());

        let len = term.chars().count();
        let bucket = index.by_first_char.entry(first).or_default();
        let position = bucket.partition_point(|existing| existing.chars().count() >= len);
        bucket.insert(position, term);

        self.generation.fetch_add(1, Ordering::Release);
        true
    }

    pub fn contains(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        self.snapshot().seen.contains(&term)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current terms; later inserts do not affect the returned index
    pub fn snapshot(&self) -> Arc<TermIndex> {
        self.inner
            .read()
            .map(|inner| Arc::clone(&inner))
            .unwrap_or_default()
    }

    /// Bumped on every successful insert
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}
