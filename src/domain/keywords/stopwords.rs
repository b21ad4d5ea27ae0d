//! Generic terms that dominate search pages without being discriminative

use std::collections::HashSet;

pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "百度", "百科", "角色", "简介", "免费", "作品", "com", "分享", "图片", "小说", "-", "_",
    "日", "话", "插入", "漫画", "会", "木", "encyclopedia", "wiki", "wikipedia", "baike",
    "share", "novel", "image", "images", "picture", "free", "introduction", "character",
    "works", "comic", "manga", "www", "http", "https",
];

/// Case-insensitive stop-word filter
#[derive(Debug, Clone)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.words.contains(&word.trim().to_lowercase())
    }

    /// Drop stop words, keeping order
    pub fn remove(&self, words: Vec<String>) -> Vec<String> {
        words.into_iter().filter(|w| !self.is_stop_word(w)).collect()
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::new(DEFAULT_STOP_WORDS)
    }
}
