//! TextRank keyword extraction over a sliding co-occurrence window

use std::collections::{BTreeSet, HashMap};

use super::tokenizer::{is_function_word, Tokenizer};

const DEFAULT_WINDOW: usize = 5;
const DEFAULT_DAMPING: f64 = 0.85;
const DEFAULT_MAX_ITERATIONS: usize = 200;
const DEFAULT_MIN_DIFF: f64 = 0.001;

#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    tokenizer: Tokenizer,
    window: usize,
    damping: f64,
    max_iterations: usize,
    min_diff: f64,
}

impl KeywordExtractor {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            window: DEFAULT_WINDOW,
            damping: DEFAULT_DAMPING,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            min_diff: DEFAULT_MIN_DIFF,
        }
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Top `top_n` keywords, best first; ties keep first-occurrence order
    pub fn extract(&self, text: &str, top_n: usize) -> Vec<String> {
        if top_n == 0 {
            return Vec::new();
        }

        let words: Vec<String> = self
            .tokenizer
            .tokenize(text)
            .into_iter()
            .filter(|t| !is_function_word(t))
            .collect();

        if words.is_empty() {
            return Vec::new();
        }

        let mut vocabulary: Vec<String> = Vec::new();
        let mut ids: HashMap<&str, usize> = HashMap::new();
        let sequence: Vec<usize> = words
            .iter()
            .map(|w| {
                *ids.entry(w.as_str()).or_insert_with(|| {
                    vocabulary.push(w.clone());
                    vocabulary.len() - 1
                })
            })
            .collect();

        let neighbours = self.co_occurrence(&sequence, vocabulary.len());
        let scores = self.rank(&neighbours);

        let mut order: Vec<usize> = (0..vocabulary.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));

        order
            .into_iter()
            .take(top_n)
            .map(|id| vocabulary[id].clone())
            .collect()
    }

    fn co_occurrence(&self, sequence: &[usize], size: usize) -> Vec<BTreeSet<usize>> {
        let mut neighbours = vec![BTreeSet::new(); size];

        for (i, &word) in sequence.iter().enumerate() {
            for &other in sequence.iter().skip(i + 1).take(self.window - 1) {
                if word != other {
                    neighbours[word].insert(other);
                    neighbours[other].insert(word);
                }
            }
        }

        neighbours
    }

    fn rank(&self, neighbours: &[BTreeSet<usize>]) -> Vec<f64> {
        let mut scores = vec![1.0; neighbours.len()];

        for _ in 0..self.max_iterations {
            let mut next = vec![1.0 - self.damping; neighbours.len()];
            let mut max_diff: f64 = 0.0;

            for (word, links) in neighbours.iter().enumerate() {
                let incoming: f64 = links
                    .iter()
                    .map(|&other| scores[other] / neighbours[other].len() as f64)
                    .sum();
                next[word] += self.damping * incoming;
                max_diff = max_diff.max((next[word] - scores[word]).abs());
            }

            scores = next;
            if max_diff <= self.min_diff {
                break;
            }
        }

        scores
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(Tokenizer::default())
    }
}
