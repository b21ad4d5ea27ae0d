//! In-memory passage ranking against a query

use std::collections::HashSet;

use crate::domain::ingestion::Passage;
use crate::domain::keywords::{is_function_word, Tokenizer};

const OVERLAP_WEIGHT: f32 = 0.6;
const EDIT_WEIGHT: f32 = 0.4;

/// Scores passages by query-token recall blended with fuzzy token similarity
#[derive(Debug, Clone, Default)]
pub struct PassageRanker {
    tokenizer: Tokenizer,
}

impl PassageRanker {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }

    fn content_tokens(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.tokenizer
            .tokenize(text)
            .into_iter()
            .filter(|t| !is_function_word(t))
            .filter(|t| seen.insert(t.clone()))
            .collect()
    }

    /// Relevance of `text` to `query` in `[0, 1]`
    pub fn score(&self, query: &str, text: &str) -> f32 {
        let query_tokens = self.content_tokens(query);
        if query_tokens.is_empty() {
            return 0.0;
        }
        let text_tokens = self.content_tokens(text);
        score_tokens(&query_tokens, &text_tokens)
    }

    /// Top `top_k` candidates by score, stable for equal scores
    pub fn rank(&self, candidates: Vec<Passage>, query: &str, top_k: usize) -> Vec<Passage> {
        let query_tokens = self.content_tokens(query);

        let mut scored: Vec<Passage> = candidates
            .into_iter()
            .map(|passage| {
                let score = if query_tokens.is_empty() {
                    0.0
                } else {
                    score_tokens(&query_tokens, &self.content_tokens(&passage.text))
                };
                passage.with_score(score)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .unwrap_or(0.0)
                .total_cmp(&a.score.unwrap_or(0.0))
        });
        scored.truncate(top_k);
        scored
    }
}

fn score_tokens(query: &[String], text: &[String]) -> f32 {
    if text.is_empty() {
        return 0.0;
    }

    let text_set: HashSet<&str> = text.iter().map(String::as_str).collect();
    let overlap = query.iter().filter(|q| text_set.contains(q.as_str())).count() as f32
        / query.len() as f32;

    let fuzzy = query
        .iter()
        .map(|q| {
            text.iter()
                .map(|t| edit_similarity(q, t))
                .fold(0.0_f32, f32::max)
        })
        .sum::<f32>()
        / query.len() as f32;

    OVERLAP_WEIGHT * overlap + EDIT_WEIGHT * fuzzy
}

/// `1 - levenshtein / longer length`, over characters
pub fn edit_similarity(a: &str, b: &str) -> f32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    1.0 - previous[b.len()] as f32 / longest as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passages(texts: &[&str]) -> Vec<Passage> {
        texts.iter().map(|t| Passage::new(*t, "test")).collect()
    }

    #[test]
    fn test_edit_similarity() {
        assert_eq!(edit_similarity("saber", "saber"), 1.0);
        assert_eq!(edit_similarity("", ""), 1.0);
        assert!((edit_similarity("kitten", "sitting") - (1.0 - 3.0 / 7.0)).abs() < 1e-6);
    }

    #[test]
    fn test_rank_prefers_matching_passage() {
        let ranker = PassageRanker::default();
        let ranked = ranker.rank(
            passages(&[
                "Lancer wields a red spear.",
                "Saber wields Excalibur, the sword of promised victory.",
                "Archer fires arrows.",
            ]),
            "What sword does Saber wield?",
            3,
        );

        assert_eq!(ranked.len(), 3);
        assert!(ranked[0].text.starts_with("Saber"));
        assert!(ranked[0].score.unwrap() > ranked[1].score.unwrap());
    }

    #[test]
    fn test_rank_truncates_to_top_k() {
        let ranker = PassageRanker::default();
        let ranked = ranker.rank(passages(&["a b", "c d", "e f", "g h"]), "saber", 3);
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn test_equal_scores_keep_input_order() {
        let ranker = PassageRanker::default();
        let ranked = ranker.rank(passages(&["first", "second"]), "", 2);

        assert_eq!(ranked[0].text, "first");
        assert_eq!(ranked[1].text, "second");
    }

    #[test]
    fn test_score_is_bounded() {
        let ranker = PassageRanker::default();
        let score = ranker.score("saber excalibur", "saber excalibur saber");
        assert!((0.0..=1.0).contains(&score));
        assert!((score - 1.0).abs() < 1e-6);
    }
}
