//! Fuzzy Jaccard similarity between keyword sets

/// Two keywords match when one equals or contains the other, ignoring case
fn fuzzy_match(a: &str, b: &str) -> bool {
    a == b || a.contains(b) || b.contains(a)
}

fn normalized_set<S: AsRef<str>>(words: &[S]) -> Vec<String> {
    let mut set: Vec<String> = Vec::with_capacity(words.len());
    for word in words {
        let word = word.as_ref().trim().to_lowercase();
        if !word.is_empty() && !set.contains(&word) {
            set.push(word);
        }
    }
    set
}

/// Fuzzy Jaccard similarity in `[0, 1]`
///
/// The intersection counts keywords of `a` with a fuzzy match in `b`. The
/// union counts every keyword of `a` plus the keywords of `b` that match
/// nothing in `a`, so a fuzzy pair is counted once. Two empty sets are
/// vacuously identical and score 1.0.
pub fn fuzzy_jaccard<A: AsRef<str>, B: AsRef<str>>(a: &[A], b: &[B]) -> f32 {
    let a = normalized_set(a);
    let b = normalized_set(b);

    let intersection = a
        .iter()
        .filter(|x| b.iter().any(|y| fuzzy_match(x, y)))
        .count();
    let unmatched_b = b
        .iter()
        .filter(|y| !a.iter().any(|x| fuzzy_match(x, y)))
        .count();
    let union = a.len() + unmatched_b;

    if union == 0 {
        return 1.0;
    }

    intersection as f32 / union as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_sets_score_one() {
        let a = ["Saber", "Excalibur", "Camelot"];
        assert_eq!(fuzzy_jaccard(&a, &a), 1.0);
    }

    #[test]
    fn test_empty_sets_are_vacuously_similar() {
        let empty: [&str; 0] = [];
        assert_eq!(fuzzy_jaccard(&empty, &empty), 1.0);
    }

    #[test]
    fn test_one_empty_side_scores_zero() {
        let empty: [&str; 0] = [];
        assert_eq!(fuzzy_jaccard(&["saber"], &empty), 0.0);
        assert_eq!(fuzzy_jaccard(&empty, &["saber"]), 0.0);
    }

    #[test]
    fn test_containment_counts_as_match() {
        assert_eq!(fuzzy_jaccard(&["cat"], &["cats"]), 1.0);
        assert_eq!(fuzzy_jaccard(&["CATS"], &["cat"]), 1.0);
    }

    #[test]
    fn test_partial_overlap() {
        let score = fuzzy_jaccard(&["saber", "excalibur"], &["saber", "lancer"]);
        // one match, union of three
        assert!((score - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_score_is_bounded() {
        let score = fuzzy_jaccard(&["a", "ab", "abc"], &["abcd"]);
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn test_default_gate_threshold() {
        assert!(fuzzy_jaccard(&["saber", "excalibur"], &["saber", "lancer"]) >= 0.3);
        assert!(fuzzy_jaccard(&["saber"], &["lancer", "archer"]) < 0.3);
    }
}
