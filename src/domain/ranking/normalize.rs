use crate::domain::knowledge_base::SearchResult;

/// Keep hits whose score relative to the best hit exceeds `cutoff`
pub fn normalize_by_top_score(result: SearchResult, cutoff: f32) -> SearchResult {
    let Some(top) = result.top_score() else {
        return result;
    };
    if top.is_nan() || top <= 0.0 {
        return SearchResult::empty();
    }

    result
        .hits
        .into_iter()
        .filter(|hit| hit.score / top > cutoff)
        .collect()
}
