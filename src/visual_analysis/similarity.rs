use super::{Asset, SimilarityResult};

/// Cosine of the angle between two vectors.
///
/// Vectors of different length are incomparable and score 0, as does any
/// pair involving a zero vector (including a zero vector with itself).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())) as f32
}

/// Up to `top_k` completed, embedded candidates ranked by similarity to
/// `target`. The target itself never appears; equal scores keep input order.
pub fn find_similar<'a>(
    target: &Asset,
    candidates: &'a [Asset],
    top_k: usize,
) -> Vec<SimilarityResult<'a>> {
    let Some(query) = target.embedding.as_deref() else {
        return Vec::new();
    };

    let mut results: Vec<SimilarityResult<'a>> = candidates
        .iter()
        .filter(|candidate| !std::ptr::eq(*candidate, target) && candidate.id != target.id)
        .filter(|candidate| candidate.is_completed())
        .filter_map(|candidate| {
            let embedding = candidate.embedding.as_deref()?;
            Some(SimilarityResult {
                asset: candidate,
                score: cosine_similarity(query, embedding),
            })
        })
        .collect();

    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(top_k);
    results
}
