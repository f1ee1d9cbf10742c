/// Cosine similarity in `[-1, 1]`.
///
/// Returns `0.0` when either vector has zero magnitude, and also when the
/// lengths disagree, so callers never have to handle a failure here.
pub fn cosine_similarity(query: &[f32], candidate: &[f32]) -> f32 {
    if query.is_empty() || query.len() != candidate.len() {
        return 0.0;
    }

    let dot: f32 = query.iter().zip(candidate).map(|(a, b)| a * b).sum();
    let denom = l2_norm(query) * l2_norm(candidate);
    if denom <= f32::EPSILON {
        return 0.0;
    }

    (dot / denom).clamp(-1.0, 1.0)
}

/// Best similarity of `query` against `candidates`; `0.0` for an empty set.
pub fn max_similarity<'a, I>(query: &[f32], candidates: I) -> f32
where
    I: IntoIterator<Item = &'a Vec<f32>>,
{
    candidates
        .into_iter()
        .map(|candidate| cosine_similarity(query, candidate))
        .reduce(f32::max)
        .unwrap_or(0.0)
}

fn l2_norm(vector: &[f32]) -> f32 {
    vector.iter().map(|x| x * x).sum::<f32>().sqrt()
}
