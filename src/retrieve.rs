//! Cosine-similarity retrieval over a document's units.
//!
//! A pure, side-effect-free ranking: score every unit against the query
//! embedding, sort descending, truncate to K. Ties keep the original unit
//! order (stable sort), and degenerate vectors score `0.0` rather than
//! erroring, so a unit that was never embedded simply ranks last.

use crate::models::RetrievableUnit;

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`. Empty vectors, zero-magnitude vectors,
/// and length mismatches all yield `0.0`, never an error.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}

/// Rank `units` against `query_vec` and return up to `k` of them, highest
/// similarity first.
///
/// If fewer than `k` units exist, all are returned. Ties break by original
/// unit order. Input is not mutated.
pub fn top_k<'a>(
    units: &'a [RetrievableUnit],
    query_vec: &[f32],
    k: usize,
) -> Vec<&'a RetrievableUnit> {
    let mut scored: Vec<(f32, &RetrievableUnit)> = units
        .iter()
        .map(|unit| (cosine_similarity(&unit.embedding, query_vec), unit))
        .collect();

    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(k);

    scored.into_iter().map(|(_, unit)| unit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(id: &str, page: u32, embedding: Vec<f32>) -> RetrievableUnit {
        RetrievableUnit {
            id: id.to_string(),
            page,
            text: String::new(),
            embedding,
        }
    }

    #[test]
    fn test_cosine_identical() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_degenerate_vectors() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_top_k_orders_by_similarity() {
        let units = vec![
            unit("p1", 1, vec![1.0, 0.0]),
            unit("p2", 2, vec![0.0, 1.0]),
            unit("p3", 3, vec![0.9, 0.1]),
        ];
        let top = top_k(&units, &[1.0, 0.0], 2);
        let ids: Vec<&str> = top.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3"]);
    }

    #[test]
    fn test_top_k_larger_than_input_returns_all() {
        let units = vec![
            unit("p1", 1, vec![1.0, 0.0]),
            unit("p2", 2, vec![1.0, 0.0]),
        ];
        let top = top_k(&units, &[0.0, 1.0], 10);
        // All tied at 0.0; original order preserved.
        let ids: Vec<&str> = top.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[test]
    fn test_top_k_ties_keep_input_order() {
        let units = vec![
            unit("p1", 1, vec![1.0, 0.0]),
            unit("p2", 2, vec![1.0, 0.0]),
            unit("p3", 3, vec![1.0, 0.0]),
        ];
        let top = top_k(&units, &[1.0, 0.0], 2);
        let ids: Vec<&str> = top.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[test]
    fn test_top_k_empty_units() {
        let units: Vec<RetrievableUnit> = Vec::new();
        assert!(top_k(&units, &[1.0], 5).is_empty());
    }

    #[test]
    fn test_top_k_does_not_mutate_input() {
        let units = vec![
            unit("p1", 1, vec![0.0, 1.0]),
            unit("p2", 2, vec![1.0, 0.0]),
        ];
        let _ = top_k(&units, &[1.0, 0.0], 1);
        assert_eq!(units[0].id, "p1");
        assert_eq!(units[1].id, "p2");
    }
}
