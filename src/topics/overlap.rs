// Cosine similarity for topic overlap scoring.
//
// Compares two sparse keyword weight maps. The dot product only runs over the
// keywords both sides share, but each norm covers that side's full weight set,
// so vocabulary the other side never uses pulls the score down:
//
//   sum(a[k] * b[k] for shared k) / (|a| * |b|)
//
// With non-negative term frequencies this lands in [0, 1]: 0.0 for disjoint
// vocabularies, 1.0 for proportional ones.

use std::collections::HashMap;

use super::vector::TermFrequencyVector;

/// Cosine similarity between two term-frequency vectors.
pub fn cosine_similarity(a: &TermFrequencyVector, b: &TermFrequencyVector) -> f64 {
    cosine_from_weights(a.weights(), b.weights())
}

/// Cosine similarity from raw keyword weight maps.
///
/// Returns 0.0 when the maps share no keyword or either norm is (near) zero;
/// degenerate input never produces NaN. Sums run over keys in sorted order,
/// so the result is bit-identical across calls and argument order.
pub fn cosine_from_weights(
    weights_a: &HashMap<String, f64>,
    weights_b: &HashMap<String, f64>,
) -> f64 {
    let mut shared: Vec<&String> = weights_a
        .keys()
        .filter(|key| weights_b.contains_key(*key))
        .collect();

    if shared.is_empty() {
        return 0.0;
    }
    shared.sort_unstable();

    let dot: f64 = shared.iter().map(|key| weights_a[*key] * weights_b[*key]).sum();
    let denom = norm(weights_a) * norm(weights_b);
    if denom < f64::EPSILON {
        0.0
    } else {
        (dot / denom).clamp(0.0, 1.0)
    }
}

/// Euclidean norm of a weight map, summed in key order.
fn norm(weights: &HashMap<String, f64>) -> f64 {
    let mut entries: Vec<(&String, &f64)> = weights.iter().collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
    entries.iter().map(|(_, w)| *w * *w).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topics::vector::to_vector;

    #[test]
    fn test_identical_vectors() {
        let v = to_vector(&["asyncio", "event", "loop", "asyncio"]);
        let score = cosine_similarity(&v, &v);
        assert!(
            (score - 1.0).abs() < 1e-9,
            "Identical vectors should score ~1.0, got {score}"
        );
    }

    #[test]
    fn test_no_overlap() {
        let a = to_vector(&["asyncio", "aiohttp"]);
        let b = to_vector(&["ラーメン", "食べる"]);
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        // a = {asyncio: 1/2, 使う: 1/2}, b = {asyncio: 1/2, loop: 1/2}
        // dot = 1/4, |a| = |b| = sqrt(1/2), cos = 0.5
        let a = to_vector(&["asyncio", "使う"]);
        let b = to_vector(&["asyncio", "loop"]);
        let score = cosine_similarity(&a, &b);
        assert!((score - 0.5).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn test_norm_covers_unshared_terms() {
        // Extra unshared vocabulary on one side lowers the score
        let a = to_vector(&["asyncio"]);
        let narrow = to_vector(&["asyncio"]);
        let wide = to_vector(&["asyncio", "event", "loop", "動く"]);
        assert!(cosine_similarity(&a, &wide) < cosine_similarity(&a, &narrow));
    }

    #[test]
    fn test_empty_vectors() {
        let empty = to_vector::<&str>(&[]);
        let v = to_vector(&["asyncio"]);
        assert_eq!(cosine_similarity(&empty, &empty), 0.0);
        assert_eq!(cosine_similarity(&empty, &v), 0.0);
        assert_eq!(cosine_similarity(&v, &empty), 0.0);
    }
}
