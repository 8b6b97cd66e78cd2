// Term-frequency vectors.
//
// A keyword sequence becomes a discrete distribution over its distinct terms:
// each term's weight is its count divided by the sequence length. No IDF; the
// comparison only ever spans one short window of conversation.

use std::collections::HashMap;

/// Immutable term → relative frequency mapping.
///
/// Weights are non-negative and sum to 1.0, or the vector is empty. Terms are
/// also kept in first-occurrence order so that anything reading "the first few
/// terms" gets the same answer on every run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermFrequencyVector {
    weights: HashMap<String, f64>,
    order: Vec<String>,
}

impl TermFrequencyVector {
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn weight(&self, term: &str) -> Option<f64> {
        self.weights.get(term).copied()
    }

    /// The raw weight map, for similarity computations.
    pub fn weights(&self) -> &HashMap<String, f64> {
        &self.weights
    }

    /// Distinct terms in order of first occurrence.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// The first `n` distinct terms in order of first occurrence.
    pub fn leading_terms(&self, n: usize) -> Vec<String> {
        self.order.iter().take(n).cloned().collect()
    }
}

/// Build a term-frequency vector from a keyword sequence.
pub fn to_vector<S: AsRef<str>>(keywords: &[S]) -> TermFrequencyVector {
    if keywords.is_empty() {
        return TermFrequencyVector::default();
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order = Vec::new();
    for keyword in keywords {
        let keyword = keyword.as_ref();
        match counts.get_mut(keyword) {
            Some(count) => *count += 1,
            None => {
                counts.insert(keyword.to_string(), 1);
                order.push(keyword.to_string());
            }
        }
    }

    let total = keywords.len() as f64;
    let weights = counts
        .into_iter()
        .map(|(term, count)| (term, count as f64 / total))
        .collect();

    TermFrequencyVector { weights, order }
}
