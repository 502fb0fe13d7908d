//! Similarity scoring and metadata filtering.
//!
//! All scoring functions are total: mismatched or empty inputs score as 0
//! (cosine, dot) or distance 0 (euclidean) instead of failing.

use std::collections::HashMap;

use super::SearchStrategy;

/// Compute cosine similarity between two vectors
///
/// Returns a value between -1.0 and 1.0, where 1.0 means identical,
/// 0.0 means orthogonal, and -1.0 means opposite.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Raw dot product
pub fn dot_product(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    a.iter()
        .zip(b)
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum()
}

/// L2 distance
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = f64::from(*x) - f64::from(*y);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Score `candidate` against `query`; higher is always better.
pub fn score(strategy: SearchStrategy, query: &[f32], candidate: &[f32]) -> f64 {
    match strategy {
        SearchStrategy::Cosine => cosine_similarity(query, candidate),
        SearchStrategy::DotProduct => dot_product(query, candidate),
        SearchStrategy::Euclidean => -euclidean_distance(query, candidate),
    }
}

/// Render a metadata value for comparison: strings as their raw text,
/// everything else as JSON.
pub fn stringify(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// True when every filter entry is present in `metadata` with an equal
/// stringified value. An empty filter matches everything, including
/// documents without metadata.
pub fn matches_filter(
    metadata: &HashMap<String, serde_json::Value>,
    filter: &HashMap<String, serde_json::Value>,
) -> bool {
    filter.iter().all(|(key, wanted)| {
        metadata
            .get(key)
            .is_some_and(|actual| stringify(actual) == stringify(wanted))
    })
}
