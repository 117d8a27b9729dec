//! Deterministic stand-in for an embedding model.
//!
//! Vectors are built by feature hashing: every content word and adjacent
//! content-word pair is hashed with SHA-256 into one of [`DIMENSIONS`]
//! buckets with a hash-derived sign, then the vector is L2-normalized.
//! The result captures lexical overlap only. It is not semantic.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use vecready_core::lexicon::content_words;

/// Width of simulated vectors.
pub const DIMENSIONS: usize = 64;

const BIGRAM_WEIGHT: f64 = 0.5;

/// Simulated embedding of `text`, or `None` when it has no content words.
pub fn simulated_embedding(text: &str) -> Option<Vec<f64>> {
    let words = content_words(text);
    if words.is_empty() {
        return None;
    }

    let mut vector = vec![0.0; DIMENSIONS];
    for word in &words {
        add_feature(&mut vector, word, 1.0);
    }
    for pair in words.windows(2) {
        add_feature(&mut vector, &format!("{} {}", pair[0], pair[1]), BIGRAM_WEIGHT);
    }
    normalize(&mut vector);
    Some(vector)
}

fn add_feature(vector: &mut [f64], feature: &str, weight: f64) {
    let digest = Sha256::digest(feature.as_bytes());
    let bucket = u16::from_be_bytes([digest[0], digest[1]]) as usize % vector.len();
    let sign = if digest[2] & 1 == 0 { 1.0 } else { -1.0 };
    vector[bucket] += sign * weight;
}

fn normalize(vector: &mut [f64]) {
    let norm = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > f64::EPSILON {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

/// Cosine similarity between two vectors. Returns 0.0 for zero-length or zero-norm vectors.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dim = a.len().min(b.len());
    if dim == 0 {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for i in 0..dim {
        dot += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f64::EPSILON {
        return 0.0;
    }
    (dot / denom).clamp(-1.0, 1.0)
}

/// Statistics of a chunk's simulated vector, used to refine embedding quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingSimulation {
    pub dimensions: usize,
    /// Cosine similarity between the vectors of the chunk's two halves.
    pub self_similarity: f64,
    /// Share of dimensions with a non-zero component.
    pub spread: f64,
    /// Variance of the normalized components.
    pub variance: f64,
    /// Squared weight of the largest component; near 1.0 when one feature dominates.
    pub peak_share: f64,
    pub score: f64,
}

/// Simulate the chunk's vector and summarize it, or explain why it could
/// not be simulated.
pub fn simulate(text: &str) -> Result<EmbeddingSimulation, String> {
    let vector = simulated_embedding(text)
        .ok_or_else(|| "no content words to embed; heuristic score used".to_string())?;

    let words: Vec<&str> = text.split_whitespace().collect();
    let self_similarity = if words.len() < 2 {
        1.0
    } else {
        let (head, tail) = words.split_at(words.len() / 2);
        match (
            simulated_embedding(&head.join(" ")),
            simulated_embedding(&tail.join(" ")),
        ) {
            (Some(a), Some(b)) => cosine_similarity(&a, &b).max(0.0),
            _ => 0.0,
        }
    };

    let spread = vector.iter().filter(|x| x.abs() > f64::EPSILON).count() as f64 / DIMENSIONS as f64;
    let mean = vector.iter().sum::<f64>() / DIMENSIONS as f64;
    let variance = vector.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / DIMENSIONS as f64;
    let peak_share = vector.iter().map(|x| x * x).fold(0.0, f64::max);

    let score = 100.0 * (0.45 * self_similarity + 0.35 * spread + 0.20 * (1.0 - peak_share));

    Ok(EmbeddingSimulation {
        dimensions: DIMENSIONS,
        self_similarity,
        spread,
        variance,
        peak_share,
        score: score.clamp(0.0, 100.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_is_deterministic_and_normalized() {
        let a = simulated_embedding("vector databases index embeddings").unwrap();
        let b = simulated_embedding("vector databases index embeddings").unwrap();
        assert_eq!(a, b);
        let norm: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn stop_words_only_cannot_be_embedded() {
        assert!(simulated_embedding("the and of it").is_none());
        assert!(simulate("the and of it").is_err());
    }

    #[test]
    fn shared_vocabulary_is_more_similar() {
        let base = simulated_embedding("rust memory safety ownership borrowing").unwrap();
        let close = simulated_embedding("rust ownership and borrowing rules").unwrap();
        let far = simulated_embedding("banana smoothie recipe with yogurt").unwrap();
        assert!(cosine_similarity(&base, &close) > cosine_similarity(&base, &far));
    }

    #[test]
    fn cosine_edge_cases() {
        assert_eq!(cosine_similarity(&[], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn simulation_scores_within_bounds() {
        let sim = simulate("Vector search ranks chunks by similarity. Good chunks rank well in vector search.")
            .unwrap();
        assert_eq!(sim.dimensions, DIMENSIONS);
        assert!(sim.score >= 0.0 && sim.score <= 100.0);
        assert!(sim.spread > 0.0);
    }
}
