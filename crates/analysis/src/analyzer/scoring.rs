//! Weights and cutoffs for the composite score. The defaults are
//! hand-tuned; callers may recalibrate.

use serde::{Deserialize, Serialize};

use super::types::Priority;

/// Default composite weights: coherence=0.25, density=0.20, embedding=0.20,
/// completeness=0.15, retrieval=0.20.
pub const WEIGHT_SEMANTIC_COHERENCE: f64 = 0.25;
pub const WEIGHT_INFORMATION_DENSITY: f64 = 0.20;
pub const WEIGHT_EMBEDDING_QUALITY: f64 = 0.20;
pub const WEIGHT_CONTEXTUAL_COMPLETENESS: f64 = 0.15;
pub const WEIGHT_RETRIEVAL_OPTIMIZATION: f64 = 0.20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringWeights {
    pub semantic_coherence: f64,
    pub information_density: f64,
    pub embedding_quality: f64,
    pub contextual_completeness: f64,
    pub retrieval_optimization: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            semantic_coherence: WEIGHT_SEMANTIC_COHERENCE,
            information_density: WEIGHT_INFORMATION_DENSITY,
            embedding_quality: WEIGHT_EMBEDDING_QUALITY,
            contextual_completeness: WEIGHT_CONTEXTUAL_COMPLETENESS,
            retrieval_optimization: WEIGHT_RETRIEVAL_OPTIMIZATION,
        }
    }
}

impl ScoringWeights {
    /// Weighted sum of the five sub-scores in declaration order.
    pub fn combine(&self, scores: [u8; 5]) -> f64 {
        let weights = [
            self.semantic_coherence,
            self.information_density,
            self.embedding_quality,
            self.contextual_completeness,
            self.retrieval_optimization,
        ];
        scores
            .iter()
            .zip(weights)
            .map(|(s, w)| *s as f64 * w)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringThresholds {
    /// Sub-scores below this produce a high-priority recommendation.
    pub high_priority_below: u8,
    pub medium_priority_below: u8,
    /// Sub-scores at or above this produce no recommendation.
    pub low_priority_below: u8,
    /// Chunks under this many words are flagged too short.
    pub min_words: usize,
    /// Chunks over this many words are flagged too long.
    pub max_words: usize,
    /// Topic shifts at which a chunk is flagged incoherent.
    pub topic_shift_flag: usize,
    pub low_density_flag: u8,
}

impl Default for ScoringThresholds {
    fn default() -> Self {
        Self {
            high_priority_below: 40,
            medium_priority_below: 60,
            low_priority_below: 75,
            min_words: 50,
            max_words: 500,
            topic_shift_flag: 2,
            low_density_flag: 40,
        }
    }
}

impl ScoringThresholds {
    /// Priority for a sub-score, or `None` when it needs no attention.
    pub fn priority_for(&self, score: u8) -> Option<Priority> {
        if score < self.high_priority_below {
            Some(Priority::High)
        } else if score < self.medium_priority_below {
            Some(Priority::Medium)
        } else if score < self.low_priority_below {
            Some(Priority::Low)
        } else {
            None
        }
    }
}
