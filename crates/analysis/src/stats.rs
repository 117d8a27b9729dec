//! Aggregate statistics over a batch of analysis results.
//!
//! Averages per sub-score, spread of the overall score, size outliers,
//! readiness band counts and the recommendation categories that come up
//! most often.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use vecready_core::Chunk;

use crate::analyzer::{AnalysisResult, ReadinessBand, RecommendationCategory};

/// Word count below which a chunk counts as undersized.
pub const UNDERSIZED_WORDS: usize = 50;
/// Word count above which a chunk counts as oversized.
pub const OVERSIZED_WORDS: usize = 500;
const TOP_CATEGORIES: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreAverages {
    pub semantic_coherence: f64,
    pub information_density: f64,
    pub embedding_quality: f64,
    pub contextual_completeness: f64,
    pub retrieval_optimization: f64,
    pub overall: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub category: RecommendationCategory,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStatistics {
    /// Chunks submitted.
    pub chunk_count: usize,
    /// Chunks that finished before cancellation.
    pub analyzed_count: usize,
    pub averages: ScoreAverages,
    pub overall_variance: f64,
    pub overall_std_dev: f64,
    pub undersized: usize,
    pub oversized: usize,
    /// Count per readiness band, best band first.
    pub status_counts: IndexMap<ReadinessBand, usize>,
    /// Most frequent recommendation categories, most frequent first.
    pub top_categories: Vec<CategoryCount>,
}

impl BatchStatistics {
    /// Summarize analyzed chunks. `chunk_count` is the size of the submitted
    /// batch, which exceeds the analyzed count after cancellation.
    pub fn from_analyzed<'a, I>(analyzed: I, chunk_count: usize) -> Self
    where
        I: IntoIterator<Item = (&'a Chunk, &'a AnalysisResult)>,
    {
        let mut status_counts: IndexMap<ReadinessBand, usize> = [
            ReadinessBand::Excellent,
            ReadinessBand::Good,
            ReadinessBand::Fair,
            ReadinessBand::Poor,
        ]
        .into_iter()
        .map(|band| (band, 0))
        .collect();
        let mut categories: IndexMap<RecommendationCategory, usize> = IndexMap::new();
        let mut sums = ScoreAverages::default();
        let mut overall_scores: Vec<f64> = Vec::new();
        let mut undersized = 0;
        let mut oversized = 0;

        for (chunk, result) in analyzed {
            sums.semantic_coherence += result.semantic_coherence.score as f64;
            sums.information_density += result.information_density.score as f64;
            sums.embedding_quality += result.embedding_quality.score as f64;
            sums.contextual_completeness += result.contextual_completeness.score as f64;
            sums.retrieval_optimization += result.retrieval_optimization.score as f64;
            sums.overall += result.overall_score as f64;
            overall_scores.push(result.overall_score as f64);

            if chunk.word_count < UNDERSIZED_WORDS {
                undersized += 1;
            } else if chunk.word_count > OVERSIZED_WORDS {
                oversized += 1;
            }
            *status_counts.entry(result.status).or_default() += 1;
            for rec in &result.recommendations {
                *categories.entry(rec.category).or_default() += 1;
            }
        }

        let analyzed_count = overall_scores.len();
        let (averages, overall_variance) = if analyzed_count == 0 {
            (ScoreAverages::default(), 0.0)
        } else {
            let n = analyzed_count as f64;
            let averages = ScoreAverages {
                semantic_coherence: sums.semantic_coherence / n,
                information_density: sums.information_density / n,
                embedding_quality: sums.embedding_quality / n,
                contextual_completeness: sums.contextual_completeness / n,
                retrieval_optimization: sums.retrieval_optimization / n,
                overall: sums.overall / n,
            };
            let variance = overall_scores
                .iter()
                .map(|s| (s - averages.overall).powi(2))
                .sum::<f64>()
                / n;
            (averages, variance)
        };

        let mut ranked: Vec<CategoryCount> = categories
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect();
        // Stable: ties keep first-seen order.
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(TOP_CATEGORIES);

        Self {
            chunk_count,
            analyzed_count,
            averages,
            overall_variance,
            overall_std_dev: overall_variance.sqrt(),
            undersized,
            oversized,
            status_counts,
            top_categories: ranked,
        }
    }
}
