//! Quality analyzer: scores a chunk's readiness for embedding and explains
//! the score.
//!
//! Sub-modules:
//! - [`signals`]: the five sub-score scorers
//! - [`recommendations`]: prioritized advice and quality flags
//! - [`scoring`]: composite weights and thresholds
//! - [`types`]: result records

pub mod recommendations;
pub mod scoring;
pub mod signals;
pub mod types;


use serde::{Deserialize, Serialize};
use tracing::debug;
use vecready_core::config::AnalysisSettings;
use vecready_core::Chunk;

use crate::platform::assess_platforms;
use crate::retrieval::RetrievalSimulator;
use recommendations::{quality_flags, recommendations, Scored};

pub use scoring::{ScoringThresholds, ScoringWeights};
pub use types::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzerOptions {
    /// Blend simulated-embedding statistics into embedding quality and
    /// retrieval similarity.
    pub deep_simulation: bool,
    pub retrieval_simulation: bool,
    pub retrieval_seed: u64,
    pub weights: ScoringWeights,
    pub thresholds: ScoringThresholds,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            deep_simulation: false,
            retrieval_simulation: true,
            retrieval_seed: 42,
            weights: ScoringWeights::default(),
            thresholds: ScoringThresholds::default(),
        }
    }
}

impl From<&AnalysisSettings> for AnalyzerOptions {
    fn from(settings: &AnalysisSettings) -> Self {
        Self {
            deep_simulation: settings.deep_simulation,
            retrieval_seed: settings.retrieval_seed,
            ..Self::default()
        }
    }
}

/// Stateless scorer; every call with the same chunk content and platform
/// set yields the same result.
#[derive(Debug, Clone, Default)]
pub struct QualityAnalyzer {
    options: AnalyzerOptions,
}

impl QualityAnalyzer {
    pub fn new(options: AnalyzerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    pub fn analyze<S: AsRef<str>>(&self, chunk: &Chunk, platforms: &[S]) -> AnalysisResult {
        let text = chunk.content.as_str();
        let opts = &self.options;

        let coherence = signals::semantic_coherence(text);
        let density = signals::information_density(text);
        let embedding = signals::embedding_quality(text, opts.deep_simulation);
        let completeness = signals::contextual_completeness(chunk);
        let retrieval = signals::retrieval_optimization(chunk);

        let overall_score = clamp_score(opts.weights.combine([
            coherence.score,
            density.score,
            embedding.score,
            completeness.score,
            retrieval.score,
        ]));

        let scored = Scored {
            coherence: &coherence,
            density: &density,
            embedding: &embedding,
            completeness: &completeness,
            retrieval: &retrieval,
        };
        let recommendations = recommendations(chunk, &scored, &opts.weights, &opts.thresholds);
        let quality_flags = quality_flags(chunk, &scored, &opts.thresholds);

        let platform_compatibility = Some(assess_platforms(chunk, platforms)).filter(|m| !m.is_empty());
        let retrieval_simulation = opts.retrieval_simulation.then(|| {
            RetrievalSimulator::new(opts.retrieval_seed)
                .with_embeddings(opts.deep_simulation)
                .simulate(chunk)
        });

        debug!(
            chunk = %chunk.id,
            overall = overall_score,
            recommendations = recommendations.len(),
            flags = quality_flags.len(),
            "chunk analyzed"
        );

        AnalysisResult {
            chunk_id: chunk.id.clone(),
            semantic_coherence: coherence,
            information_density: density,
            embedding_quality: embedding,
            contextual_completeness: completeness,
            retrieval_optimization: retrieval,
            overall_score,
            status: ReadinessBand::from_score(overall_score),
            recommendations,
            quality_flags,
            platform_compatibility,
            retrieval_simulation,
        }
    }
}
