use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::embedding::EmbeddingSimulation;
use crate::platform::PlatformAssessment;
use crate::retrieval::RetrievalSimulation;

/// One scored dimension: an integer 0-100 plus dimension-specific details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubScore<D> {
    pub score: u8,
    pub details: D,
}

impl<D> SubScore<D> {
    pub(crate) fn new(score: f64, details: D) -> Self {
        Self {
            score: clamp_score(score),
            details,
        }
    }
}

/// Round and clamp a raw score into 0..=100.
pub(crate) fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoherenceDetails {
    pub sentence_count: usize,
    /// Mean content-word overlap between consecutive sentences.
    pub average_overlap: f64,
    pub transition_count: usize,
    pub transition_ratio: f64,
    pub topic_shifts: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityDetails {
    pub word_count: usize,
    pub content_word_ratio: f64,
    pub lexical_diversity: f64,
    pub technical_terms: usize,
    pub technical_density: f64,
    pub informative_sentence_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingDetails {
    pub length_score: f64,
    pub structure_score: f64,
    pub vocabulary_score: f64,
    /// Formatting artifacts found in the text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation: Option<EmbeddingSimulation>,
    /// Why deep simulation did not contribute, when it was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degradation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletenessDetails {
    pub has_introduction: bool,
    pub has_conclusion: bool,
    pub supporting_details: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dangling_references: Vec<String>,
    /// Share of the expected metadata fields present (0.0-1.0).
    pub metadata_coverage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalDetails {
    pub tag_count: usize,
    pub tag_quality: f64,
    pub question_cues: usize,
    pub concept_density: f64,
    pub structural_markers: usize,
}

/// Recommendation urgency. Orders `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    Size,
    Coherence,
    Density,
    Embedding,
    Context,
    Metadata,
    Retrieval,
}

impl RecommendationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationCategory::Size => "size",
            RecommendationCategory::Coherence => "coherence",
            RecommendationCategory::Density => "density",
            RecommendationCategory::Embedding => "embedding",
            RecommendationCategory::Context => "context",
            RecommendationCategory::Metadata => "metadata",
            RecommendationCategory::Retrieval => "retrieval",
        }
    }
}

impl fmt::Display for RecommendationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected gain in overall points if the recommendation is followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImprovementRange {
    pub min: u8,
    pub max: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub priority: Priority,
    pub category: RecommendationCategory,
    pub title: String,
    pub detail: String,
    pub estimated_improvement: ImprovementRange,
}

/// Threshold-triggered annotations, independent of recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityFlag {
    TooShort,
    TooLong,
    SingleSentence,
    MultipleTopicShifts,
    LowInformationDensity,
    FormattingArtifacts,
    DanglingReferences,
    MissingMetadata,
    Untagged,
    Overshoot,
}

/// Banded label for a 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ReadinessBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            85..=u8::MAX => ReadinessBand::Excellent,
            70..=84 => ReadinessBand::Good,
            50..=69 => ReadinessBand::Fair,
            _ => ReadinessBand::Poor,
        }
    }
}

/// Full readiness analysis of one chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub chunk_id: String,
    pub semantic_coherence: SubScore<CoherenceDetails>,
    pub information_density: SubScore<DensityDetails>,
    pub embedding_quality: SubScore<EmbeddingDetails>,
    pub contextual_completeness: SubScore<CompletenessDetails>,
    pub retrieval_optimization: SubScore<RetrievalDetails>,
    pub overall_score: u8,
    pub status: ReadinessBand,
    pub recommendations: Vec<Recommendation>,
    pub quality_flags: Vec<QualityFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_compatibility: Option<IndexMap<String, PlatformAssessment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieval_simulation: Option<RetrievalSimulation>,
}
