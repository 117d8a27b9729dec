//! Recommendation and quality-flag generation from finished sub-scores.

use vecready_core::Chunk;

use super::scoring::{ScoringThresholds, ScoringWeights};
use super::types::{
    CoherenceDetails, CompletenessDetails, DensityDetails, EmbeddingDetails, ImprovementRange, Priority,
    QualityFlag, Recommendation, RecommendationCategory, RetrievalDetails, SubScore,
};

/// Sub-score a recommendation aims to lift a dimension to.
const TARGET_SCORE: u8 = 80;

pub(crate) struct Scored<'a> {
    pub coherence: &'a SubScore<CoherenceDetails>,
    pub density: &'a SubScore<DensityDetails>,
    pub embedding: &'a SubScore<EmbeddingDetails>,
    pub completeness: &'a SubScore<CompletenessDetails>,
    pub retrieval: &'a SubScore<RetrievalDetails>,
}

/// Recommendations sorted by priority, highest first. Equal priorities keep
/// generation order: size, coherence, density, embedding, context, retrieval.
pub(crate) fn recommendations(
    chunk: &Chunk,
    scored: &Scored<'_>,
    weights: &ScoringWeights,
    thresholds: &ScoringThresholds,
) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    if chunk.word_count < thresholds.min_words {
        recs.push(Recommendation {
            priority: Priority::High,
            category: RecommendationCategory::Size,
            title: "Chunk too small".to_string(),
            detail: format!(
                "Only {} words. Merge with neighbouring content or raise the chunk size so it reaches at least {} words.",
                chunk.word_count, thresholds.min_words
            ),
            estimated_improvement: ImprovementRange { min: 10, max: 25 },
        });
    } else if chunk.word_count > thresholds.max_words {
        recs.push(Recommendation {
            priority: Priority::Medium,
            category: RecommendationCategory::Size,
            title: "Chunk too large".to_string(),
            detail: format!(
                "{} words dilutes the embedding. Lower the token budget so chunks stay under {} words.",
                chunk.word_count, thresholds.max_words
            ),
            estimated_improvement: ImprovementRange { min: 5, max: 15 },
        });
    }

    let coherence = &scored.coherence.details;
    push_for_score(
        &mut recs,
        scored.coherence.score,
        weights.semantic_coherence,
        thresholds,
        RecommendationCategory::Coherence,
        "Improve semantic coherence",
        if coherence.topic_shifts > 0 {
            format!(
                "{} topic shift(s) detected. Split the chunk where the topic changes or use semantic-boundary chunking.",
                coherence.topic_shifts
            )
        } else {
            "Consecutive sentences share little vocabulary. Add transitions or regroup related sentences.".to_string()
        },
    );

    let density = &scored.density.details;
    push_for_score(
        &mut recs,
        scored.density.score,
        weights.information_density,
        thresholds,
        RecommendationCategory::Density,
        "Increase information density",
        format!(
            "Content words make up {:.0}% of the text. Remove filler and boilerplate, keep concrete facts and terms.",
            density.content_word_ratio * 100.0
        ),
    );

    let embedding = &scored.embedding.details;
    push_for_score(
        &mut recs,
        scored.embedding.score,
        weights.embedding_quality,
        thresholds,
        RecommendationCategory::Embedding,
        "Improve embedding quality",
        if embedding.artifacts.is_empty() {
            "Aim for 100-300 words with varied vocabulary.".to_string()
        } else {
            format!("Clean up formatting artifacts: {}.", embedding.artifacts.join(", "))
        },
    );

    let completeness = &scored.completeness.details;
    push_for_score(
        &mut recs,
        scored.completeness.score,
        weights.contextual_completeness,
        thresholds,
        RecommendationCategory::Context,
        "Make the chunk self-contained",
        if completeness.dangling_references.is_empty() {
            "Add a short lead-in naming the subject and a closing sentence that states the takeaway.".to_string()
        } else {
            format!(
                "Resolve references to text outside the chunk: {}.",
                completeness.dangling_references.join(", ")
            )
        },
    );
    if completeness.metadata_coverage < 0.4 {
        recs.push(Recommendation {
            priority: Priority::Low,
            category: RecommendationCategory::Metadata,
            title: "Attach source metadata".to_string(),
            detail: "Add title, source, section, author and date fields so results can be attributed.".to_string(),
            estimated_improvement: ImprovementRange { min: 2, max: 5 },
        });
    }

    let retrieval = &scored.retrieval.details;
    push_for_score(
        &mut recs,
        scored.retrieval.score,
        weights.retrieval_optimization,
        thresholds,
        RecommendationCategory::Retrieval,
        "Optimize for retrieval",
        if retrieval.tag_count == 0 {
            "Add 3-5 descriptive tags and state key facts in question-answerable form.".to_string()
        } else {
            "Repeat key concepts, add headings or lists, and phrase facts so they answer likely questions.".to_string()
        },
    );

    // Stable sort keeps generation order within a priority.
    recs.sort_by(|a, b| b.priority.cmp(&a.priority));
    recs
}

fn push_for_score(
    recs: &mut Vec<Recommendation>,
    score: u8,
    weight: f64,
    thresholds: &ScoringThresholds,
    category: RecommendationCategory,
    title: &str,
    detail: String,
) {
    let Some(priority) = thresholds.priority_for(score) else {
        return;
    };
    // Overall points gained by lifting this dimension halfway or fully to target.
    let gap = TARGET_SCORE.saturating_sub(score) as f64 * weight;
    recs.push(Recommendation {
        priority,
        category,
        title: title.to_string(),
        detail,
        estimated_improvement: ImprovementRange {
            min: (gap / 2.0).round() as u8,
            max: gap.round().max(1.0) as u8,
        },
    });
}

/// Threshold-triggered annotations.
pub(crate) fn quality_flags(chunk: &Chunk, scored: &Scored<'_>, thresholds: &ScoringThresholds) -> Vec<QualityFlag> {
    let checks = [
        (chunk.word_count < thresholds.min_words, QualityFlag::TooShort),
        (chunk.word_count > thresholds.max_words, QualityFlag::TooLong),
        (scored.coherence.details.sentence_count == 1, QualityFlag::SingleSentence),
        (
            scored.coherence.details.topic_shifts >= thresholds.topic_shift_flag,
            QualityFlag::MultipleTopicShifts,
        ),
        (
            scored.density.score < thresholds.low_density_flag,
            QualityFlag::LowInformationDensity,
        ),
        (
            !scored.embedding.details.artifacts.is_empty(),
            QualityFlag::FormattingArtifacts,
        ),
        (
            !scored.completeness.details.dangling_references.is_empty(),
            QualityFlag::DanglingReferences,
        ),
        (
            scored.completeness.details.metadata_coverage == 0.0,
            QualityFlag::MissingMetadata,
        ),
        (chunk.tags.is_empty(), QualityFlag::Untagged),
        (chunk.overshoot, QualityFlag::Overshoot),
    ];
    checks
        .into_iter()
        .filter_map(|(hit, flag)| hit.then_some(flag))
        .collect()
}
