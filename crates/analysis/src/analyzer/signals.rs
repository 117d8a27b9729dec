//! The five sub-score scorers.
//!
//! - Semantic coherence: sentence-to-sentence overlap, transitions, topic shifts
//! - Information density: content words, diversity, technical terms, informative sentences
//! - Embedding quality: length sweet spot, well-formedness, vocabulary (plus optional simulation)
//! - Contextual completeness: intro/conclusion, supporting detail, self-containment, metadata
//! - Retrieval optimization: tags, answerability cues, concept density, structure

use std::collections::{HashMap, HashSet};

use tracing::debug;
use vecready_core::lexicon::{content_words, is_stop_word, transition_tier, transition_with_role, TransitionRole};
use vecready_core::Chunk;

use super::types::{
    CoherenceDetails, CompletenessDetails, DensityDetails, EmbeddingDetails, RetrievalDetails, SubScore,
};
use crate::embedding;
use crate::text::{is_technical_term, keywords, sentences, words};

// ── Semantic coherence ──────────────────────────────────────────────

const SINGLE_SENTENCE_COHERENCE: f64 = 85.0;
const COHERENCE_BASE: f64 = 45.0;
const OVERLAP_POINTS: f64 = 35.0;
const OVERLAP_SATURATION: f64 = 0.5;
const TRANSITION_POINTS: f64 = 20.0;
const TRANSITION_SATURATION: f64 = 0.5;
const TOPIC_SHIFT_PENALTY: f64 = 10.0;
/// Sentences per side when comparing keyword windows.
const TOPIC_WINDOW: usize = 2;
const TOPIC_KEYWORDS: usize = 5;
/// Keyword Jaccard similarity below which adjacent windows count as a shift.
const TOPIC_SHIFT_JACCARD: f64 = 0.1;

pub fn semantic_coherence(text: &str) -> SubScore<CoherenceDetails> {
    let sentences = sentences(text);
    let n = sentences.len();
    if n <= 1 {
        let score = if n == 1 { SINGLE_SENTENCE_COHERENCE } else { 0.0 };
        return SubScore::new(
            score,
            CoherenceDetails {
                sentence_count: n,
                ..CoherenceDetails::default()
            },
        );
    }

    let sets: Vec<HashSet<String>> = sentences
        .iter()
        .map(|s| content_words(s).into_iter().collect())
        .collect();
    let average_overlap = sets
        .windows(2)
        .map(|pair| overlap_ratio(&pair[0], &pair[1]))
        .sum::<f64>()
        / (n - 1) as f64;

    let tiers: Vec<f64> = sentences[1..]
        .iter()
        .filter_map(|s| transition_tier(s).map(|t| t.weight()))
        .collect();
    let transition_count = tiers.len();
    let transition_ratio = tiers.iter().sum::<f64>() / (n - 1) as f64;

    let topic_shifts = topic_shifts(&sentences);

    let score = COHERENCE_BASE
        + OVERLAP_POINTS * (average_overlap / OVERLAP_SATURATION).min(1.0)
        + TRANSITION_POINTS * (transition_ratio / TRANSITION_SATURATION).min(1.0)
        - TOPIC_SHIFT_PENALTY * topic_shifts as f64;

    SubScore::new(
        score,
        CoherenceDetails {
            sentence_count: n,
            average_overlap,
            transition_count,
            transition_ratio,
            topic_shifts,
        },
    )
}

/// |A ∩ B| / min(|A|, |B|), 0.0 when either side is empty.
fn overlap_ratio(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let smaller = a.len().min(b.len());
    if smaller == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / smaller as f64
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 1.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Count runs of boundaries where the keyword windows on either side share
/// almost nothing. Consecutive shifted boundaries count once.
fn topic_shifts(sentences: &[&str]) -> usize {
    if sentences.len() < 2 * TOPIC_WINDOW {
        return 0;
    }
    let window = |range: &[&str]| -> HashSet<String> {
        keywords(&range.join(" "), TOPIC_KEYWORDS).into_iter().collect()
    };

    let mut shifts = 0;
    let mut in_shift = false;
    for boundary in TOPIC_WINDOW..=sentences.len() - TOPIC_WINDOW {
        let left = window(&sentences[boundary - TOPIC_WINDOW..boundary]);
        let right = window(&sentences[boundary..boundary + TOPIC_WINDOW]);
        let shifted = jaccard(&left, &right) < TOPIC_SHIFT_JACCARD;
        if shifted && !in_shift {
            shifts += 1;
        }
        in_shift = shifted;
    }
    shifts
}

// ── Information density ─────────────────────────────────────────────

const CONTENT_RATIO_SATURATION: f64 = 0.6;
const TECHNICAL_SATURATION: f64 = 0.15;
/// Words below which density is scaled down proportionally.
const SUFFICIENT_WORDS: f64 = 30.0;
const INFORMATIVE_MIN_WORDS: usize = 6;

pub fn information_density(text: &str) -> SubScore<DensityDetails> {
    let all = words(text);
    let total = all.len();
    if total == 0 {
        return SubScore::new(0.0, DensityDetails::default());
    }

    let content_word_ratio = content_words(text).len() as f64 / total as f64;
    let unique: HashSet<&String> = all.iter().collect();
    let lexical_diversity = unique.len() as f64 / total as f64;
    let technical_terms = text.split_whitespace().filter(|t| is_technical_term(t)).count();
    let technical_density = technical_terms as f64 / total as f64;

    let sentences = sentences(text);
    let informative = sentences
        .iter()
        .filter(|s| {
            s.split_whitespace().count() >= INFORMATIVE_MIN_WORDS
                && s.trim_end_matches(['"', '\'', ')']).ends_with(['.', '!', '?'])
        })
        .count();
    let informative_sentence_ratio = if sentences.is_empty() {
        0.0
    } else {
        informative as f64 / sentences.len() as f64
    };

    let raw = 0.35 * (content_word_ratio / CONTENT_RATIO_SATURATION).min(1.0)
        + 0.25 * lexical_diversity
        + 0.15 * (technical_density / TECHNICAL_SATURATION).min(1.0)
        + 0.25 * informative_sentence_ratio;
    let sufficiency = (total as f64 / SUFFICIENT_WORDS).min(1.0);

    SubScore::new(
        100.0 * raw * sufficiency,
        DensityDetails {
            word_count: total,
            content_word_ratio,
            lexical_diversity,
            technical_terms,
            technical_density,
            informative_sentence_ratio,
        },
    )
}

// ── Embedding quality ───────────────────────────────────────────────

const VOCABULARY_SATURATION: f64 = 40.0;
const HEURISTIC_SHARE: f64 = 0.7;
const SIMULATION_SHARE: f64 = 0.3;

pub fn embedding_quality(text: &str, deep_simulation: bool) -> SubScore<EmbeddingDetails> {
    let word_count = text.split_whitespace().count();
    let length_score = length_score(word_count);
    let (structure_score, artifacts) = structure_check(text);
    let unique_content: HashSet<String> = content_words(text).into_iter().collect();
    let vocabulary_score = 100.0 * (unique_content.len() as f64 / VOCABULARY_SATURATION).min(1.0);

    let heuristic = 0.45 * length_score + 0.25 * structure_score + 0.30 * vocabulary_score;
    let mut details = EmbeddingDetails {
        length_score,
        structure_score,
        vocabulary_score,
        artifacts,
        simulation: None,
        degradation: None,
    };

    let score = if deep_simulation {
        match embedding::simulate(text) {
            Ok(sim) => {
                let blended = HEURISTIC_SHARE * heuristic + SIMULATION_SHARE * sim.score;
                details.simulation = Some(sim);
                blended
            }
            Err(reason) => {
                debug!(reason = %reason, "embedding simulation skipped");
                details.degradation = Some(reason);
                heuristic
            }
        }
    } else {
        heuristic
    };

    SubScore::new(score, details)
}

/// Piecewise sweet-spot curve over word count, peaking at 100-300 words.
fn length_score(words: usize) -> f64 {
    let w = words as f64;
    match words {
        0..=19 => w / 20.0 * 30.0,
        20..=49 => 30.0 + (w - 20.0) / 30.0 * 40.0,
        50..=99 => 70.0 + (w - 50.0) / 50.0 * 30.0,
        100..=300 => 100.0,
        301..=500 => 100.0 - (w - 300.0) / 200.0 * 30.0,
        _ => (70.0 - (w - 500.0) / 500.0 * 40.0).max(30.0),
    }
}

/// Well-formedness score starting at 100, with the artifacts that cost points.
fn structure_check(text: &str) -> (f64, Vec<String>) {
    let mut score: f64 = 100.0;
    let mut artifacts = Vec::new();
    let mut flag = |hit: bool, penalty: f64, name: &str| {
        if hit {
            score -= penalty;
            artifacts.push(name.to_string());
        }
    };

    flag(has_repeated_punctuation(text), 15.0, "repeated punctuation");
    flag(
        text.contains("   ") || text.contains("\t\t") || text.contains(" \t"),
        10.0,
        "whitespace runs",
    );
    flag(text.replace('\r', "").contains("\n\n\n"), 10.0, "excess blank lines");

    let visible: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    let symbols = visible.iter().filter(|c| !c.is_alphanumeric()).count();
    flag(
        !visible.is_empty() && symbols as f64 / visible.len() as f64 > 0.3,
        20.0,
        "symbol heavy",
    );
    flag(text.contains('\u{FFFD}'), 25.0, "replacement characters");
    flag(
        text.chars().any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t')),
        15.0,
        "control characters",
    );

    (score.max(0.0), artifacts)
}

/// `!!`, `??`, `,,`, `;;`, `::` or four or more periods in a row.
fn has_repeated_punctuation(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        let limit = match c {
            '!' | '?' | ',' | ';' | ':' => 2,
            '.' => 4,
            _ => usize::MAX,
        };
        if run >= limit {
            return true;
        }
        i += run;
    }
    false
}

// ── Contextual completeness ─────────────────────────────────────────

const INTRO_MARKERS: &[&str] = &[
    "introduction", "overview", "this section", "this chapter", "this guide", "this document",
    "in this", "we describe", "we present", "to begin", "background",
];
const CONCLUSION_EXTRAS: &[&str] = &["overall", "in short", "to sum up", "all in all"];
const SUPPORT_MARKERS: &[&str] = &[
    "for example", "for instance", "such as", "e.g.", "specifically", "in particular",
    "including", "because", "according to",
];
const DANGLING_PHRASES: &[&str] = &[
    "as shown above", "as mentioned above", "as mentioned earlier", "as described above",
    "as noted above", "as discussed earlier", "see above", "see below", "the above",
    "previously mentioned", "in the previous section", "in the next section", "the aforementioned",
];
const DANGLING_OPENERS: &[&str] = &["it", "this", "these", "they", "those", "that"];
/// Metadata keys that make a chunk self-describing.
pub(crate) const METADATA_FIELDS: &[&str] = &["title", "source", "section", "author", "date"];

const COMPLETENESS_BASE: f64 = 30.0;
const INTRO_POINTS: f64 = 15.0;
const CONCLUSION_POINTS: f64 = 15.0;
const SUPPORT_POINTS: f64 = 8.0;
const MAX_SUPPORT: usize = 3;
const METADATA_POINTS: f64 = 16.0;
const DANGLING_PENALTY: f64 = 15.0;

pub fn contextual_completeness(chunk: &Chunk) -> SubScore<CompletenessDetails> {
    let text = chunk.content.as_str();
    let lower = text.to_lowercase();
    let sentences = sentences(text);

    let has_introduction = text.trim_start().starts_with('#')
        || sentences
            .first()
            .map(|s| contains_any(&s.to_lowercase(), INTRO_MARKERS))
            .unwrap_or(false);
    let has_conclusion = sentences
        .last()
        .filter(|_| sentences.len() > 1)
        .map(|s| {
            transition_with_role(s, Some(TransitionRole::Closing)).is_some()
                || contains_any(&s.to_lowercase(), CONCLUSION_EXTRAS)
        })
        .unwrap_or(false);
    let supporting_details = SUPPORT_MARKERS.iter().filter(|m| lower.contains(*m)).count();

    let mut dangling_references: Vec<String> = DANGLING_PHRASES
        .iter()
        .filter(|p| lower.contains(*p))
        .map(|p| p.to_string())
        .collect();
    if let Some(first) = words(text).first() {
        if DANGLING_OPENERS.contains(&first.as_str()) {
            dangling_references.push(format!("opens with \"{first}\""));
        }
    }

    let metadata_coverage = metadata_coverage(chunk);

    let score = COMPLETENESS_BASE
        + if has_introduction { INTRO_POINTS } else { 0.0 }
        + if has_conclusion { CONCLUSION_POINTS } else { 0.0 }
        + SUPPORT_POINTS * supporting_details.min(MAX_SUPPORT) as f64
        + METADATA_POINTS * metadata_coverage
        - DANGLING_PENALTY * dangling_references.len() as f64;

    SubScore::new(
        score,
        CompletenessDetails {
            has_introduction,
            has_conclusion,
            supporting_details,
            dangling_references,
            metadata_coverage,
        },
    )
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Share of [`METADATA_FIELDS`] present with a non-empty value. A known
/// section heading counts for `section`.
pub(crate) fn metadata_coverage(chunk: &Chunk) -> f64 {
    let present = METADATA_FIELDS
        .iter()
        .filter(|field| {
            if **field == "section" && chunk.section_heading.is_some() {
                return true;
            }
            chunk.source_metadata.as_ref().is_some_and(|meta| {
                meta.iter().any(|(key, value)| {
                    key.eq_ignore_ascii_case(field)
                        && match value {
                            serde_json::Value::Null => false,
                            serde_json::Value::String(s) => !s.trim().is_empty(),
                            _ => true,
                        }
                })
            })
        })
        .count();
    present as f64 / METADATA_FIELDS.len() as f64
}

// ── Retrieval optimization ──────────────────────────────────────────

const TAG_SATURATION: usize = 5;
const MAX_QUESTION_CUES: usize = 4;
const CONCEPT_SATURATION: f64 = 0.1;
const STRUCTURE_SATURATION: usize = 3;

const DEFINITION_CUES: &[&str] = &[" is a ", " is an ", " are a ", " refers to ", " means ", " defined as "];
const PROCEDURE_CUES: &[&str] = &["how to", "step ", "steps", "first,", "then ", "to do this"];

pub fn retrieval_optimization(chunk: &Chunk) -> SubScore<RetrievalDetails> {
    let text = chunk.content.as_str();
    let lower = format!(" {} ", text.to_lowercase());

    let tag_count = chunk.tags.len();
    let tag_quality = if tag_count == 0 {
        0.0
    } else {
        chunk.tags.iter().filter(|t| is_good_tag(t)).count() as f64 / tag_count as f64
    };
    let tag_part = 0.6 * tag_count.min(TAG_SATURATION) as f64 / TAG_SATURATION as f64 + 0.4 * tag_quality;

    let question_cues = [
        text.contains('?'),
        contains_any(&lower, DEFINITION_CUES),
        contains_any(&lower, PROCEDURE_CUES),
        text.split_whitespace()
            .any(|t| t.chars().any(|c| c.is_ascii_digit())),
    ]
    .iter()
    .filter(|hit| **hit)
    .count();

    let all = words(text);
    let mut frequency: HashMap<String, usize> = HashMap::new();
    for word in content_words(text) {
        if word.chars().count() >= 4 {
            *frequency.entry(word).or_default() += 1;
        }
    }
    let repeated = frequency.values().filter(|&&n| n >= 2).count();
    let concept_density = if all.is_empty() {
        0.0
    } else {
        repeated as f64 / all.len() as f64
    };

    let structural_markers = structural_markers(text);

    let score = 100.0
        * (0.25 * tag_part
            + 0.30 * question_cues.min(MAX_QUESTION_CUES) as f64 / MAX_QUESTION_CUES as f64
            + 0.25 * (concept_density / CONCEPT_SATURATION).min(1.0)
            + 0.20 * structural_markers.min(STRUCTURE_SATURATION) as f64 / STRUCTURE_SATURATION as f64);

    SubScore::new(
        score,
        RetrievalDetails {
            tag_count,
            tag_quality,
            question_cues,
            concept_density,
            structural_markers,
        },
    )
}

fn is_good_tag(tag: &str) -> bool {
    let tag = tag.trim();
    let len = tag.chars().count();
    (3..=40).contains(&len)
        && tag.chars().any(char::is_alphabetic)
        && !is_stop_word(&tag.to_lowercase())
}

/// Distinct kinds of search-friendly structure present in `text`.
fn structural_markers(text: &str) -> usize {
    let lines: Vec<&str> = text.lines().map(str::trim_start).collect();
    let is_list_item = |l: &&str| {
        l.starts_with("- ")
            || l.starts_with("* ")
            || l.starts_with("+ ")
            || l
                .split_once(". ")
                .is_some_and(|(n, _)| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
    };
    let is_label = |l: &&str| {
        l.split_once(": ")
            .is_some_and(|(label, _)| !label.is_empty() && label.len() <= 30 && !label.contains('.'))
    };

    [
        lines.iter().any(|l| l.starts_with('#')),
        lines.iter().any(is_list_item),
        text.contains("**") || text.contains("__"),
        lines.iter().any(is_label),
        text.contains("```"),
        lines.iter().any(|l| l.starts_with('|')),
    ]
    .iter()
    .filter(|hit| **hit)
    .count()
}
