//! Static catalog of vector-store profiles and per-platform fit scoring.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;
use vecready_core::Chunk;

use crate::analyzer::types::{clamp_score, ReadinessBand};

/// How much structured metadata a platform can store and filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataSupport {
    Basic,
    Standard,
    Rich,
}

/// Known size, token and metadata constraints of one destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformProfile {
    pub name: &'static str,
    pub min_words: usize,
    pub max_words: usize,
    pub ideal_words: usize,
    pub dimensions: usize,
    pub max_tokens: usize,
    pub recommended_overlap: usize,
    pub metadata: MetadataSupport,
}

/// Catalog version, bumped whenever a profile changes.
pub const CATALOG_VERSION: &str = "2024.1";

/// Read-only profiles, sorted by name.
pub const PLATFORMS: &[PlatformProfile] = &[
    PlatformProfile {
        name: "chroma",
        min_words: 50,
        max_words: 400,
        ideal_words: 200,
        dimensions: 384,
        max_tokens: 256,
        recommended_overlap: 30,
        metadata: MetadataSupport::Standard,
    },
    PlatformProfile {
        name: "milvus",
        min_words: 100,
        max_words: 600,
        ideal_words: 300,
        dimensions: 768,
        max_tokens: 8191,
        recommended_overlap: 50,
        metadata: MetadataSupport::Standard,
    },
    PlatformProfile {
        name: "opensearch",
        min_words: 100,
        max_words: 500,
        ideal_words: 250,
        dimensions: 768,
        max_tokens: 512,
        recommended_overlap: 50,
        metadata: MetadataSupport::Standard,
    },
    PlatformProfile {
        name: "pgvector",
        min_words: 100,
        max_words: 800,
        ideal_words: 400,
        dimensions: 1536,
        max_tokens: 8191,
        recommended_overlap: 50,
        metadata: MetadataSupport::Basic,
    },
    PlatformProfile {
        name: "pinecone",
        min_words: 100,
        max_words: 500,
        ideal_words: 300,
        dimensions: 1536,
        max_tokens: 8191,
        recommended_overlap: 50,
        metadata: MetadataSupport::Rich,
    },
    PlatformProfile {
        name: "qdrant",
        min_words: 100,
        max_words: 500,
        ideal_words: 250,
        dimensions: 1536,
        max_tokens: 8191,
        recommended_overlap: 40,
        metadata: MetadataSupport::Rich,
    },
    PlatformProfile {
        name: "weaviate",
        min_words: 150,
        max_words: 600,
        ideal_words: 350,
        dimensions: 1536,
        max_tokens: 8191,
        recommended_overlap: 50,
        metadata: MetadataSupport::Rich,
    },
];

/// Look up a profile by case-insensitive name.
pub fn profile(name: &str) -> Option<&'static PlatformProfile> {
    let name = name.trim();
    PLATFORMS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Requested names lowercased, deduplicated and sorted.
pub fn normalize_platforms<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut out: Vec<String> = names
        .iter()
        .map(|n| n.as_ref().trim().to_lowercase())
        .filter(|n| !n.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformAssessment {
    pub score: u8,
    pub status: ReadinessBand,
    pub recommendations: Vec<String>,
}

const BASELINE: f64 = 70.0;
const IN_RANGE_BONUS: f64 = 20.0;
const IDEAL_BONUS: f64 = 10.0;
const OUT_OF_RANGE_SCALE: f64 = 50.0;
const MAX_RANGE_PENALTY: f64 = 40.0;
const TOKEN_LIMIT_PENALTY: f64 = 40.0;

/// Score `chunk` against every known platform in `names`, keyed by name in
/// sorted order. Unknown names are logged and skipped.
pub fn assess_platforms<S: AsRef<str>>(chunk: &Chunk, names: &[S]) -> IndexMap<String, PlatformAssessment> {
    let mut out = IndexMap::new();
    for name in normalize_platforms(names) {
        match profile(&name) {
            Some(p) => {
                out.insert(name, assess(chunk, p));
            }
            None => warn!(platform = %name, "unknown platform, skipping"),
        }
    }
    out
}

/// Fit of one chunk for one platform.
pub fn assess(chunk: &Chunk, profile: &PlatformProfile) -> PlatformAssessment {
    let words = chunk.word_count;
    let mut score = BASELINE;
    let mut recommendations = Vec::new();

    if (profile.min_words..=profile.max_words).contains(&words) {
        let span = (profile.ideal_words - profile.min_words).max(profile.max_words - profile.ideal_words) as f64;
        let closeness = 1.0 - (words as f64 - profile.ideal_words as f64).abs() / span;
        score += IN_RANGE_BONUS + IDEAL_BONUS * closeness.max(0.0);
    } else {
        let distance = if words < profile.min_words {
            (profile.min_words - words) as f64 / profile.min_words as f64
        } else {
            (words - profile.max_words) as f64 / profile.max_words as f64
        };
        score -= (distance * OUT_OF_RANGE_SCALE).min(MAX_RANGE_PENALTY);
        recommendations.push(format!(
            "{} words is outside the {}-{} word range {} handles best (ideal {}).",
            words, profile.min_words, profile.max_words, profile.name, profile.ideal_words
        ));
    }

    if chunk.token_count > profile.max_tokens {
        score -= TOKEN_LIMIT_PENALTY;
        recommendations.push(format!(
            "About {} tokens exceeds the {}-token embedding limit; split the chunk.",
            chunk.token_count, profile.max_tokens
        ));
    }

    let has_metadata = !chunk.tags.is_empty() || chunk.source_metadata.is_some();
    if has_metadata {
        score += match profile.metadata {
            MetadataSupport::Rich => 10.0,
            MetadataSupport::Standard => 5.0,
            MetadataSupport::Basic => 0.0,
        };
    } else if profile.metadata == MetadataSupport::Rich {
        recommendations.push(format!("{} supports rich metadata filtering; attach tags or source metadata.", profile.name));
    }

    if chunk.overlap_length == 0 && chunk.index > 0 {
        recommendations.push(format!(
            "Consider about {} tokens of overlap between chunks for {}.",
            profile.recommended_overlap, profile.name
        ));
    }

    let score = clamp_score(score);
    PlatformAssessment {
        score,
        status: ReadinessBand::from_score(score),
        recommendations,
    }
}
