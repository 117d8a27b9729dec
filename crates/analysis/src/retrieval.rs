//! Retrieval simulation: synthesize plausible queries for a chunk and
//! estimate how well it would rank for each.
//!
//! A best-effort proxy, not ground truth. Rank jitter is drawn from a
//! ChaCha RNG seeded by the caller's seed mixed with the chunk's content
//! digest, so the same chunk always simulates the same way.

use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use vecready_core::lexicon::content_words;
use vecready_core::Chunk;

use crate::embedding::{cosine_similarity, simulated_embedding};
use crate::text::{entities, keywords, sentences};

pub const MAX_QUERIES: usize = 10;

const EXACT_WEIGHT: f64 = 0.4;
const KEYWORD_WEIGHT: f64 = 0.35;
const SEMANTIC_WEIGHT: f64 = 0.25;
const PARAPHRASE_WORDS: usize = 6;

/// Relevance floor and the simulated rank range for it, best band first.
const RANK_BANDS: &[(f64, u32, u32)] = &[
    (0.8, 1, 2),
    (0.6, 2, 5),
    (0.4, 4, 10),
    (0.2, 8, 20),
    (0.0, 15, 50),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuerySource {
    Entity,
    Keyword,
    Topic,
    Question,
    Paraphrase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedQuery {
    pub query: String,
    pub source: QuerySource,
    pub relevance: f64,
    pub estimated_rank: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalSimulation {
    pub queries: Vec<SimulatedQuery>,
    pub average_relevance: f64,
    /// Share of queries ranked in the top five.
    pub top5_hit_rate: f64,
    pub mean_reciprocal_rank: f64,
}

pub struct RetrievalSimulator {
    seed: u64,
    use_embeddings: bool,
}

impl RetrievalSimulator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            use_embeddings: false,
        }
    }

    /// Blend simulated-embedding cosine into the semantic similarity.
    pub fn with_embeddings(mut self, enabled: bool) -> Self {
        self.use_embeddings = enabled;
        self
    }

    pub fn simulate(&self, chunk: &Chunk) -> RetrievalSimulation {
        let text = chunk.content.as_str();
        let chunk_words: HashSet<String> = content_words(text).into_iter().collect();
        let chunk_vector = if self.use_embeddings {
            simulated_embedding(text)
        } else {
            None
        };
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed ^ content_seed(text));

        let queries: Vec<SimulatedQuery> = generate_queries(chunk)
            .into_iter()
            .map(|(query, source)| {
                let relevance = self.relevance(&query, text, &chunk_words, chunk_vector.as_deref());
                let estimated_rank = rank_for(relevance, &mut rng);
                SimulatedQuery {
                    query,
                    source,
                    relevance,
                    estimated_rank,
                }
            })
            .collect();

        summarize(queries)
    }

    fn relevance(
        &self,
        query: &str,
        text: &str,
        chunk_words: &HashSet<String>,
        chunk_vector: Option<&[f64]>,
    ) -> f64 {
        let exact = if text.to_lowercase().contains(&query.to_lowercase()) {
            1.0
        } else {
            0.0
        };

        let query_words: HashSet<String> = content_words(query).into_iter().collect();
        let shared = query_words.intersection(chunk_words).count() as f64;
        let keyword_overlap = if query_words.is_empty() {
            0.0
        } else {
            shared / query_words.len() as f64
        };

        // Cosine over binary word sets.
        let denom = (query_words.len() as f64 * chunk_words.len() as f64).sqrt();
        let mut semantic = if denom > 0.0 { shared / denom } else { 0.0 };
        if let (Some(chunk_vec), Some(query_vec)) = (chunk_vector, simulated_embedding(query)) {
            semantic = 0.5 * semantic + 0.5 * cosine_similarity(&query_vec, chunk_vec).max(0.0);
        }

        EXACT_WEIGHT * exact + KEYWORD_WEIGHT * keyword_overlap + SEMANTIC_WEIGHT * semantic
    }
}

/// First eight bytes of the content's SHA-256 digest.
fn content_seed(text: &str) -> u64 {
    let digest = Sha256::digest(text.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

fn rank_for(relevance: f64, rng: &mut ChaCha8Rng) -> u32 {
    let (_, lo, hi) = RANK_BANDS
        .iter()
        .find(|(floor, _, _)| relevance >= *floor)
        .copied()
        .unwrap_or((0.0, 15, 50));
    rng.gen_range(lo..=hi)
}

/// Up to [`MAX_QUERIES`] distinct queries, in source order: entities,
/// keywords, main topic, a question, a paraphrase.
pub fn generate_queries(chunk: &Chunk) -> Vec<(String, QuerySource)> {
    let text = chunk.content.as_str();
    let top = keywords(text, 3);
    let mut candidates: Vec<(String, QuerySource)> = Vec::new();

    for entity in entities(text, 3) {
        candidates.push((entity, QuerySource::Entity));
    }
    for keyword in &top {
        candidates.push((keyword.clone(), QuerySource::Keyword));
    }
    if top.len() >= 2 {
        candidates.push((top.join(" "), QuerySource::Keyword));
    }

    let topic = chunk
        .section_heading
        .clone()
        .or_else(|| (!top.is_empty()).then(|| top.iter().take(2).cloned().collect::<Vec<_>>().join(" ")));
    if let Some(topic) = topic {
        candidates.push((topic.clone(), QuerySource::Topic));
        candidates.push((format!("What is {topic}?"), QuerySource::Question));
    }

    if let Some(first) = sentences(text).first() {
        let paraphrase: Vec<String> = content_words(first).into_iter().take(PARAPHRASE_WORDS).collect();
        if paraphrase.len() >= 2 {
            candidates.push((paraphrase.join(" "), QuerySource::Paraphrase));
        }
    }

    let mut seen: HashSet<String> = HashSet::new();
    candidates
        .into_iter()
        .filter(|(q, _)| !q.trim().is_empty() && seen.insert(q.to_lowercase()))
        .take(MAX_QUERIES)
        .collect()
}

fn summarize(queries: Vec<SimulatedQuery>) -> RetrievalSimulation {
    if queries.is_empty() {
        return RetrievalSimulation {
            queries,
            average_relevance: 0.0,
            top5_hit_rate: 0.0,
            mean_reciprocal_rank: 0.0,
        };
    }
    let n = queries.len() as f64;
    RetrievalSimulation {
        average_relevance: queries.iter().map(|q| q.relevance).sum::<f64>() / n,
        top5_hit_rate: queries.iter().filter(|q| q.estimated_rank <= 5).count() as f64 / n,
        mean_reciprocal_rank: queries.iter().map(|q| 1.0 / q.estimated_rank as f64).sum::<f64>() / n,
        queries,
    }
}
