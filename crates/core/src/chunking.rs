//! Chunking configuration: the plain-data inbound shape and its normalized,
//! typed counterpart.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

pub const DEFAULT_MAX_TOKENS: usize = 512;
pub const DEFAULT_OVERLAP_TOKENS: usize = 50;
pub const DEFAULT_MIN_CHUNK_SIZE: usize = 50;

/// Where the chunk builder is allowed to cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChunkingMethod {
    /// Sentence units; cuts prefer transition markers near the budget limit.
    SemanticBoundary,
    /// Word units; fills every chunk up to the budget.
    TokenWindow,
    /// Sentence units; first-fit accumulation.
    SentenceGreedy,
    /// Header sections; every section starts a new chunk.
    SectionAware,
}

impl ChunkingMethod {
    pub const ALL: [ChunkingMethod; 4] = [
        ChunkingMethod::SemanticBoundary,
        ChunkingMethod::TokenWindow,
        ChunkingMethod::SentenceGreedy,
        ChunkingMethod::SectionAware,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkingMethod::SemanticBoundary => "semantic-boundary",
            ChunkingMethod::TokenWindow => "token-window",
            ChunkingMethod::SentenceGreedy => "sentence-greedy",
            ChunkingMethod::SectionAware => "section-aware",
        }
    }
}

impl fmt::Display for ChunkingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChunkingMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace('_', "-");
        ChunkingMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == needle)
            .ok_or_else(|| ConfigError::UnknownMethod(s.to_string()))
    }
}

/// Normalized chunking configuration. `overlap_tokens < max_tokens` always
/// holds for values produced by [`RawChunkingConfig::normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkingConfig {
    pub method: ChunkingMethod,
    pub max_tokens: usize,
    pub overlap_tokens: usize,
    /// Soft floor in words. Informational only: reported, never enforced.
    pub min_chunk_size: usize,
    pub preserve_formatting: bool,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            method: ChunkingMethod::SemanticBoundary,
            max_tokens: DEFAULT_MAX_TOKENS,
            overlap_tokens: DEFAULT_OVERLAP_TOKENS,
            min_chunk_size: DEFAULT_MIN_CHUNK_SIZE,
            preserve_formatting: true,
        }
    }
}

impl ChunkingConfig {
    pub fn new(method: ChunkingMethod, max_tokens: usize, overlap_tokens: usize) -> Self {
        RawChunkingConfig {
            method: method.as_str().to_string(),
            max_tokens: max_tokens as i64,
            overlap_tokens: overlap_tokens as i64,
            ..RawChunkingConfig::default()
        }
        .normalize()
        .unwrap_or_default()
    }

    pub fn with_min_chunk_size(mut self, words: usize) -> Self {
        self.min_chunk_size = words;
        self
    }

    pub fn with_preserve_formatting(mut self, preserve: bool) -> Self {
        self.preserve_formatting = preserve;
        self
    }
}

/// Configuration exactly as supplied by the surrounding workflow layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawChunkingConfig {
    pub method: String,
    pub max_tokens: i64,
    pub overlap_tokens: i64,
    pub min_chunk_size: i64,
    pub preserve_formatting: bool,
}

impl Default for RawChunkingConfig {
    fn default() -> Self {
        Self {
            method: ChunkingMethod::SemanticBoundary.as_str().to_string(),
            max_tokens: DEFAULT_MAX_TOKENS as i64,
            overlap_tokens: DEFAULT_OVERLAP_TOKENS as i64,
            min_chunk_size: DEFAULT_MIN_CHUNK_SIZE as i64,
            preserve_formatting: true,
        }
    }
}

impl RawChunkingConfig {
    /// Clamp out-of-range numbers to sane values and reject unknown methods.
    pub fn normalize(&self) -> Result<ChunkingConfig, ConfigError> {
        let method: ChunkingMethod = self.method.parse()?;

        let max_tokens = if self.max_tokens <= 0 {
            warn!(max_tokens = self.max_tokens, default = DEFAULT_MAX_TOKENS, "maxTokens must be positive, using default");
            DEFAULT_MAX_TOKENS
        } else {
            self.max_tokens as usize
        };

        let mut overlap_tokens = self.overlap_tokens.max(0) as usize;
        if overlap_tokens >= max_tokens {
            let clamped = max_tokens - 1;
            warn!(overlap_tokens, max_tokens, clamped, "overlapTokens must be below maxTokens, clamping");
            overlap_tokens = clamped;
        }

        Ok(ChunkingConfig {
            method,
            max_tokens,
            overlap_tokens,
            min_chunk_size: self.min_chunk_size.max(0) as usize,
            preserve_formatting: self.preserve_formatting,
        })
    }
}
