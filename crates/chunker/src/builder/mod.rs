//! Chunk builder: turns segmented units into budget-bounded chunks.
//!
//! Units are first refined to the granularity the chunking method cuts at,
//! then any piece whose own estimate exceeds the budget is split further.
//! An accumulator fills a buffer while it fits, closes a chunk when the next
//! piece would overflow, and seeds the following chunk with a trailing
//! overlap taken from the end of the closed one.

mod boundary;
mod overlap;
mod pieces;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use vecready_core::{Chunk, ChunkingConfig, ChunkingMethod, SourceMetadata, TokenTally};

use crate::segment::{segment_with_hints, HeaderHint, TextUnit, UnitKind};

use boundary::choose_cut;
use overlap::trailing_overlap;
use pieces::{fit_to_budget, refine, Granularity, Piece};

/// Extracted text plus everything the extractor knows about it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceDocument {
    pub text: String,
    /// Structural header hints for formats without markdown markers.
    pub headers: Vec<HeaderHint>,
    /// Copied onto every chunk.
    pub tags: Vec<String>,
    /// Passed through to every chunk unmodified.
    pub metadata: Option<SourceMetadata>,
}

impl SourceDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_headers(mut self, headers: Vec<HeaderHint>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_metadata(mut self, metadata: SourceMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Summary of one chunking run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkStats {
    pub chunk_count: usize,
    pub total_tokens: usize,
    pub average_tokens: f64,
    pub min_tokens: usize,
    pub max_tokens: usize,
    pub overshoot_count: usize,
    /// Chunks under `min_chunk_size` words. Reported only, never merged.
    pub under_min_size: usize,
}

impl ChunkStats {
    pub fn from_chunks(chunks: &[Chunk], min_chunk_size: usize) -> Self {
        if chunks.is_empty() {
            return Self::default();
        }
        let total_tokens: usize = chunks.iter().map(|c| c.token_count).sum();
        Self {
            chunk_count: chunks.len(),
            total_tokens,
            average_tokens: total_tokens as f64 / chunks.len() as f64,
            min_tokens: chunks.iter().map(|c| c.token_count).min().unwrap_or(0),
            max_tokens: chunks.iter().map(|c| c.token_count).max().unwrap_or(0),
            overshoot_count: chunks.iter().filter(|c| c.overshoot).count(),
            under_min_size: chunks.iter().filter(|c| c.word_count < min_chunk_size).count(),
        }
    }
}

/// Chunks of one document together with their run statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkSet {
    pub chunks: Vec<Chunk>,
    pub stats: ChunkStats,
}

/// Chunk plain text with no structural hints, tags or metadata.
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> ChunkSet {
    chunk_document(&SourceDocument::new(text), config)
}

/// Segment and chunk a document, attaching its tags and metadata to every
/// chunk.
pub fn chunk_document(doc: &SourceDocument, config: &ChunkingConfig) -> ChunkSet {
    let units = segment_with_hints(&doc.text, &doc.headers);
    let chunks: Vec<Chunk> = build(&doc.text, &units, config)
        .into_iter()
        .map(|chunk| {
            let chunk = chunk.with_tags(doc.tags.iter().cloned());
            match &doc.metadata {
                Some(meta) => chunk.with_source_metadata(meta.clone()),
                None => chunk,
            }
        })
        .collect();

    let stats = ChunkStats::from_chunks(&chunks, config.min_chunk_size);
    info!(
        method = %config.method,
        units = units.len(),
        chunks = stats.chunk_count,
        avg_tokens = format!("{:.1}", stats.average_tokens),
        overshoot = stats.overshoot_count,
        under_min = stats.under_min_size,
        "chunking complete"
    );
    ChunkSet { chunks, stats }
}

/// Build chunks from units produced by segmenting `source`.
///
/// Unit ranges must index into `source`. No chunk exceeds
/// `config.max_tokens` unless it is a single word that does on its own.
pub fn build(source: &str, units: &[TextUnit], config: &ChunkingConfig) -> Vec<Chunk> {
    let target = match config.method {
        ChunkingMethod::TokenWindow => Granularity::Word,
        ChunkingMethod::SentenceGreedy | ChunkingMethod::SemanticBoundary => Granularity::Sentence,
        ChunkingMethod::SectionAware => Granularity::Section,
    };
    // Only the shallowest header level opens a section; deeper headers stay
    // inside their parent.
    let section_level = if config.method == ChunkingMethod::SectionAware {
        units
            .iter()
            .filter(|u| u.kind == UnitKind::HeaderSection)
            .filter_map(|u| u.level)
            .min()
    } else {
        None
    };

    let mut acc = Accumulator::new(source, config);
    for unit in units {
        let mut piece = Piece::from_unit(source, unit, unit.heading.clone());
        piece.section_start = section_level.is_some()
            && unit.kind == UnitKind::HeaderSection
            && unit.level == section_level;
        for refined in refine(source, piece, target) {
            for fitted in fit_to_budget(source, refined, config.max_tokens) {
                acc.push(fitted);
            }
        }
    }
    acc.finish()
}

struct Accumulator<'a> {
    source: &'a str,
    config: &'a ChunkingConfig,
    buffer: Vec<Piece>,
    tally: TokenTally,
    /// Index of the first buffered piece that is not carried-over overlap.
    fresh_from: usize,
    chunks: Vec<Chunk>,
}

impl<'a> Accumulator<'a> {
    fn new(source: &'a str, config: &'a ChunkingConfig) -> Self {
        Self {
            source,
            config,
            buffer: Vec::new(),
            tally: TokenTally::default(),
            fresh_from: 0,
            chunks: Vec::new(),
        }
    }

    fn has_fresh(&self) -> bool {
        self.fresh_from < self.buffer.len()
    }

    fn push(&mut self, piece: Piece) {
        if piece.section_start {
            let pieces = std::mem::take(&mut self.buffer);
            if self.fresh_from < pieces.len() {
                self.emit(&pieces, self.fresh_from);
            }
            self.reset(Vec::new());
        }

        loop {
            let next = self.tally + piece.tally;
            if next.tokens() <= self.config.max_tokens || self.buffer.is_empty() {
                self.tally = next;
                self.buffer.push(piece);
                return;
            }
            if self.has_fresh() {
                self.close();
            } else {
                // Only overlap left; give it up piece by piece to make room.
                let dropped = self.buffer.remove(0);
                self.tally -= dropped.tally;
                self.fresh_from -= 1;
            }
        }
    }

    /// Emit the buffer (or its best prefix) and reseed with overlap.
    fn close(&mut self) {
        let cut = if self.config.method == ChunkingMethod::SemanticBoundary {
            choose_cut(self.source, &self.buffer, self.fresh_from)
        } else {
            self.buffer.len()
        };
        let carry = self.buffer.split_off(cut);
        let closed = std::mem::take(&mut self.buffer);
        self.emit(&closed, self.fresh_from);

        let seed = trailing_overlap(self.source, &closed, self.config.overlap_tokens);
        let seeded = seed.len();
        let mut buffer = seed;
        buffer.extend(carry);
        self.reset(buffer);
        self.fresh_from = seeded;

        while self.tally.tokens() > self.config.max_tokens && self.fresh_from > 0 {
            let dropped = self.buffer.remove(0);
            self.tally -= dropped.tally;
            self.fresh_from -= 1;
        }
    }

    fn reset(&mut self, buffer: Vec<Piece>) {
        self.tally = buffer.iter().map(|p| p.tally).sum();
        self.buffer = buffer;
        self.fresh_from = 0;
    }

    fn emit(&mut self, pieces: &[Piece], fresh_from: usize) {
        let fresh = &pieces[fresh_from..];
        let (Some(first), Some(last)) = (fresh.first(), fresh.last()) else {
            return;
        };

        let (content, overlap_length) = self.render(pieces, fresh_from);
        let mut chunk = Chunk::new(self.chunks.len(), content);
        chunk.section_heading = first.heading.clone();
        chunk.source_range = first.range.start..last.range.end;
        chunk.overlap_length = overlap_length;
        chunk.unit_count = fresh.len();
        chunk.overshoot = chunk.token_count > self.config.max_tokens;

        if chunk.overshoot {
            warn!(
                chunk = %chunk.id,
                tokens = chunk.token_count,
                max_tokens = self.config.max_tokens,
                "single word exceeds token budget"
            );
        }
        debug!(
            chunk = %chunk.id,
            tokens = chunk.token_count,
            units = chunk.unit_count,
            overlap_bytes = chunk.overlap_length,
            "chunk closed"
        );
        self.chunks.push(chunk);
    }

    /// Chunk text and the byte length of its leading overlap.
    fn render(&self, pieces: &[Piece], fresh_from: usize) -> (String, usize) {
        let (Some(first), Some(last)) = (pieces.first(), pieces.last()) else {
            return (String::new(), 0);
        };

        if self.config.preserve_formatting {
            let content = self.source[first.range.start..last.range.end].to_string();
            let overlap_length = pieces[fresh_from].range.start - first.range.start;
            return (content, overlap_length);
        }

        let mut content = String::new();
        let mut overlap_length = 0;
        for (i, piece) in pieces.iter().enumerate() {
            if i > 0 {
                content.push_str(if piece.paragraph_start || piece.section_start {
                    "\n\n"
                } else {
                    " "
                });
            }
            if i == fresh_from {
                overlap_length = content.len();
            }
            for (j, word) in piece.text(self.source).split_whitespace().enumerate() {
                if j > 0 {
                    content.push(' ');
                }
                content.push_str(word);
            }
        }
        (content, overlap_length)
    }

    fn finish(mut self) -> Vec<Chunk> {
        if self.has_fresh() {
            let pieces = std::mem::take(&mut self.buffer);
            self.emit(&pieces, self.fresh_from);
        }
        self.chunks
    }
}
