use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::tokens::TokenTally;

/// Opaque metadata supplied by the extractor and passed through untouched.
pub type SourceMetadata = serde_json::Map<String, serde_json::Value>;

/// A bounded span of document text, immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// Zero-padded sequential id, unique within one chunking run.
    pub id: String,
    /// 0-based position in the output sequence.
    pub index: usize,
    /// Leading overlap (if any) followed by the chunk's own text.
    pub content: String,
    pub token_count: usize,
    pub word_count: usize,
    pub character_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_metadata: Option<SourceMetadata>,
    /// Nearest enclosing header, when the source had one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_heading: Option<String>,
    /// Byte range of the non-overlap content in the source text.
    pub source_range: Range<usize>,
    /// Bytes at the start of `content` carried over from the previous chunk.
    pub overlap_length: usize,
    pub unit_count: usize,
    /// Single unsplittable word that still exceeds the token budget.
    #[serde(default)]
    pub overshoot: bool,
}

impl Chunk {
    /// Build a chunk with every derived count filled in from `content`.
    pub fn new(index: usize, content: String) -> Self {
        let tally = TokenTally::of(&content);
        let end = content.len();
        Self {
            id: chunk_id(index),
            index,
            token_count: tally.tokens(),
            word_count: tally.words,
            character_count: content.chars().count(),
            content,
            tags: Vec::new(),
            source_metadata: None,
            section_heading: None,
            source_range: 0..end,
            overlap_length: 0,
            unit_count: 1,
            overshoot: false,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_source_metadata(mut self, metadata: SourceMetadata) -> Self {
        self.source_metadata = Some(metadata);
        self
    }

    /// Content without the leading overlap.
    pub fn fresh_content(&self) -> &str {
        self.content
            .get(self.overlap_length..)
            .unwrap_or(&self.content)
            .trim_start()
    }

    /// Overlap carried from the previous chunk, empty when there is none.
    pub fn overlap_text(&self) -> &str {
        self.content
            .get(..self.overlap_length)
            .unwrap_or("")
            .trim_end()
    }
}

/// `chunk_001`, `chunk_002`, ... (width grows past 999).
pub fn chunk_id(index: usize) -> String {
    format!("chunk_{:03}", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_counts() {
        let chunk = Chunk::new(0, "Héllo world, again.".to_string());
        assert_eq!(chunk.id, "chunk_001");
        assert_eq!(chunk.word_count, 3);
        assert_eq!(chunk.character_count, 19);
        assert_eq!(chunk.token_count, 3);
    }

    #[test]
    fn ids_are_zero_padded_and_sequential() {
        assert_eq!(chunk_id(0), "chunk_001");
        assert_eq!(chunk_id(41), "chunk_042");
        assert_eq!(chunk_id(1499), "chunk_1500");
    }

    #[test]
    fn fresh_content_skips_overlap() {
        let mut chunk = Chunk::new(1, "tail words. New text here.".to_string());
        chunk.overlap_length = "tail words.".len();
        assert_eq!(chunk.overlap_text(), "tail words.");
        assert_eq!(chunk.fresh_content(), "New text here.");
    }
}
