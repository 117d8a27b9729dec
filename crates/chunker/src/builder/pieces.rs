//! Conversion of segmenter units into budget-sized pieces.

use std::ops::Range;

use vecready_core::TokenTally;

use crate::segment::{split_paragraphs, split_sentences, split_words, TextUnit, UnitKind};

/// Split granularity, coarsest last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Granularity {
    Word,
    Sentence,
    Paragraph,
    Section,
}

impl From<UnitKind> for Granularity {
    fn from(kind: UnitKind) -> Self {
        match kind {
            UnitKind::Sentence => Granularity::Sentence,
            UnitKind::Paragraph => Granularity::Paragraph,
            UnitKind::HeaderSection => Granularity::Section,
        }
    }
}

/// The builder's working unit: a source range plus its token tally.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Piece {
    pub range: Range<usize>,
    pub tally: TokenTally,
    pub granularity: Granularity,
    pub heading: Option<String>,
    /// A chunk must never span across the start of this piece.
    pub section_start: bool,
    /// The piece opens a paragraph (or section) in the source.
    pub paragraph_start: bool,
}

impl Piece {
    pub fn from_unit(source: &str, unit: &TextUnit, heading: Option<String>) -> Self {
        Self {
            tally: TokenTally::of(&source[unit.range.clone()]),
            range: unit.range.clone(),
            granularity: unit.kind.into(),
            heading,
            section_start: false,
            paragraph_start: unit.kind != UnitKind::Sentence,
        }
    }

    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.range.clone()]
    }

    pub fn tokens(&self) -> usize {
        self.tally.tokens()
    }

    fn child(&self, source: &str, range: Range<usize>, granularity: Granularity, first: bool) -> Piece {
        Piece {
            tally: TokenTally::of(&source[range.clone()]),
            range,
            granularity,
            heading: self.heading.clone(),
            section_start: first && self.section_start,
            paragraph_start: if first {
                self.paragraph_start
            } else {
                granularity >= Granularity::Paragraph
            },
        }
    }

    /// Split one level finer. Word pieces cannot be split and return themselves.
    pub fn split_finer(&self, source: &str) -> Vec<Piece> {
        let (ranges, granularity) = match self.granularity {
            Granularity::Section => (split_paragraphs(source, self.range.clone()), Granularity::Paragraph),
            Granularity::Paragraph => (split_sentences(source, self.range.clone()), Granularity::Sentence),
            Granularity::Sentence => (split_words(source, self.range.clone()), Granularity::Word),
            Granularity::Word => return vec![self.clone()],
        };
        ranges
            .into_iter()
            .enumerate()
            .map(|(i, r)| self.child(source, r, granularity, i == 0))
            .collect()
    }

    /// Trailing words of this piece as word pieces.
    pub fn words(&self, source: &str) -> Vec<Piece> {
        split_words(source, self.range.clone())
            .into_iter()
            .map(|r| self.child(source, r, Granularity::Word, false))
            .collect()
    }
}

/// Split `piece` until every part is at or below `target` granularity.
pub(crate) fn refine(source: &str, piece: Piece, target: Granularity) -> Vec<Piece> {
    if piece.granularity <= target {
        return vec![piece];
    }
    piece
        .split_finer(source)
        .into_iter()
        .flat_map(|p| refine(source, p, target))
        .collect()
}

/// Recursively split pieces whose estimate exceeds `max_tokens` at the next
/// finer granularity (section → paragraph → sentence → word). A single word
/// is never split further, even when it overshoots.
pub(crate) fn fit_to_budget(source: &str, piece: Piece, max_tokens: usize) -> Vec<Piece> {
    if piece.tokens() <= max_tokens || piece.granularity == Granularity::Word {
        return vec![piece];
    }
    piece
        .split_finer(source)
        .into_iter()
        .flat_map(|p| fit_to_budget(source, p, max_tokens))
        .collect()
}
