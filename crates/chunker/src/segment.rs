//! Structural segmentation of raw text into ordered, lossless units.
//!
//! Every non-whitespace byte of the input belongs to exactly one emitted
//! unit, units appear in source order, and `&source[unit.range] == unit.text`.
//! Only the whitespace between units is dropped.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use vecready_core::lexicon::is_abbreviation;

#[cfg(test)]
mod tests;

/// Structural kind of a [`TextUnit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnitKind {
    Sentence,
    Paragraph,
    HeaderSection,
}

/// A contiguous, trimmed span of the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextUnit {
    pub kind: UnitKind,
    pub text: String,
    /// Byte range into the original document.
    pub range: Range<usize>,
    /// Header nesting level (1 = top level) for header sections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    /// Header text (without markers) for header sections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
}

impl TextUnit {
    fn new(source: &str, kind: UnitKind, range: Range<usize>) -> Self {
        Self {
            kind,
            text: source[range.clone()].to_string(),
            range,
            level: None,
            heading: None,
        }
    }
}

/// Externally supplied header, for extractors whose output carries no
/// markdown markers (PDF outlines, DOCX heading styles).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderHint {
    pub text: String,
    pub level: u8,
}

impl HeaderHint {
    pub fn new(text: impl Into<String>, level: u8) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }
}

/// Segment `text`, choosing the strategy by structural detection:
/// header sections if any header is present, else paragraphs if there is
/// more than one, else sentences.
pub fn segment(text: &str) -> Vec<TextUnit> {
    segment_with_hints(text, &[])
}

/// Like [`segment`], additionally treating lines equal to a hint's text
/// (case-insensitive, surrounding whitespace ignored) as headers.
pub fn segment_with_hints(text: &str, hints: &[HeaderHint]) -> Vec<TextUnit> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let headers = find_headers(text, hints);
    if !headers.is_empty() {
        return header_sections(text, &headers);
    }

    let paragraphs = split_paragraphs(text, 0..text.len());
    if paragraphs.len() > 1 {
        return paragraphs
            .into_iter()
            .map(|r| TextUnit::new(text, UnitKind::Paragraph, r))
            .collect();
    }

    split_sentences(text, 0..text.len())
        .into_iter()
        .map(|r| TextUnit::new(text, UnitKind::Sentence, r))
        .collect()
}

// ── Headers ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct HeaderLine {
    start: usize,
    level: u8,
    title: String,
}

fn header_sections(text: &str, headers: &[HeaderLine]) -> Vec<TextUnit> {
    let mut units = Vec::new();

    // Preamble before the first header keeps paragraph granularity.
    for r in split_paragraphs(text, 0..headers[0].start) {
        units.push(TextUnit::new(text, UnitKind::Paragraph, r));
    }

    for (i, header) in headers.iter().enumerate() {
        let end = headers.get(i + 1).map(|h| h.start).unwrap_or(text.len());
        if let Some(range) = trim_range(text, header.start..end) {
            let mut unit = TextUnit::new(text, UnitKind::HeaderSection, range);
            unit.level = Some(header.level);
            unit.heading = Some(header.title.clone());
            units.push(unit);
        }
    }
    units
}

fn find_headers(text: &str, hints: &[HeaderHint]) -> Vec<HeaderLine> {
    let mut headers = Vec::new();
    let mut in_fence = false;

    for (start, line) in lines_with_offsets(text) {
        let trimmed = line.trim();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence || trimmed.is_empty() {
            continue;
        }
        if let Some((level, title)) = atx_header(line) {
            headers.push(HeaderLine { start, level, title });
        } else if let Some(hint) = hints
            .iter()
            .find(|h| h.text.trim().eq_ignore_ascii_case(trimmed))
        {
            headers.push(HeaderLine {
                start,
                level: hint.level.max(1),
                title: trimmed.to_string(),
            });
        }
    }
    headers
}

/// Parse a markdown ATX header (`#` .. `######` followed by a space).
fn atx_header(line: &str) -> Option<(u8, String)> {
    let trimmed = line.trim_start();
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let hashes = trimmed.bytes().take_while(|b| *b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &trimmed[hashes..];
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let title = rest.trim().trim_end_matches('#').trim();
    if title.is_empty() {
        return None;
    }
    Some((hashes as u8, title.to_string()))
}

/// Lines without their terminator, paired with the byte offset of their start.
fn lines_with_offsets(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0;
    text.split_inclusive('\n').map(move |raw| {
        let start = offset;
        offset += raw.len();
        (start, raw.trim_end_matches(['\n', '\r']))
    })
}

// ── Range splitters (absolute offsets into `source`) ────────────────────────

/// Shrink `range` to exclude leading/trailing whitespace; `None` if nothing remains.
pub(crate) fn trim_range(source: &str, range: Range<usize>) -> Option<Range<usize>> {
    let slice = &source[range.clone()];
    let trimmed_start = slice.trim_start();
    if trimmed_start.is_empty() {
        return None;
    }
    let lead = slice.len() - trimmed_start.len();
    let trail = slice.len() - slice.trim_end().len();
    Some(range.start + lead..range.end - trail)
}

/// Blank-line delimited paragraphs within `range`.
pub fn split_paragraphs(source: &str, range: Range<usize>) -> Vec<Range<usize>> {
    let base = range.start;
    let slice = &source[range];
    let mut paragraphs = Vec::new();
    let mut current: Option<Range<usize>> = None;

    for (offset, line) in lines_with_offsets(slice) {
        if line.trim().is_empty() {
            if let Some(r) = current.take() {
                paragraphs.extend(trim_range(source, r));
            }
            continue;
        }
        let line_end = base + offset + line.len();
        match current.as_mut() {
            Some(r) => r.end = line_end,
            None => current = Some(base + offset..line_end),
        }
    }
    if let Some(r) = current {
        paragraphs.extend(trim_range(source, r));
    }
    paragraphs
}

/// Sentences within `range`, broken after `.`, `!` or `?` (plus any closing
/// quotes/brackets) when followed by whitespace and a non-lowercase
/// character. Periods after known abbreviations or single-letter initials
/// do not break.
pub fn split_sentences(source: &str, range: Range<usize>) -> Vec<Range<usize>> {
    let base = range.start;
    let slice = &source[range];
    let chars: Vec<(usize, char)> = slice.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];
        if !is_terminal(c) {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < chars.len() && is_terminal(chars[j].1) {
            j += 1;
        }
        while j < chars.len() && is_closer(chars[j].1) {
            j += 1;
        }
        let end = chars.get(j).map(|(p, _)| *p).unwrap_or(slice.len());
        let followed_by_space = chars.get(j).map_or(true, |(_, ch)| ch.is_whitespace());
        let single_period = c == '.' && j == i + 1;

        if followed_by_space && !(single_period && abbreviation_before(slice, pos)) {
            let next = chars[j..].iter().find(|(_, ch)| !ch.is_whitespace());
            if next.map_or(true, |(_, ch)| !ch.is_lowercase()) {
                sentences.extend(trim_range(source, base + start..base + end));
                start = end;
            }
        }
        i = j;
    }
    sentences.extend(trim_range(source, base + start..base + slice.len()));
    sentences
}

/// Whitespace-delimited words within `range`.
pub fn split_words(source: &str, range: Range<usize>) -> Vec<Range<usize>> {
    let base = range.start;
    let slice = &source[range];
    let mut words = Vec::new();
    let mut start: Option<usize> = None;

    for (pos, c) in slice.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                words.push(base + s..base + pos);
                start = None;
            }
            (false, None) => start = Some(pos),
            _ => {}
        }
    }
    if let Some(s) = start {
        words.push(base + s..base + slice.len());
    }
    words
}

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closer(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '\u{201D}' | '\u{2019}' | '\u{00BB}')
}

/// Whether the word ending at byte `dot` (exclusive) is an abbreviation or a
/// single-letter initial.
fn abbreviation_before(text: &str, dot: usize) -> bool {
    let word_start = text[..dot]
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(p, c)| p + c.len_utf8())
        .unwrap_or(0);
    let word = text[word_start..dot]
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    if word.is_empty() {
        return false;
    }
    is_abbreviation(&word) || (word.chars().count() == 1 && word.chars().all(char::is_alphabetic))
}
