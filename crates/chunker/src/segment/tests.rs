//! Tests for structural segmentation.

use super::*;

/// Every non-whitespace byte is covered exactly once, in order.
fn assert_lossless(source: &str, units: &[TextUnit]) {
    let mut cursor = 0;
    for unit in units {
        assert!(unit.range.start >= cursor, "units overlap or are out of order");
        assert!(
            source[cursor..unit.range.start].trim().is_empty(),
            "dropped text: {:?}",
            &source[cursor..unit.range.start]
        );
        assert_eq!(&source[unit.range.clone()], unit.text);
        cursor = unit.range.end;
    }
    assert!(source[cursor..].trim().is_empty(), "dropped tail");
}

fn texts(source: &str, ranges: Vec<Range<usize>>) -> Vec<&str> {
    ranges.into_iter().map(|r| &source[r]).collect()
}

// ── Strategy detection ──────────────────────────────────────────────

#[test]
fn empty_and_whitespace_input_produce_nothing() {
    assert!(segment("").is_empty());
    assert!(segment("  \n\n\t \n").is_empty());
}

#[test]
fn headers_produce_sections_with_levels() {
    let text = "# Guide\nIntro text.\n\n## Install\nRun the installer.\n\n### Linux\nUse apt.";
    let units = segment(text);
    assert_eq!(units.len(), 3);
    assert!(units.iter().all(|u| u.kind == UnitKind::HeaderSection));
    assert_eq!(units[0].level, Some(1));
    assert_eq!(units[1].level, Some(2));
    assert_eq!(units[2].level, Some(3));
    assert_eq!(units[1].heading.as_deref(), Some("Install"));
    assert!(units[1].text.starts_with("## Install"));
    assert!(units[1].text.ends_with("installer."));
    assert_lossless(text, &units);
}

#[test]
fn preamble_before_first_header_is_kept() {
    let text = "Some preamble.\n\nMore preamble.\n\n# First\nBody.";
    let units = segment(text);
    assert_eq!(units.len(), 3);
    assert_eq!(units[0].kind, UnitKind::Paragraph);
    assert_eq!(units[1].kind, UnitKind::Paragraph);
    assert_eq!(units[2].kind, UnitKind::HeaderSection);
    assert_lossless(text, &units);
}

#[test]
fn hashes_inside_code_fences_are_not_headers() {
    let text = "Setup steps follow.\n\n```sh\n# comment, not a header\nmake\n```\n\nDone.";
    let units = segment(text);
    assert!(units.iter().all(|u| u.kind == UnitKind::Paragraph));
    assert_lossless(text, &units);
}

#[test]
fn hashtag_without_space_is_not_a_header() {
    let text = "#hashtag is not a header. Neither is this.";
    let units = segment(text);
    assert_eq!(units.len(), 2);
    assert!(units.iter().all(|u| u.kind == UnitKind::Sentence));
}

#[test]
fn header_hints_mark_plain_lines() {
    let text = "Executive Summary\nRevenue grew.\n\nRisks\nSupply is tight.";
    let hints = vec![
        HeaderHint::new("Executive Summary", 1),
        HeaderHint::new("risks", 2),
    ];
    let units = segment_with_hints(text, &hints);
    assert_eq!(units.len(), 2);
    assert_eq!(units[0].heading.as_deref(), Some("Executive Summary"));
    assert_eq!(units[1].level, Some(2));
    assert_lossless(text, &units);
}

#[test]
fn paragraphs_when_no_headers() {
    let text = "  First paragraph\nspans two lines.\n\n\n   Second paragraph.  \n";
    let units = segment(text);
    assert_eq!(units.len(), 2);
    assert_eq!(units[0].kind, UnitKind::Paragraph);
    assert_eq!(units[0].text, "First paragraph\nspans two lines.");
    assert_eq!(units[1].text, "Second paragraph.");
    assert_lossless(text, &units);
}

#[test]
fn sentences_when_single_paragraph() {
    let text = "One sentence. Two sentence! Three?";
    let units = segment(text);
    assert_eq!(units.len(), 3);
    assert!(units.iter().all(|u| u.kind == UnitKind::Sentence));
    assert_lossless(text, &units);
}

// ── Sentence boundaries ─────────────────────────────────────────────

#[test]
fn abbreviations_do_not_break_sentences() {
    let text = "Dr. Smith met Mr. Jones at 3 p.m. on Friday. They talked, e.g. about Rust vs. Go. J. R. R. Tolkien wrote books.";
    let sents = texts(text, split_sentences(text, 0..text.len()));
    assert_eq!(
        sents,
        vec![
            "Dr. Smith met Mr. Jones at 3 p.m. on Friday.",
            "They talked, e.g. about Rust vs. Go.",
            "J. R. R. Tolkien wrote books."
        ]
    );
}

#[test]
fn lowercase_continuation_does_not_break() {
    let text = "Version 2. is not a sentence end. Next one.";
    let sents = texts(text, split_sentences(text, 0..text.len()));
    assert_eq!(sents, vec!["Version 2. is not a sentence end.", "Next one."]);
}

#[test]
fn decimals_and_closing_quotes() {
    let text = "Pi is 3.14 roughly. He said \"stop.\" Then left.";
    let sents = texts(text, split_sentences(text, 0..text.len()));
    assert_eq!(sents, vec!["Pi is 3.14 roughly.", "He said \"stop.\"", "Then left."]);
}

#[test]
fn repeated_terminals_stay_together() {
    let text = "Really?! Yes... Okay.";
    let sents = texts(text, split_sentences(text, 0..text.len()));
    assert_eq!(sents, vec!["Really?!", "Yes...", "Okay."]);
}

#[test]
fn sub_range_offsets_are_absolute() {
    let text = "IGNORED. Alpha one. Beta two.";
    let start = "IGNORED. ".len();
    let ranges = split_sentences(text, start..text.len());
    assert_eq!(texts(text, ranges), vec!["Alpha one.", "Beta two."]);
}

#[test]
fn words_with_offsets() {
    let text = "  héllo   wörld\tagain ";
    let words = texts(text, split_words(text, 0..text.len()));
    assert_eq!(words, vec!["héllo", "wörld", "again"]);
}

#[test]
fn unicode_text_is_lossless() {
    let text = "Über café naïve. Ünïcödé «quotes» here.\n\nSecond — paragraph.";
    let units = segment(text);
    assert_eq!(units.len(), 2);
    assert_lossless(text, &units);
}
