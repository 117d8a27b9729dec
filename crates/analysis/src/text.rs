//! Lightweight text features shared by the scorers and the simulator.

use indexmap::IndexMap;
use vecready_chunker::segment::split_sentences;
use vecready_core::lexicon::{content_words, is_stop_word, normalized_words};

/// Sentences of `text`, trimmed, in order.
pub(crate) fn sentences(text: &str) -> Vec<&str> {
    split_sentences(text, 0..text.len())
        .into_iter()
        .map(|r| &text[r])
        .collect()
}

/// Content words ranked by frequency, ties broken by first occurrence.
/// Words shorter than three characters are ignored.
pub(crate) fn keywords(text: &str, limit: usize) -> Vec<String> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for word in content_words(text) {
        if word.chars().count() >= 3 {
            *counts.entry(word).or_default() += 1;
        }
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    // Stable: equal counts keep first-occurrence order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(limit).map(|(w, _)| w).collect()
}

/// Capitalized words (and runs of them) that do not open a sentence,
/// deduplicated in order of appearance.
pub(crate) fn entities(text: &str, limit: usize) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for sentence in sentences(text) {
        let mut run: Vec<&str> = Vec::new();
        for (i, raw) in sentence.split_whitespace().enumerate() {
            let word = raw.trim_matches(|c: char| !c.is_alphanumeric());
            let capitalized = word.chars().next().is_some_and(char::is_uppercase)
                && word.chars().count() > 1
                && !is_stop_word(&word.to_lowercase());
            if capitalized && i > 0 {
                run.push(word);
            } else {
                push_entity(&mut found, &run);
                run.clear();
            }
            // A run ends at trailing punctuation ("Paris, France").
            if raw.ends_with(|c: char| !c.is_alphanumeric()) {
                push_entity(&mut found, &run);
                run.clear();
            }
        }
        push_entity(&mut found, &run);
    }
    found.truncate(limit);
    found
}

fn push_entity(found: &mut Vec<String>, run: &[&str]) {
    if run.is_empty() {
        return;
    }
    let entity = run.join(" ");
    if !found.iter().any(|e| e.eq_ignore_ascii_case(&entity)) {
        found.push(entity);
    }
}

/// Words of `text`, lowercased with outer punctuation stripped.
pub(crate) fn words(text: &str) -> Vec<String> {
    normalized_words(text)
}

/// Whether a raw token looks like a technical term: long, alphanumeric mix,
/// inner capitals, an acronym, or a hyphen/underscore compound.
pub(crate) fn is_technical_term(raw: &str) -> bool {
    let token = raw.trim_matches(|c: char| !c.is_alphanumeric());
    let letters = token.chars().filter(|c| c.is_alphabetic()).count();
    if letters == 0 {
        return false;
    }
    let len = token.chars().count();
    let has_digit = token.chars().any(|c| c.is_ascii_digit());
    let inner_capital = token.chars().skip(1).any(char::is_uppercase)
        && token.chars().any(char::is_lowercase);
    let acronym = len >= 2 && token.chars().all(|c| c.is_uppercase() || c.is_ascii_digit());
    let compound = token.contains(['-', '_']);

    len >= 10 || has_digit || inner_capital || acronym || compound
}
