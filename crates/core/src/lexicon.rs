//! Fixed word lists shared by the segmenter, the chunk builder and the
//! quality analyzer.

use serde::{Deserialize, Serialize};

/// Common English function words, excluded from content-word statistics.
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Abbreviations whose trailing period never ends a sentence.
/// Stored lowercase, without the final period.
pub const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "inc", "ltd",
    "corp", "fig", "figs", "vol", "approx", "dept", "mt", "gen", "gov", "sen", "rep", "jan",
    "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec", "al", "cf",
    "eq", "ref", "sec", "ch", "pp",
];

/// Strength of a discourse transition marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionTier {
    Weak,
    Medium,
    Strong,
}

impl TransitionTier {
    /// Boundary preference weight in `[0, 1]`.
    pub fn weight(self) -> f64 {
        match self {
            TransitionTier::Strong => 1.0,
            TransitionTier::Medium => 0.6,
            TransitionTier::Weak => 0.3,
        }
    }
}

/// Whether a marker tends to open a new thought or close the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionRole {
    /// Contrast and sequence words: a cut belongs before the sentence.
    Opening,
    /// Concluding words: a cut belongs after the sentence.
    Closing,
}

use TransitionRole::{Closing, Opening};
use TransitionTier::{Medium, Strong, Weak};

const TRANSITIONS: &[(&str, TransitionTier, TransitionRole)] = &[
    ("however", Strong, Opening),
    ("on the other hand", Strong, Opening),
    ("nevertheless", Strong, Opening),
    ("nonetheless", Strong, Opening),
    ("in contrast", Strong, Opening),
    ("conversely", Strong, Opening),
    ("in conclusion", Strong, Closing),
    ("in summary", Strong, Closing),
    ("to summarize", Strong, Closing),
    ("to conclude", Strong, Closing),
    ("finally", Strong, Closing),
    ("furthermore", Medium, Opening),
    ("moreover", Medium, Opening),
    ("additionally", Medium, Opening),
    ("in addition", Medium, Opening),
    ("meanwhile", Medium, Opening),
    ("subsequently", Medium, Opening),
    ("next", Medium, Opening),
    ("similarly", Medium, Opening),
    ("instead", Medium, Opening),
    ("consequently", Medium, Closing),
    ("therefore", Medium, Closing),
    ("as a result", Medium, Closing),
    ("also", Weak, Opening),
    ("but", Weak, Opening),
    ("then", Weak, Opening),
    ("first", Weak, Opening),
    ("second", Weak, Opening),
    ("third", Weak, Opening),
    ("besides", Weak, Opening),
    ("still", Weak, Opening),
    ("yet", Weak, Opening),
    ("thus", Weak, Closing),
    ("hence", Weak, Closing),
];

/// Strongest transition marker of `role` found in `text`, if any.
///
/// Markers match whole words only, so "butter" never matches "but".
pub fn transition_with_role(text: &str, role: Option<TransitionRole>) -> Option<TransitionTier> {
    let normalized = normalized_words(text);
    if normalized.is_empty() {
        return None;
    }
    let padded = format!(" {} ", normalized.join(" "));
    TRANSITIONS
        .iter()
        .filter(|(_, _, r)| role.map_or(true, |want| want == *r))
        .filter(|(marker, _, _)| padded.contains(&format!(" {marker} ")))
        .map(|(_, tier, _)| *tier)
        .max()
}

/// Strongest transition marker of either role found in `sentence`.
pub fn transition_tier(sentence: &str) -> Option<TransitionTier> {
    transition_with_role(sentence, None)
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

pub fn is_abbreviation(word: &str) -> bool {
    ABBREVIATIONS.contains(&word)
}

/// Lowercased words with surrounding punctuation stripped. Empty words are
/// dropped; inner punctuation (`don't`, `e.g`, `gpt-4`) is kept.
pub fn normalized_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// Normalized words that are not stop words and carry at least one letter.
pub fn content_words(text: &str) -> Vec<String> {
    normalized_words(text)
        .into_iter()
        .filter(|w| !is_stop_word(w) && w.chars().any(char::is_alphabetic))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_transition_tiers() {
        assert_eq!(
            transition_tier("However, the results differ."),
            Some(TransitionTier::Strong)
        );
        assert_eq!(
            transition_tier("The second test, in addition, passed."),
            Some(TransitionTier::Medium)
        );
        assert_eq!(transition_tier("It also works."), Some(TransitionTier::Weak));
        assert_eq!(transition_tier("Plain sentence here."), None);
    }

    #[test]
    fn roles_separate_openers_from_closers() {
        assert_eq!(
            transition_with_role("However, dogs bark.", Some(TransitionRole::Closing)),
            None
        );
        assert_eq!(
            transition_with_role("In conclusion it works.", Some(TransitionRole::Closing)),
            Some(TransitionTier::Strong)
        );
        assert_eq!(
            transition_with_role("Therefore, next steps.", Some(TransitionRole::Opening)),
            Some(TransitionTier::Medium)
        );
    }

    #[test]
    fn markers_match_whole_words_only() {
        // "butter" must not match "but", "thence" must not match "then".
        assert_eq!(transition_tier("Add butter thence."), None);
    }

    #[test]
    fn content_words_drop_stop_words_and_numbers() {
        let words = content_words("The parser reads 42 tokens, and the lexer emits them.");
        assert_eq!(words, vec!["parser", "reads", "tokens", "lexer", "emits"]);
    }
}
