//! Cut-point selection for the semantic-boundary method.
//!
//! The naive cut closes the chunk right before the piece that overflowed.
//! Instead of taking it first-fit, every cut within [`SEMANTIC_WINDOW`]
//! pieces before it is scored by discourse signals and proximity, and the
//! best one wins. Ties go to the cut closest to the naive one.

use vecready_core::lexicon::{transition_with_role, TransitionRole};

use super::pieces::Piece;

/// How many pieces before the naive cut are considered.
pub const SEMANTIC_WINDOW: usize = 3;

const MARKER_WEIGHT: f64 = 0.6;
const PROXIMITY_WEIGHT: f64 = 0.4;
/// Opening words of the next sentence inspected for a transition marker.
const OPENER_WORDS: usize = 4;
const PARAGRAPH_BREAK_SIGNAL: f64 = 0.5;

/// Index into `buffer` at which to cut: `buffer[..cut]` is emitted.
///
/// `fresh_from` is the index of the first non-overlap piece; the cut always
/// keeps at least one fresh piece in the emitted chunk.
pub(crate) fn choose_cut(source: &str, buffer: &[Piece], fresh_from: usize) -> usize {
    let naive = buffer.len();
    let lowest = (fresh_from + 1).max(naive.saturating_sub(SEMANTIC_WINDOW));
    if lowest >= naive {
        return naive;
    }

    let mut best = naive;
    let mut best_score = f64::MIN;
    for cut in (lowest..=naive).rev() {
        let score = cut_score(source, buffer, cut, naive);
        if score > best_score {
            best = cut;
            best_score = score;
        }
    }
    best
}

fn cut_score(source: &str, buffer: &[Piece], cut: usize, naive: usize) -> f64 {
    // Cut right after a sentence carrying a concluding marker.
    let closing = transition_with_role(buffer[cut - 1].text(source), Some(TransitionRole::Closing))
        .map(|t| t.weight())
        .unwrap_or(0.0);

    // Cut right before a sentence opening with a contrast/sequence marker,
    // or before a new paragraph.
    let opening = buffer
        .get(cut)
        .map(|next| {
            let opener: String = next
                .text(source)
                .split_whitespace()
                .take(OPENER_WORDS)
                .collect::<Vec<_>>()
                .join(" ");
            let marker = transition_with_role(&opener, Some(TransitionRole::Opening))
                .map(|t| t.weight())
                .unwrap_or(0.0);
            let paragraph = if next.paragraph_start { PARAGRAPH_BREAK_SIGNAL } else { 0.0 };
            marker.max(paragraph)
        })
        .unwrap_or(0.0);

    let marker = closing.max(opening);
    let proximity = 1.0 - (naive - cut) as f64 / (SEMANTIC_WINDOW + 1) as f64;
    MARKER_WEIGHT * marker + PROXIMITY_WEIGHT * proximity
}
