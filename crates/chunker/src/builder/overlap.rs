//! Trailing overlap carried from a closed chunk into the next one.

use vecready_core::TokenTally;

use super::pieces::Piece;

/// Pieces from the end of `closed` whose combined estimate fits `budget`.
///
/// Walks backward piece by piece and stops at the first piece that would
/// overshoot. When not even the last piece fits, falls back to the last
/// piece's trailing words. The result is in source order and never forces a
/// section break.
pub(crate) fn trailing_overlap(source: &str, closed: &[Piece], budget: usize) -> Vec<Piece> {
    if budget == 0 {
        return Vec::new();
    }
    let Some(last) = closed.last() else {
        return Vec::new();
    };

    let mut taken = take_backward(closed, budget);
    if taken.is_empty() {
        taken = take_backward(&last.words(source), budget);
    }
    for piece in &mut taken {
        piece.section_start = false;
    }
    taken
}

fn take_backward(pieces: &[Piece], budget: usize) -> Vec<Piece> {
    let mut tally = TokenTally::default();
    let mut taken = Vec::new();
    for piece in pieces.iter().rev() {
        let next = tally + piece.tally;
        if next.tokens() > budget {
            break;
        }
        tally = next;
        taken.push(piece.clone());
    }
    taken.reverse();
    taken
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::pieces::{refine, Granularity};
    use crate::segment::segment;

    fn sentence_pieces(text: &str) -> Vec<Piece> {
        segment(text)
            .iter()
            .map(|u| Piece::from_unit(text, u, None))
            .flat_map(|p| refine(text, p, Granularity::Sentence))
            .collect()
    }

    fn joined(text: &str, pieces: &[Piece]) -> String {
        pieces.iter().map(|p| p.text(text)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn zero_budget_means_no_overlap() {
        let text = "One two. Three four.";
        assert!(trailing_overlap(text, &sentence_pieces(text), 0).is_empty());
    }

    #[test]
    fn whole_sentences_when_they_fit() {
        let text = "Alpha beta gamma delta epsilon. Zeta eta. Theta iota.";
        let pieces = sentence_pieces(text);
        // "Theta iota." = 2 words + 1 special = 2 tokens; "Zeta eta." also 2.
        let overlap = trailing_overlap(text, &pieces, 4);
        assert_eq!(joined(text, &overlap), "Zeta eta. Theta iota.");
    }

    #[test]
    fn stops_at_first_piece_that_overshoots() {
        let text = "Short. A much longer sentence sits in the middle here. Tail end.";
        let pieces = sentence_pieces(text);
        let overlap = trailing_overlap(text, &pieces, 3);
        assert_eq!(joined(text, &overlap), "Tail end.");
    }

    #[test]
    fn falls_back_to_trailing_words() {
        let text = "Intro. The final sentence is far too long for the overlap budget.";
        let pieces = sentence_pieces(text);
        let overlap = trailing_overlap(text, &pieces, 2);
        assert!(overlap.iter().all(|p| p.granularity == Granularity::Word));
        assert_eq!(joined(text, &overlap), "overlap budget.");
    }

    #[test]
    fn deterministic_for_same_input() {
        let text = "First here. Second here. Third here. Fourth here.";
        let pieces = sentence_pieces(text);
        let a = trailing_overlap(text, &pieces, 5);
        let b = trailing_overlap(text, &pieces, 5);
        assert_eq!(a, b);
    }
}
