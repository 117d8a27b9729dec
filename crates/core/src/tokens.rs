//! Approximate token accounting.
//!
//! The estimate is a budgeting heuristic, not a tokenizer: every
//! whitespace-delimited word costs 0.75 tokens and every punctuation or
//! special character costs 0.25, rounded up. Both counts are additive over
//! whitespace-joined text, so a running [`TokenTally`] can track a buffer of
//! units without re-scanning it.

use serde::{Deserialize, Serialize};

/// Per-word multiplier, expressed in quarters of a token.
const WORD_WEIGHT_QUARTERS: usize = 3;
/// Per punctuation/special character multiplier, in quarters of a token.
const SPECIAL_WEIGHT_QUARTERS: usize = 1;

/// Raw counts behind a token estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTally {
    pub words: usize,
    pub specials: usize,
}

impl TokenTally {
    pub fn of(text: &str) -> Self {
        let mut words = 0;
        let mut specials = 0;
        let mut in_word = false;
        for c in text.chars() {
            if c.is_whitespace() {
                in_word = false;
                continue;
            }
            if !in_word {
                words += 1;
                in_word = true;
            }
            if !c.is_alphanumeric() {
                specials += 1;
            }
        }
        Self { words, specials }
    }

    /// Estimated token count, never fractional.
    pub fn tokens(&self) -> usize {
        let quarters = self.words * WORD_WEIGHT_QUARTERS + self.specials * SPECIAL_WEIGHT_QUARTERS;
        quarters.div_ceil(4)
    }

    pub fn is_empty(&self) -> bool {
        self.words == 0
    }
}

impl std::ops::Add for TokenTally {
    type Output = TokenTally;

    fn add(self, rhs: Self) -> Self::Output {
        TokenTally {
            words: self.words + rhs.words,
            specials: self.specials + rhs.specials,
        }
    }
}

impl std::ops::AddAssign for TokenTally {
    fn add_assign(&mut self, rhs: Self) {
        self.words += rhs.words;
        self.specials += rhs.specials;
    }
}

impl std::ops::SubAssign for TokenTally {
    fn sub_assign(&mut self, rhs: Self) {
        self.words = self.words.saturating_sub(rhs.words);
        self.specials = self.specials.saturating_sub(rhs.specials);
    }
}

impl std::iter::Sum for TokenTally {
    fn sum<I: Iterator<Item = TokenTally>>(iter: I) -> Self {
        iter.fold(TokenTally::default(), |acc, t| acc + t)
    }
}

/// Estimate the token count of `text`. Empty or whitespace-only text is 0.
pub fn estimate_tokens(text: &str) -> usize {
    TokenTally::of(text).tokens()
}
