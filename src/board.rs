//! Per-level flip/match state: card faces, the flipped buffer, the board
//! lock, and two-card resolution. Timing lives in [`crate::session`]; this
//! module only records that a mismatch is awaiting its flip-back.

use std::collections::HashSet;

use rand::Rng;

use crate::deck;
use crate::types::{Card, CardId, Level};

/// Outcome of a single flip request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    /// Flip was invalid (locked board, full buffer, unknown card, card
    /// already face-up or matched). Nothing changed.
    Rejected,
    /// First card of a comparison turned face-up.
    Flipped,
    /// Second card completed a pair. `level_cleared` is true when this was
    /// the level's final pair.
    Matched { pair_id: u32, level_cleared: bool },
    /// Second card did not match; the board is now locked until
    /// [`Board::resolve_mismatch`] flips both cards back.
    Mismatched,
}

/// The live deck for one level plus comparison state.
#[derive(Debug, Clone)]
pub struct Board {
    cards: Vec<Card>,
    flipped: Vec<CardId>,
    locked: bool,
    matched_pairs: HashSet<u32>,
    pair_count: usize,
}

impl Board {
    /// Build a board with a freshly shuffled deck for `level`.
    pub fn new(level: &Level) -> Self {
        Self::from_cards(deck::build(level), level.pairs.len())
    }

    /// Deterministic variant for tests.
    pub fn with_rng<R: Rng + ?Sized>(level: &Level, rng: &mut R) -> Self {
        Self::from_cards(deck::build_with_rng(level, rng), level.pairs.len())
    }

    fn from_cards(cards: Vec<Card>, pair_count: usize) -> Self {
        Self {
            cards,
            flipped: Vec::with_capacity(2),
            locked: false,
            matched_pairs: HashSet::new(),
            pair_count,
        }
    }

    /// Attempt to turn a card face-up. Guards run before any mutation, so a
    /// rejected flip leaves the board untouched.
    pub fn flip(&mut self, id: CardId) -> FlipOutcome {
        if self.locked || self.flipped.len() >= 2 {
            return FlipOutcome::Rejected;
        }
        let Some(card) = self.cards.iter_mut().find(|c| c.id == id) else {
            return FlipOutcome::Rejected;
        };
        if card.face_up || card.matched {
            return FlipOutcome::Rejected;
        }

        card.face_up = true;
        self.flipped.push(id);

        if self.flipped.len() < 2 {
            return FlipOutcome::Flipped;
        }

        // Second card: lock and resolve immediately.
        self.locked = true;
        let (first, second) = (self.flipped[0], self.flipped[1]);
        if self.pair_ids_match(first, second) {
            let pair_id = self.pair_id_of(first);
            for card in &mut self.cards {
                if card.id == first || card.id == second {
                    card.matched = true;
                    card.face_up = true;
                }
            }
            self.matched_pairs.insert(pair_id);
            self.flipped.clear();
            self.locked = false;
            FlipOutcome::Matched {
                pair_id,
                level_cleared: self.is_cleared(),
            }
        } else {
            // Stay locked; the flip-back happens after the host delay.
            FlipOutcome::Mismatched
        }
    }

    /// Flip the two mismatched cards back face-down and unlock. No-op unless
    /// a mismatch is actually pending.
    pub fn resolve_mismatch(&mut self) {
        if !(self.locked && self.flipped.len() == 2) {
            return;
        }
        for id in self.flipped.drain(..) {
            if let Some(card) = self.cards.iter_mut().find(|c| c.id == id) {
                card.face_up = false;
            }
        }
        self.locked = false;
    }

    /// True once every pair has been matched.
    pub fn is_cleared(&self) -> bool {
        self.matched_pairs.len() == self.pair_count
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn flipped(&self) -> &[CardId] {
        &self.flipped
    }

    pub fn matched_pairs(&self) -> &HashSet<u32> {
        &self.matched_pairs
    }

    pub fn pair_count(&self) -> usize {
        self.pair_count
    }

    fn pair_id_of(&self, id: CardId) -> u32 {
        self.cards
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.pair_id)
            .unwrap_or(0)
    }

    fn pair_ids_match(&self, a: CardId, b: CardId) -> bool {
        self.pair_id_of(a) == self.pair_id_of(b)
    }
}
