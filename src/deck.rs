//! Deck builder: turns a level's pair list into a shuffled, face-down deck.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::{Card, CardId, CardSide, Level, Pair};

/// Build a freshly shuffled deck for a level: one word card and one picture
/// card per pair, all face-down and unmatched. Every call draws a new random
/// order; nothing is cached.
pub fn build(level: &Level) -> Vec<Card> {
    build_with_rng(level, &mut rand::rng())
}

/// Like [`build`] but with a caller-supplied RNG, so tests can seed it.
/// `shuffle` is an unbiased Fisher-Yates, so every permutation of the
/// `2n` cards is equally likely.
pub fn build_with_rng<R: Rng + ?Sized>(level: &Level, rng: &mut R) -> Vec<Card> {
    let mut cards = Vec::with_capacity(level.pairs.len() * 2);
    for pair in &level.pairs {
        cards.push(word_card(level.level, pair));
        cards.push(picture_card(level.level, pair));
    }
    cards.shuffle(rng);
    cards
}

fn word_card(level: u32, pair: &Pair) -> Card {
    Card {
        id: CardId::derive(level, pair.id, CardSide::Word),
        pair_id: pair.id,
        side: CardSide::Word,
        content: pair.word.clone(),
        image: None,
        face_up: false,
        matched: false,
    }
}

fn picture_card(level: u32, pair: &Pair) -> Card {
    Card {
        id: CardId::derive(level, pair.id, CardSide::Picture),
        pair_id: pair.id,
        side: CardSide::Picture,
        content: pair.picture_content().to_string(),
        image: pair.image.clone(),
        face_up: false,
        matched: false,
    }
}
