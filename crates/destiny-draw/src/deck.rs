//! Decks of cards.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cards::{Card, Element};

/// Suit order used when building a fresh deck.
const SUIT_ORDER: [Element; 4] = [Element::Air, Element::Fire, Element::Ice, Element::Earth];

/// An ordered pile of cards. The top of the deck is the end of the vector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// The standard 30-card deck: ranks 1-7 in four suits plus two jokers.
    #[must_use]
    pub fn standard() -> Self {
        Self::with_layout(7, 2)
    }

    /// Build an unshuffled deck with `ranks_per_suit` numbered cards in each
    /// suit followed by `jokers` jokers.
    #[must_use]
    pub fn with_layout(ranks_per_suit: u8, jokers: usize) -> Self {
        let mut cards = Vec::with_capacity(SUIT_ORDER.len() * usize::from(ranks_per_suit) + jokers);

        for element in SUIT_ORDER {
            for rank in 1..=ranks_per_suit {
                cards.push(Card::numbered(rank, element));
            }
        }
        cards.extend(std::iter::repeat_with(Card::joker).take(jokers));

        Self { cards }
    }

    /// Create a deck from explicit cards.
    #[must_use]
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    /// Shuffle the deck in place.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Take the top card.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Put cards on the bottom of the deck, in order.
    pub fn extend(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.cards.extend(cards);
    }

    /// Number of cards left.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the deck is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The cards, bottom first.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}
