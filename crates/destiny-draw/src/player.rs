//! Per-player combat state: deck, hand and discard pile.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::cards::Card;
use crate::deck::Deck;
use crate::error::{Error, Result};
use crate::resolution::{find_resolutions, Resolution};

/// One player's cards during a combat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Remaining draw pile.
    pub deck: Deck,
    /// Cards currently held.
    pub hand: Vec<Card>,
    /// Cards spent by mulligans and resolutions.
    pub discard: Vec<Card>,
}

impl PlayerState {
    /// Start from `deck`, shuffled. Hand and discard begin empty.
    pub fn new<R: Rng + ?Sized>(mut deck: Deck, rng: &mut R) -> Self {
        deck.shuffle(rng);
        Self {
            deck,
            hand: Vec::new(),
            discard: Vec::new(),
        }
    }

    /// Total cards owned across deck, hand and discard.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.deck.len() + self.hand.len() + self.discard.len()
    }

    /// Draw `count` cards into the hand.
    ///
    /// When the deck runs out, the discard pile is shuffled back into it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CardsExhausted`] when both piles are empty. Cards drawn
    /// before that point stay in the hand.
    pub fn draw_to_hand<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> Result<()> {
        for _ in 0..count {
            if self.deck.is_empty() {
                if self.discard.is_empty() {
                    return Err(Error::CardsExhausted);
                }
                debug!(
                    cards = self.discard.len(),
                    "Reshuffling discard pile into deck"
                );
                self.deck.extend(self.discard.drain(..));
                self.deck.shuffle(rng);
            }

            let card = self.deck.draw().ok_or(Error::CardsExhausted)?;
            trace!(card = %card, "Drew card");
            self.hand.push(card);
        }
        Ok(())
    }

    /// Move the card at `index` from the hand to the discard pile.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CardIndexOutOfBounds`] if `index` is not in the hand.
    pub fn discard_from_hand(&mut self, index: usize) -> Result<()> {
        if index >= self.hand.len() {
            return Err(Error::CardIndexOutOfBounds {
                index,
                len: self.hand.len(),
            });
        }
        let card = self.hand.remove(index);
        self.discard.push(card);
        Ok(())
    }

    /// Discard the cards at the given 0-based positions and draw replacements.
    ///
    /// Duplicate positions count once. Returns the number of cards replaced.
    ///
    /// # Errors
    ///
    /// Fails without touching the hand if a position is out of bounds, or with
    /// [`Error::CardsExhausted`] if replacements run out.
    pub fn mulligan<R: Rng + ?Sized>(&mut self, positions: &[usize], rng: &mut R) -> Result<usize> {
        let mut positions = positions.to_vec();
        positions.sort_unstable_by(|a, b| b.cmp(a));
        positions.dedup();

        if let Some(&index) = positions.first().filter(|&&i| i >= self.hand.len()) {
            return Err(Error::CardIndexOutOfBounds {
                index,
                len: self.hand.len(),
            });
        }

        for &index in &positions {
            self.discard_from_hand(index)?;
        }
        self.draw_to_hand(positions.len(), rng)?;
        Ok(positions.len())
    }

    /// Every resolution available in the current hand.
    #[must_use]
    pub fn possible_resolutions(&self, joker_value: u8) -> Vec<Resolution> {
        find_resolutions(&self.hand, joker_value)
    }

    /// Spend the cards of `resolution` and draw back up to `hand_size`.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolution refers to positions outside the hand
    /// or the piles run out while refilling.
    pub fn resolve<R: Rng + ?Sized>(
        &mut self,
        resolution: &Resolution,
        hand_size: usize,
        rng: &mut R,
    ) -> Result<()> {
        let mut positions = resolution.positions.clone();
        positions.sort_unstable_by(|a, b| b.cmp(a));

        if let Some(&index) = positions.first().filter(|&&i| i >= self.hand.len()) {
            return Err(Error::CardIndexOutOfBounds {
                index,
                len: self.hand.len(),
            });
        }

        for &index in &positions {
            self.discard_from_hand(index)?;
        }

        let needed = hand_size.saturating_sub(self.hand.len());
        if needed > 0 {
            self.draw_to_hand(needed, rng)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Element;
    use crate::resolution::ResolutionKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1234)
    }

    fn fresh() -> (PlayerState, StdRng) {
        let mut rng = rng();
        let state = PlayerState::new(Deck::standard(), &mut rng);
        (state, rng)
    }

    /// A state whose deck is exactly `cards` (top card last) with no shuffle.
    fn stacked(cards: Vec<Card>) -> PlayerState {
        PlayerState {
            deck: Deck::from_cards(cards),
            hand: Vec::new(),
            discard: Vec::new(),
        }
    }

    #[test]
    fn test_new_state_is_shuffled_and_empty_handed() {
        let (state, _) = fresh();
        assert_eq!(state.deck.len(), 30);
        assert!(state.hand.is_empty());
        assert!(state.discard.is_empty());
        assert_ne!(state.deck, Deck::standard());
    }

    #[test]
    fn test_draw_to_hand() {
        let (mut state, mut rng) = fresh();
        state.draw_to_hand(5, &mut rng).unwrap();
        assert_eq!(state.hand.len(), 5);
        assert_eq!(state.deck.len(), 25);
        assert_eq!(state.card_count(), 30);
    }

    #[test]
    fn test_draw_reshuffles_discard() {
        let mut rng = rng();
        let mut state = stacked(vec![Card::numbered(1, Element::Air)]);
        state.discard = vec![
            Card::numbered(2, Element::Air),
            Card::numbered(3, Element::Air),
        ];

        state.draw_to_hand(3, &mut rng).unwrap();
        assert_eq!(state.hand.len(), 3);
        assert!(state.deck.is_empty());
        assert!(state.discard.is_empty());
    }

    #[test]
    fn test_draw_exhausted_keeps_partial_draw() {
        let mut rng = rng();
        let mut state = stacked(vec![Card::joker()]);

        let result = state.draw_to_hand(2, &mut rng);
        assert!(matches!(result, Err(Error::CardsExhausted)));
        assert_eq!(state.hand.len(), 1);
    }

    #[test]
    fn test_discard_from_hand() {
        let (mut state, mut rng) = fresh();
        state.draw_to_hand(5, &mut rng).unwrap();
        let second = state.hand[1].clone();

        state.discard_from_hand(1).unwrap();
        assert_eq!(state.hand.len(), 4);
        assert_eq!(state.discard, vec![second]);
    }

    #[test]
    fn test_discard_out_of_bounds() {
        let (mut state, mut rng) = fresh();
        state.draw_to_hand(5, &mut rng).unwrap();

        let result = state.discard_from_hand(5);
        assert!(matches!(
            result,
            Err(Error::CardIndexOutOfBounds { index: 5, len: 5 })
        ));
    }

    #[test]
    fn test_mulligan_replaces_cards() {
        let (mut state, mut rng) = fresh();
        state.draw_to_hand(5, &mut rng).unwrap();
        let kept = state.hand[1].clone();
        let dropped = vec![state.hand[0].clone(), state.hand[2].clone()];

        let replaced = state.mulligan(&[0, 2], &mut rng).unwrap();
        assert_eq!(replaced, 2);
        assert_eq!(state.hand.len(), 5);
        assert_eq!(state.hand[0], kept);
        assert_eq!(state.discard.len(), 2);
        for card in &dropped {
            assert!(state.discard.contains(card));
        }
    }

    #[test]
    fn test_mulligan_ignores_duplicates() {
        let (mut state, mut rng) = fresh();
        state.draw_to_hand(5, &mut rng).unwrap();

        let replaced = state.mulligan(&[3, 3, 3], &mut rng).unwrap();
        assert_eq!(replaced, 1);
        assert_eq!(state.discard.len(), 1);
        assert_eq!(state.hand.len(), 5);
    }

    #[test]
    fn test_mulligan_out_of_bounds_leaves_hand_untouched() {
        let (mut state, mut rng) = fresh();
        state.draw_to_hand(5, &mut rng).unwrap();
        let before = state.clone();

        assert!(state.mulligan(&[0, 9], &mut rng).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_resolve_discards_and_refills() {
        let mut rng = rng();
        let mut state = stacked(vec![
            Card::numbered(7, Element::Ice),
            Card::numbered(6, Element::Ice),
        ]);
        state.hand = vec![
            Card::numbered(2, Element::Fire),
            Card::numbered(5, Element::Air),
            Card::numbered(2, Element::Earth),
            Card::numbered(4, Element::Air),
            Card::numbered(3, Element::Air),
        ];

        let resolutions = state.possible_resolutions(7);
        assert_eq!(resolutions.len(), 1);
        assert_eq!(resolutions[0].kind, ResolutionKind::MatchedEdge);

        state.resolve(&resolutions[0], 5, &mut rng).unwrap();
        assert_eq!(state.hand.len(), 5);
        assert_eq!(state.hand[0], Card::numbered(5, Element::Air));
        assert_eq!(state.hand[3], Card::numbered(6, Element::Ice));
        assert_eq!(state.hand[4], Card::numbered(7, Element::Ice));
        assert_eq!(
            state.discard,
            vec![
                Card::numbered(2, Element::Earth),
                Card::numbered(2, Element::Fire)
            ]
        );
    }

    #[test]
    fn test_resolve_stale_positions() {
        let mut rng = rng();
        let mut state = stacked(Vec::new());
        state.hand = vec![Card::joker()];
        let stale = Resolution {
            kind: ResolutionKind::MatchedEdge,
            value: 7,
            elements: Element::ALL.to_vec(),
            positions: vec![0, 1],
        };

        assert!(matches!(
            state.resolve(&stale, 5, &mut rng),
            Err(Error::CardIndexOutOfBounds { index: 1, len: 1 })
        ));
        assert_eq!(state.hand.len(), 1);
    }

    #[test]
    fn test_state_serialization() {
        let (mut state, mut rng) = fresh();
        state.draw_to_hand(5, &mut rng).unwrap();

        let json = serde_json::to_string(&state).unwrap();
        let back: PlayerState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
