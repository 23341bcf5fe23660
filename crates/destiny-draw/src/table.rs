//! The table: every player's combat state plus the shared shuffler.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::config::GameConfig;
use crate::deck::Deck;
use crate::error::Result;
use crate::player::PlayerState;

/// In-memory combat state for all players at the table.
#[derive(Debug)]
pub struct Table {
    rules: GameConfig,
    players: HashMap<String, PlayerState>,
    rng: StdRng,
}

impl Table {
    /// Create an empty table. Shuffles are seeded from `rules.seed` when set.
    #[must_use]
    pub fn new(rules: GameConfig) -> Self {
        let rng = match rules.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rules,
            players: HashMap::new(),
            rng,
        }
    }

    /// The deck and hand rules in force.
    #[must_use]
    pub fn rules(&self) -> &GameConfig {
        &self.rules
    }

    /// Throw away any existing state for `player`, shuffle a fresh deck and
    /// draw a full hand.
    ///
    /// # Errors
    ///
    /// Returns an error if the deck cannot supply a full hand.
    pub fn start_new_combat(&mut self, player: &str) -> Result<&mut PlayerState> {
        let deck = Deck::with_layout(self.rules.ranks_per_suit, self.rules.jokers);
        let mut state = PlayerState::new(deck, &mut self.rng);
        state.draw_to_hand(self.rules.hand_size, &mut self.rng)?;

        info!(player, "Started new combat");
        match self.players.entry(player.to_string()) {
            Entry::Occupied(mut slot) => {
                slot.insert(state);
                Ok(slot.into_mut())
            }
            Entry::Vacant(slot) => Ok(slot.insert(state)),
        }
    }

    /// Look up a player's state.
    #[must_use]
    pub fn get(&self, player: &str) -> Option<&PlayerState> {
        self.players.get(player)
    }

    /// Look up a player's state together with the table's shuffler.
    pub fn get_mut(&mut self, player: &str) -> Option<(&mut PlayerState, &mut StdRng)> {
        self.players.get_mut(player).map(|state| (state, &mut self.rng))
    }

    /// Seat a player with existing state (e.g. loaded from storage).
    pub fn insert(&mut self, player: &str, state: PlayerState) {
        self.players.insert(player.to_string(), state);
    }

    /// Remove a player from the table.
    pub fn remove(&mut self, player: &str) -> Option<PlayerState> {
        self.players.remove(player)
    }

    /// Ids of the seated players, sorted.
    #[must_use]
    pub fn players(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.players.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
