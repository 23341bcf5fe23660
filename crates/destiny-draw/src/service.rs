//! Player-facing game commands.
//!
//! [`GameService`] ties the in-memory [`Table`] to optional persistent
//! [`Storage`] and turns every command into the text reply shown to the
//! player. Mistakes a player can make are answered with a friendly reply;
//! only system failures come back as errors.

use tracing::{debug, info, instrument};

use crate::cards::Card;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::{ResolutionRecord, Storage};
use crate::table::Table;

/// Reply for commands issued before a combat was started.
pub const NO_COMBAT_REPLY: &str =
    "You haven't started a combat yet! Use /start_new_combat to begin.";

/// Reply when the hand has nothing to resolve.
pub const NO_RESOLUTIONS_REPLY: &str = "No valid hands available.";

/// Reply for an out-of-range hand number.
pub const INVALID_HAND_NUMBER_REPLY: &str = "Invalid hand number.";

/// Reply after a combat has been ended.
pub const COMBAT_ENDED_REPLY: &str = "Combat ended. Your cards are put away.";

/// Runs game commands against a table, persisting changes when storage is attached.
#[derive(Debug)]
pub struct GameService {
    table: Table,
    storage: Option<Storage>,
    history_limit: Option<usize>,
}

impl GameService {
    /// Create a service with no persistence.
    #[must_use]
    pub fn in_memory(config: &Config) -> Self {
        Self {
            table: Table::new(config.game.clone()),
            storage: None,
            history_limit: config.history_limit(),
        }
    }

    /// Create a service backed by `storage`.
    #[must_use]
    pub fn with_storage(config: &Config, storage: Storage) -> Self {
        Self {
            storage: Some(storage),
            ..Self::in_memory(config)
        }
    }

    /// The attached storage, if any.
    #[must_use]
    pub fn storage(&self) -> Option<&Storage> {
        self.storage.as_ref()
    }

    /// The table this service plays on.
    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Start (or restart) a combat and deal a full hand.
    ///
    /// # Errors
    ///
    /// Returns an error if the deck cannot deal a hand or storage fails.
    #[instrument(skip(self))]
    pub fn start_new_combat(&mut self, player: &str) -> Result<String> {
        let hand_size = self.table.rules().hand_size;
        let state = self.table.start_new_combat(player)?;
        let hand = state.hand.clone();

        if let Some(storage) = &self.storage {
            storage.begin_combat(player, state)?;
        }

        Ok(format!(
            "Combat started! Drew {hand_size} cards.\n{}",
            format_hand(&hand)
        ))
    }

    /// Replace the cards at the given 1-based, whitespace-separated positions.
    ///
    /// # Errors
    ///
    /// Returns an error if replacements run out or storage fails.
    #[instrument(skip(self))]
    pub fn mulligan(&mut self, player: &str, positions: &str) -> Result<String> {
        if !self.ensure_seated(player)? {
            return Ok(NO_COMBAT_REPLY.to_string());
        }

        let hand_size = self.table.rules().hand_size;
        let (state, rng) = self
            .table
            .get_mut(player)
            .ok_or_else(|| Error::no_combat(player))?;

        let indices = match parse_positions(positions, hand_size, state.hand.len()) {
            Ok(indices) => indices,
            Err(e) => {
                debug!("Rejected mulligan: {e}");
                return Ok(format!(
                    "Please provide 1-{hand_size} valid card positions (1-{hand_size})"
                ));
            }
        };

        let replaced = state.mulligan(&indices, rng)?;
        info!(replaced, "Mulligan complete");
        let hand = state.hand.clone();
        self.persist(player)?;

        Ok(format!("Mulligan complete!\n{}", format_hand(&hand)))
    }

    /// Show the player's hand.
    ///
    /// # Errors
    ///
    /// Returns an error if loading from storage fails.
    pub fn view_hand(&mut self, player: &str) -> Result<String> {
        if !self.ensure_seated(player)? {
            return Ok(NO_COMBAT_REPLY.to_string());
        }
        let state = self
            .table
            .get(player)
            .ok_or_else(|| Error::no_combat(player))?;
        Ok(format_hand(&state.hand))
    }

    /// List every resolution available in the player's hand.
    ///
    /// # Errors
    ///
    /// Returns an error if loading from storage fails.
    pub fn view_possible_resolutions(&mut self, player: &str) -> Result<String> {
        if !self.ensure_seated(player)? {
            return Ok(NO_COMBAT_REPLY.to_string());
        }
        let joker_value = self.table.rules().joker_value;
        let state = self
            .table
            .get(player)
            .ok_or_else(|| Error::no_combat(player))?;

        let resolutions = state.possible_resolutions(joker_value);
        if resolutions.is_empty() {
            return Ok(NO_RESOLUTIONS_REPLY.to_string());
        }

        let mut reply = String::from("Available hands:\n");
        for (i, resolution) in resolutions.iter().enumerate() {
            reply.push_str(&format!("{}. {}\n", i + 1, resolution));
        }
        Ok(reply)
    }

    /// Resolve the `number`-th (1-based) entry of the resolution list.
    ///
    /// # Errors
    ///
    /// Returns an error if refilling the hand fails or storage fails.
    #[instrument(skip(self))]
    pub fn resolve_hand(&mut self, player: &str, number: usize) -> Result<String> {
        if !self.ensure_seated(player)? {
            return Ok(NO_COMBAT_REPLY.to_string());
        }

        let rules = self.table.rules().clone();
        let (state, rng) = self
            .table
            .get_mut(player)
            .ok_or_else(|| Error::no_combat(player))?;

        let mut resolutions = state.possible_resolutions(rules.joker_value);
        if number == 0 || number > resolutions.len() {
            debug!(
                "{}",
                Error::InvalidResolution {
                    number,
                    available: resolutions.len()
                }
            );
            return Ok(INVALID_HAND_NUMBER_REPLY.to_string());
        }

        let resolution = resolutions.swap_remove(number - 1);
        state.resolve(&resolution, rules.hand_size, rng)?;
        let hand = state.hand.clone();
        info!(kind = %resolution.kind, value = resolution.value, "Resolved hand");

        self.persist(player)?;
        if let Some(storage) = &self.storage {
            storage.record_resolution(player, &resolution)?;
            if let Some(keep) = self.history_limit {
                storage.prune_resolutions(player, keep)?;
            }
        }

        Ok(format!(
            "{}\n{}",
            resolution.effect_description(),
            format_hand(&hand)
        ))
    }

    /// End the player's combat, dropping their deck, hand and discard pile.
    ///
    /// Resolution history is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    #[instrument(skip(self))]
    pub fn end_combat(&mut self, player: &str) -> Result<String> {
        let seated = self.table.remove(player).is_some();
        let stored = match &self.storage {
            Some(storage) => storage.delete_player(player)?,
            None => false,
        };

        if !seated && !stored {
            return Ok(NO_COMBAT_REPLY.to_string());
        }
        info!("Combat ended");
        Ok(COMBAT_ENDED_REPLY.to_string())
    }

    /// The player's most recent resolutions, newest first.
    ///
    /// Empty when no storage is attached.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage query fails.
    pub fn history(&self, player: &str, limit: usize) -> Result<Vec<ResolutionRecord>> {
        match &self.storage {
            Some(storage) => storage.recent_resolutions(player, limit),
            None => Ok(Vec::new()),
        }
    }

    /// [`Self::history`] rendered as a reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage query fails.
    pub fn history_reply(&self, player: &str, limit: usize) -> Result<String> {
        let records = self.history(player, limit)?;
        if records.is_empty() {
            return Ok("No hands resolved yet.".to_string());
        }

        let mut reply = String::from("Recent hands:\n");
        for record in &records {
            reply.push_str(&format!(
                "{} {} (value {})\n",
                record.resolved_at.format("%Y-%m-%d %H:%M"),
                record.resolution,
                record.resolution.value
            ));
        }
        Ok(reply)
    }

    /// Make sure the player's state is on the table, loading it from storage
    /// if needed. Returns `false` if the player has no combat anywhere.
    fn ensure_seated(&mut self, player: &str) -> Result<bool> {
        if self.table.get(player).is_some() {
            return Ok(true);
        }
        let Some(storage) = &self.storage else {
            return Ok(false);
        };
        match storage.load_player(player)? {
            Some(state) => {
                debug!(player, "Loaded player state from storage");
                self.table.insert(player, state);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn persist(&self, player: &str) -> Result<()> {
        if let (Some(storage), Some(state)) = (&self.storage, self.table.get(player)) {
            storage.save_player(player, state)?;
        }
        Ok(())
    }
}

/// Render a hand the way players see it.
#[must_use]
pub fn format_hand(hand: &[Card]) -> String {
    if hand.is_empty() {
        return String::from("Your hand is empty!");
    }

    let mut display = String::from("Your hand:\n");
    for (i, card) in hand.iter().enumerate() {
        display.push_str(&format!("{}. {}\n", i + 1, card));
    }
    display
}

/// Parse 1-based, whitespace-separated positions into 0-based indices.
///
/// # Errors
///
/// Returns [`Error::InvalidPositions`] if the list is empty, longer than
/// `max_count`, or has a token that is not a position in a hand of `hand_len`.
pub fn parse_positions(input: &str, max_count: usize, hand_len: usize) -> Result<Vec<usize>> {
    let mut indices = Vec::new();
    for token in input.split_whitespace() {
        let position: usize = token
            .parse()
            .map_err(|_| Error::invalid_positions(format!("'{token}' is not a number")))?;
        if position == 0 || position > hand_len {
            return Err(Error::invalid_positions(format!(
                "position {position} is not in a hand of {hand_len}"
            )));
        }
        indices.push(position - 1);
    }

    if indices.is_empty() {
        return Err(Error::invalid_positions("no positions given"));
    }
    if indices.len() > max_count {
        return Err(Error::invalid_positions(format!(
            "at most {max_count} positions may be given"
        )));
    }
    Ok(indices)
}
