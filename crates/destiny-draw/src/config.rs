//! Configuration management for destiny_draw.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::cards::MAX_RANK;
use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "destiny_draw";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "tables.db";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "DESTINY_DRAW_";

/// Most jokers a deck may hold.
pub const MAX_JOKERS: usize = 16;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `DESTINY_DRAW_`, nested keys
///    separated by `__`, e.g. `DESTINY_DRAW_GAME__HAND_SIZE`)
/// 2. TOML config file at `~/.config/destiny_draw/config.toml`
/// 3. Default values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Player id used when none is given on the command line.
    pub player: String,
    /// Deck and hand rules.
    pub game: GameConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
}

/// Deck and hand rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of cards held after a combat starts or a hand is resolved.
    pub hand_size: usize,
    /// Numbered cards per suit (ranks 1 through this value).
    pub ranks_per_suit: u8,
    /// Number of jokers in each deck.
    pub jokers: usize,
    /// Value of a resolution made entirely of jokers.
    pub joker_value: u8,
    /// Fixed RNG seed for reproducible shuffles.
    pub seed: Option<u64>,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/destiny_draw/tables.db`
    pub database_path: Option<PathBuf>,
    /// Resolutions kept per player in the history log.
    /// Set to 0 for unlimited.
    pub history_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            player: "player".to_string(),
            game: GameConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            hand_size: 5,
            ranks_per_suit: 7,
            jokers: 2,
            joker_value: 7,
            seed: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            history_limit: 50,
        }
    }
}

impl GameConfig {
    /// Total number of cards in a deck built from these rules.
    #[must_use]
    pub fn deck_size(&self) -> usize {
        (crate::cards::Element::ALL.len() * usize::from(self.ranks_per_suit))
            .saturating_add(self.jokers)
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.player.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "player must not be empty".to_string(),
            });
        }

        let game = &self.game;
        if game.ranks_per_suit == 0 || game.ranks_per_suit > MAX_RANK {
            return Err(Error::ConfigValidation {
                message: format!(
                    "ranks_per_suit ({}) must be between 1 and {MAX_RANK}",
                    game.ranks_per_suit
                ),
            });
        }

        if game.joker_value == 0 || game.joker_value > MAX_RANK {
            return Err(Error::ConfigValidation {
                message: format!(
                    "joker_value ({}) must be between 1 and {MAX_RANK}",
                    game.joker_value
                ),
            });
        }

        if game.jokers > MAX_JOKERS {
            return Err(Error::ConfigValidation {
                message: format!("jokers ({}) must be at most {MAX_JOKERS}", game.jokers),
            });
        }

        if game.hand_size < 2 {
            return Err(Error::ConfigValidation {
                message: format!("hand_size ({}) must be at least 2", game.hand_size),
            });
        }

        if game.hand_size > game.deck_size() {
            return Err(Error::ConfigValidation {
                message: format!(
                    "hand_size ({}) cannot be greater than the deck size ({})",
                    game.hand_size,
                    game.deck_size()
                ),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the history retention limit, `None` when unlimited.
    #[must_use]
    pub fn history_limit(&self) -> Option<usize> {
        match self.storage.history_limit {
            0 => None,
            n => Some(n),
        }
    }
}
