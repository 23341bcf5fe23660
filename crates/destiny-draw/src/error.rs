//! Error types for destiny_draw.
//!
//! This module defines all error types used throughout the crate, separating
//! mistakes a player can make (bad positions, unknown hand numbers) from
//! failures of the storage and configuration layers.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for destiny_draw operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A stored record could not be decoded.
    #[error("corrupt record for player '{player}': {message}")]
    CorruptRecord {
        /// Player the record belongs to.
        player: String,
        /// Description of the problem.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Game Errors ===
    /// The player has no combat in progress.
    #[error("player '{player}' has not started a combat")]
    NoCombat {
        /// The player that was looked up.
        player: String,
    },

    /// Both the deck and the discard pile are empty.
    #[error("no cards left in deck or discard")]
    CardsExhausted,

    /// A hand position does not exist.
    #[error("card index {index} out of bounds for a hand of {len}")]
    CardIndexOutOfBounds {
        /// The requested 0-based index.
        index: usize,
        /// Current hand size.
        len: usize,
    },

    /// Mulligan positions could not be accepted.
    #[error("invalid card positions: {message}")]
    InvalidPositions {
        /// Why the positions were rejected.
        message: String,
    },

    /// The requested resolution number is not on offer.
    #[error("invalid hand number {number} ({available} available)")]
    InvalidResolution {
        /// The requested 1-based number.
        number: usize,
        /// How many resolutions exist.
        available: usize,
    },

    /// A console line could not be understood.
    #[error("{message}")]
    InvalidCommand {
        /// What was wrong with the line.
        message: String,
    },

    // === Runtime Errors ===
    /// A blocking task was cancelled or panicked.
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for destiny_draw operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a no-combat error for the given player.
    #[must_use]
    pub fn no_combat(player: impl Into<String>) -> Self {
        Self::NoCombat {
            player: player.into(),
        }
    }

    /// Create an invalid positions error.
    #[must_use]
    pub fn invalid_positions(message: impl Into<String>) -> Self {
        Self::InvalidPositions {
            message: message.into(),
        }
    }

    /// Create an invalid console command error.
    #[must_use]
    pub fn invalid_command(message: impl Into<String>) -> Self {
        Self::InvalidCommand {
            message: message.into(),
        }
    }

    /// Create a corrupt record error.
    #[must_use]
    pub fn corrupt_record(player: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CorruptRecord {
            player: player.into(),
            message: message.into(),
        }
    }

    /// Check if this error was caused by player input rather than the system.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::NoCombat { .. }
                | Self::CardIndexOutOfBounds { .. }
                | Self::InvalidPositions { .. }
                | Self::InvalidResolution { .. }
                | Self::InvalidCommand { .. }
        )
    }
}
