//! `SQLite` schema definitions for destiny_draw.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the players table.
///
/// `state` holds the JSON-encoded deck, hand and discard pile.
pub const CREATE_PLAYERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS players (
    player_id TEXT PRIMARY KEY,
    state TEXT NOT NULL,
    started_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// SQL statement to create the resolution history table.
pub const CREATE_RESOLUTIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS resolutions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    player_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    value INTEGER NOT NULL,
    positions TEXT NOT NULL,
    elements TEXT NOT NULL,
    resolved_at TEXT NOT NULL
)
";

/// SQL statement to create an index for per-player history lookups.
pub const CREATE_RESOLUTIONS_PLAYER_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_resolutions_player ON resolutions(player_id, id DESC)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_PLAYERS_TABLE,
    CREATE_RESOLUTIONS_TABLE,
    CREATE_RESOLUTIONS_PLAYER_INDEX,
    CREATE_METADATA_TABLE,
];
