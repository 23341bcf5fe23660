//! Storage layer for destiny_draw.
//!
//! This module provides `SQLite`-based persistence so that a combat survives
//! between invocations of the binary: each player's deck, hand and discard
//! pile, plus a log of resolved hands.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::player::PlayerState;
use crate::resolution::{Resolution, ResolutionKind};

/// Storage engine for combat state.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

/// Summary of a stored player, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSummary {
    /// Player id.
    pub player_id: String,
    /// Cards in hand.
    pub hand: usize,
    /// Cards left in the deck.
    pub deck: usize,
    /// Cards in the discard pile.
    pub discard: usize,
    /// When the current combat started.
    pub started_at: DateTime<Utc>,
    /// When the state last changed.
    pub updated_at: DateTime<Utc>,
}

/// A resolved hand from the history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionRecord {
    /// Row id.
    pub id: i64,
    /// Who resolved it.
    pub player_id: String,
    /// What was resolved.
    pub resolution: Resolution,
    /// When it was resolved.
    pub resolved_at: DateTime<Utc>,
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Players with a stored combat.
    pub players: i64,
    /// Resolutions in the history log.
    pub resolutions: i64,
    /// Most recent state change.
    pub last_activity: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store the state of a freshly started combat, resetting its start time.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database operation fails.
    pub fn begin_combat(&self, player: &str, state: &PlayerState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            r"
            INSERT INTO players (player_id, state, started_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            ON CONFLICT(player_id) DO UPDATE SET
                state = excluded.state,
                started_at = excluded.started_at,
                updated_at = excluded.updated_at
            ",
            params![player, json, now],
        )?;

        debug!(player, "Stored new combat");
        Ok(())
    }

    /// Store the current state of an ongoing combat.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database operation fails.
    pub fn save_player(&self, player: &str, state: &PlayerState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            r"
            INSERT INTO players (player_id, state, started_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            ON CONFLICT(player_id) DO UPDATE SET
                state = excluded.state,
                updated_at = excluded.updated_at
            ",
            params![player, json, now],
        )?;

        debug!(player, "Saved player state");
        Ok(())
    }

    /// Load a player's stored combat, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored state cannot be decoded.
    pub fn load_player(&self, player: &str) -> Result<Option<PlayerState>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT state FROM players WHERE player_id = ?1",
                [player],
                |row| row.get(0),
            )
            .optional()?;

        json.map(|json| {
            serde_json::from_str(&json).map_err(|e| Error::corrupt_record(player, e.to_string()))
        })
        .transpose()
    }

    /// Delete a player's stored combat.
    ///
    /// Returns `true` if a combat was deleted, `false` if none was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_player(&self, player: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM players WHERE player_id = ?1", [player])?;
        Ok(affected > 0)
    }

    /// List every stored player, ordered by id.
    ///
    /// Records that fail to decode are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_players(&self) -> Result<Vec<PlayerSummary>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT player_id, state, started_at, updated_at
            FROM players ORDER BY player_id ASC
            ",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut summaries = Vec::with_capacity(rows.len());
        for (player_id, json, started_at, updated_at) in rows {
            let state: PlayerState = match serde_json::from_str(&json) {
                Ok(state) => state,
                Err(e) => {
                    warn!(player = %player_id, "Skipping unreadable player record: {e}");
                    continue;
                }
            };
            summaries.push(PlayerSummary {
                player_id,
                hand: state.hand.len(),
                deck: state.deck.len(),
                discard: state.discard.len(),
                started_at: parse_timestamp(&started_at),
                updated_at: parse_timestamp(&updated_at),
            });
        }
        Ok(summaries)
    }

    /// Append a resolution to the history log.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn record_resolution(&self, player: &str, resolution: &Resolution) -> Result<i64> {
        self.conn.execute(
            r"
            INSERT INTO resolutions (player_id, kind, value, positions, elements, resolved_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                player,
                resolution.kind.to_string(),
                resolution.value,
                serde_json::to_string(&resolution.positions)?,
                serde_json::to_string(&resolution.elements)?,
                Utc::now().to_rfc3339(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(player, id, "Recorded resolution");
        Ok(id)
    }

    /// The most recent resolutions of a player, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn recent_resolutions(&self, player: &str, limit: usize) -> Result<Vec<ResolutionRecord>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, player_id, kind, value, positions, elements, resolved_at
            FROM resolutions WHERE player_id = ?1
            ORDER BY id DESC LIMIT ?2
            ",
        )?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = stmt
            .query_map(params![player, limit_i64], Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Keep only the `keep` most recent resolutions of a player.
    ///
    /// Returns the number of records deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn prune_resolutions(&self, player: &str, keep: usize) -> Result<usize> {
        let keep_i64 = i64::try_from(keep).unwrap_or(i64::MAX);
        let affected = self.conn.execute(
            r"
            DELETE FROM resolutions WHERE player_id = ?1 AND id NOT IN (
                SELECT id FROM resolutions WHERE player_id = ?1
                ORDER BY id DESC LIMIT ?2
            )
            ",
            params![player, keep_i64],
        )?;

        if affected > 0 {
            info!(player, "Pruned {} resolutions to keep {} recent", affected, keep);
        }
        Ok(affected)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let players: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM players", [], |row| row.get(0))?;
        let resolutions: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM resolutions", [], |row| row.get(0))?;
        let last: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM players ORDER BY updated_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            players,
            resolutions,
            last_activity: last.as_deref().map(parse_timestamp),
            db_size_bytes,
        })
    }

    /// Convert a database row to a history record.
    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<ResolutionRecord> {
        let id: i64 = row.get(0)?;
        let player_id: String = row.get(1)?;
        let kind_str: String = row.get(2)?;
        let value: u8 = row.get(3)?;
        let positions_json: String = row.get(4)?;
        let elements_json: String = row.get(5)?;
        let resolved_at: String = row.get(6)?;

        let kind = kind_str.parse::<ResolutionKind>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, Type::Text, e.into())
        })?;
        let positions = serde_json::from_str(&positions_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
        let elements = serde_json::from_str(&elements_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

        Ok(ResolutionRecord {
            id,
            player_id,
            resolution: Resolution {
                kind,
                value,
                elements,
                positions,
            },
            resolved_at: parse_timestamp(&resolved_at),
        })
    }
}

/// Parse a stored RFC 3339 timestamp, falling back to now for damaged values.
fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(
        |_| {
            warn!("Unparseable timestamp in database: {}", s);
            Utc::now()
        },
        |dt| dt.with_timezone(&Utc),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Element;
    use crate::deck::Deck;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    fn create_test_state() -> PlayerState {
        let mut rng = StdRng::seed_from_u64(5);
        let mut state = PlayerState::new(Deck::standard(), &mut rng);
        state.draw_to_hand(5, &mut rng).unwrap();
        state
    }

    fn pair(value: u8) -> Resolution {
        Resolution {
            kind: ResolutionKind::MatchedEdge,
            value,
            elements: vec![Element::Fire, Element::Ice],
            positions: vec![0, 3],
        }
    }

    #[test]
    fn test_open_in_memory() {
        assert!(Storage::open_in_memory().is_ok());
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tables.db");

        let storage = Storage::open(&path).unwrap();
        assert_eq!(storage.path(), path.as_path());
        assert!(path.exists());
    }

    #[test]
    fn test_save_and_load_player() {
        let storage = create_test_storage();
        let state = create_test_state();

        storage.begin_combat("alice", &state).unwrap();
        let loaded = storage.load_player("alice").unwrap();
        assert_eq!(loaded, Some(state));
    }

    #[test]
    fn test_load_missing_player() {
        let storage = create_test_storage();
        assert!(storage.load_player("nobody").unwrap().is_none());
    }

    #[test]
    fn test_save_overwrites_state() {
        let storage = create_test_storage();
        let mut state = create_test_state();
        storage.begin_combat("alice", &state).unwrap();

        state.discard_from_hand(0).unwrap();
        storage.save_player("alice", &state).unwrap();

        let loaded = storage.load_player("alice").unwrap().unwrap();
        assert_eq!(loaded.hand.len(), 4);
        assert_eq!(loaded.discard.len(), 1);
    }

    #[test]
    fn test_save_preserves_start_time() {
        let storage = create_test_storage();
        let state = create_test_state();
        storage.begin_combat("alice", &state).unwrap();
        let started = storage.list_players().unwrap()[0].started_at;

        storage.save_player("alice", &state).unwrap();
        let summary = &storage.list_players().unwrap()[0];
        assert_eq!(summary.started_at, started);
        assert!(summary.updated_at >= started);
    }

    #[test]
    fn test_corrupt_state() {
        let storage = create_test_storage();
        storage
            .conn
            .execute(
                "INSERT INTO players VALUES ('eve', 'not json', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
                [],
            )
            .unwrap();

        let err = storage.load_player("eve").unwrap_err();
        assert!(matches!(err, Error::CorruptRecord { .. }));

        // Listing skips the damaged record.
        assert!(storage.list_players().unwrap().is_empty());
    }

    #[test]
    fn test_delete_player() {
        let storage = create_test_storage();
        storage.begin_combat("alice", &create_test_state()).unwrap();

        assert!(storage.delete_player("alice").unwrap());
        assert!(!storage.delete_player("alice").unwrap());
        assert!(storage.load_player("alice").unwrap().is_none());
    }

    #[test]
    fn test_list_players() {
        let storage = create_test_storage();
        let state = create_test_state();
        storage.begin_combat("bob", &state).unwrap();
        storage.begin_combat("alice", &state).unwrap();

        let players = storage.list_players().unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].player_id, "alice");
        assert_eq!(players[0].hand, 5);
        assert_eq!(players[0].deck, 25);
        assert_eq!(players[0].discard, 0);
    }

    #[test]
    fn test_record_and_read_history() {
        let storage = create_test_storage();
        storage.record_resolution("alice", &pair(2)).unwrap();
        storage.record_resolution("alice", &pair(5)).unwrap();
        storage.record_resolution("bob", &pair(1)).unwrap();

        let history = storage.recent_resolutions("alice", 10).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].resolution.value, 5);
        assert_eq!(history[1].resolution, pair(2));
        assert!(history.iter().all(|r| r.player_id == "alice"));
    }

    #[test]
    fn test_history_limit() {
        let storage = create_test_storage();
        for v in 1..=5 {
            storage.record_resolution("alice", &pair(v)).unwrap();
        }

        let history = storage.recent_resolutions("alice", 2).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].resolution.value, 5);
    }

    #[test]
    fn test_prune_resolutions() {
        let storage = create_test_storage();
        for v in 1..=5 {
            storage.record_resolution("alice", &pair(v)).unwrap();
        }
        storage.record_resolution("bob", &pair(1)).unwrap();

        let deleted = storage.prune_resolutions("alice", 3).unwrap();
        assert_eq!(deleted, 2);

        let history = storage.recent_resolutions("alice", 10).unwrap();
        let values: Vec<u8> = history.iter().map(|r| r.resolution.value).collect();
        assert_eq!(values, vec![5, 4, 3]);
        assert_eq!(storage.recent_resolutions("bob", 10).unwrap().len(), 1);
    }

    #[test]
    fn test_stats() {
        let storage = create_test_storage();
        let stats = storage.stats().unwrap();
        assert_eq!(stats.players, 0);
        assert_eq!(stats.resolutions, 0);
        assert!(stats.last_activity.is_none());
        assert_eq!(stats.db_size_bytes, 0);

        storage.begin_combat("alice", &create_test_state()).unwrap();
        storage.record_resolution("alice", &pair(3)).unwrap();

        let stats = storage.stats().unwrap();
        assert_eq!(stats.players, 1);
        assert_eq!(stats.resolutions, 1);
        assert!(stats.last_activity.is_some());
    }
}
