//! Local SQLite key-value storage.
//!
//! Holds the persisted quote collection and category filter as string values
//! under fixed keys, plus a single-row table for sync state.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::{AppError, Result, SyncState};

/// Key holding the JSON array of quotes.
pub const QUOTES_KEY: &str = "quotes";

/// Key holding the selected category filter.
pub const FILTER_KEY: &str = "selectedCategoryFilter";

/// Durable key-value storage using SQLite.
pub struct LocalStorage {
    conn: Connection,
}

impl LocalStorage {
    /// Opens or creates the local storage database.
    ///
    /// # Errors
    /// Returns error if database cannot be opened or schema creation fails.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::io("Failed to create storage directory", e))?;
        }

        let conn = Connection::open(path).map_err(AppError::database)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(AppError::database)?;

        let storage = Self { conn };
        storage.init_schema()?;

        Ok(storage)
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    /// Returns error if schema creation fails.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(AppError::database)?;
        let storage = Self { conn };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Initialize database schema.
    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS sync_state (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                last_sync TEXT,
                last_merged INTEGER NOT NULL DEFAULT 0,
                quote_count INTEGER NOT NULL DEFAULT 0,
                is_syncing INTEGER NOT NULL DEFAULT 0,
                last_error TEXT
            );

            INSERT OR IGNORE INTO sync_state (id) VALUES (1);
            ",
            )
            .map_err(AppError::database)?;

        Ok(())
    }

    /// Read the value stored under `key`.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(AppError::database)
    }

    /// Store `value` under `key`, replacing any prior value.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                r"
            INSERT INTO kv (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')
            ",
                params![key, value],
            )
            .map_err(AppError::database)?;

        Ok(())
    }

    /// Get sync state.
    pub fn get_sync_state(&self) -> Result<SyncState> {
        self.conn
            .query_row(
                r"
            SELECT last_sync, last_merged, quote_count, is_syncing, last_error
            FROM sync_state WHERE id = 1
            ",
                [],
                |row| {
                    let last_sync_str: Option<String> = row.get(0)?;
                    let last_sync = last_sync_str
                        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                        .map(|dt| dt.with_timezone(&Utc));

                    Ok(SyncState {
                        last_sync,
                        last_merged: usize::try_from(row.get::<_, i64>(1)?).unwrap_or_default(),
                        quote_count: usize::try_from(row.get::<_, i64>(2)?).unwrap_or_default(),
                        is_syncing: row.get::<_, i32>(3)? != 0,
                        last_error: row.get(4)?,
                    })
                },
            )
            .map_err(AppError::database)
    }

    /// Update sync state.
    pub fn update_sync_state(&self, state: &SyncState) -> Result<()> {
        self.conn
            .execute(
                r"
            UPDATE sync_state SET
                last_sync = ?1,
                last_merged = ?2,
                quote_count = ?3,
                is_syncing = ?4,
                last_error = ?5
            WHERE id = 1
            ",
                params![
                    state.last_sync.map(|dt| dt.to_rfc3339()),
                    i64::try_from(state.last_merged).unwrap_or(i64::MAX),
                    i64::try_from(state.quote_count).unwrap_or(i64::MAX),
                    i32::from(state.is_syncing),
                    &state.last_error,
                ],
            )
            .map_err(AppError::database)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let storage = LocalStorage::open(&db_path).unwrap();

        let count: i64 = storage
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table'",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(count, 2);
    }

    #[test]
    fn test_set_get_replace() {
        let storage = LocalStorage::open_in_memory().unwrap();

        assert_eq!(storage.get(QUOTES_KEY).unwrap(), None);

        storage.set(QUOTES_KEY, "[]").unwrap();
        storage.set(QUOTES_KEY, "[1]").unwrap();
        assert_eq!(storage.get(QUOTES_KEY).unwrap().as_deref(), Some("[1]"));
        assert_eq!(storage.get(FILTER_KEY).unwrap(), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        LocalStorage::open(&db_path)
            .unwrap()
            .set(FILTER_KEY, "Motivation")
            .unwrap();

        let reopened = LocalStorage::open(&db_path).unwrap();
        assert_eq!(
            reopened.get(FILTER_KEY).unwrap().as_deref(),
            Some("Motivation")
        );
    }

    #[test]
    fn test_sync_state_roundtrip() {
        let storage = LocalStorage::open_in_memory().unwrap();

        assert!(storage.get_sync_state().unwrap().last_sync.is_none());

        let mut state = SyncState::default().with_sync_time().completed();
        state.last_merged = 2;
        state.quote_count = 5;

        storage.update_sync_state(&state).unwrap();
        let loaded = storage.get_sync_state().unwrap();

        assert!(!loaded.is_syncing);
        assert!(loaded.last_sync.is_some());
        assert_eq!(loaded.last_merged, 2);
        assert_eq!(loaded.quote_count, 5);
    }
}
