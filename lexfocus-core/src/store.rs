//! Persistence boundary for the statistics engine
//!
//! The engine persists all session records as one serialized blob under a
//! single string key, mirroring the key-value storage available on the
//! mobile platforms the timer ships on. [`BlobStore`] is the injected
//! abstraction; [`SqliteStore`] is the durable implementation (a two-column
//! key-value table) and [`MemoryStore`] backs tests and ephemeral use.
//!
//! Reads and writes are whole-blob only: the store never exposes partial
//! updates, so one `get`/`set` pair is the unit of atomicity.

use crate::error::Result;
use crate::types::SessionRecord;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Storage key holding the serialized statistics collection.
pub const STATISTICS_KEY: &str = "statistics_data";

/// Current blob schema version. Bump when the record format changes.
pub const SCHEMA_VERSION: u32 = 1;

/// Key-value storage addressed by string keys, read-whole/write-whole.
pub trait BlobStore: Send + Sync {
    /// Fetch the blob stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the blob stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete the blob stored under `key`. Absent keys are not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// The persisted collection of all session records.
///
/// Grows monotonically; records are only removed by
/// [`SessionRecorder::clear`](crate::recorder::SessionRecorder::clear).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatisticsData {
    pub version: u32,
    pub sessions: Vec<SessionRecord>,
}

impl Default for StatisticsData {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            sessions: Vec::new(),
        }
    }
}

impl StatisticsData {
    /// Load the collection from `store`.
    ///
    /// A missing key yields the empty collection. A blob that fails to parse,
    /// or that was written by a newer schema, is treated identically to "no
    /// data" rather than partially recovered; the condition is logged and the
    /// next successful write replaces it.
    ///
    /// Storage-level read failures propagate to the caller, which decides
    /// whether to fail the operation (recorder) or degrade to an empty
    /// collection (aggregator).
    pub fn load(store: &dyn BlobStore) -> Result<Self> {
        let Some(blob) = store.get(STATISTICS_KEY)? else {
            return Ok(Self::default());
        };

        match serde_json::from_str::<Self>(&blob) {
            Ok(data) if data.version <= SCHEMA_VERSION => Ok(data),
            Ok(data) => {
                tracing::warn!(
                    version = data.version,
                    supported = SCHEMA_VERSION,
                    "statistics blob written by a newer schema; treating as empty"
                );
                Ok(Self::default())
            }
            Err(e) => {
                tracing::warn!(error = %e, "malformed statistics blob; treating as empty");
                Ok(Self::default())
            }
        }
    }

    /// Serialize and persist the whole collection.
    pub fn save(&self, store: &dyn BlobStore) -> Result<()> {
        let blob = serde_json::to_string(self)?;
        store.set(STATISTICS_KEY, &blob)
    }

    /// First record in store order that is open for `phase`, if any.
    ///
    /// At most one record per phase should be open; if a caller bug leaves
    /// several open, the oldest wins.
    pub fn open_record_mut(&mut self, phase: crate::types::Phase) -> Option<&mut SessionRecord> {
        self.sessions
            .iter_mut()
            .find(|s| s.phase == phase && s.is_open())
    }

    /// Count of records currently open for `phase`.
    pub fn open_count(&self, phase: crate::types::Phase) -> usize {
        self.sessions
            .iter()
            .filter(|s| s.phase == phase && s.is_open())
            .count()
    }
}

/// Durable key-value store backed by SQLite (single connection).
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }
}

impl BlobStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
            row.get(0)
        })
        .optional()
        .map_err(Into::into)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// In-memory key-value store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}
