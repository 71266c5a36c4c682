//! Meditation persistence backed by SQLite.

use crate::record::{MeditationRecord, MetadataCodec, NewMeditation};
use chrono::{DateTime, Utc};
use log::{debug, info};
use meditate_rs_config::DatabaseLocation;
use meditate_rs_protocol::MeditationId;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;

const CREATE_TABLE: &str = "
CREATE TABLE IF NOT EXISTS meditation (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT,
    script TEXT NOT NULL,
    audio_url TEXT NOT NULL,
    duration_seconds INTEGER,
    emotions TEXT,
    goals TEXT,
    outcomes TEXT,
    is_saved INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS meditation_created_at ON meditation (created_at);
";

const SELECT_COLUMNS: &str = "SELECT id, title, script, audio_url, duration_seconds, emotions, \
goals, outcomes, is_saved, created_at, updated_at FROM meditation";

/// Persistent store abstraction for meditation records.
pub trait MeditationStore: Send + Sync {
    /// Persist a new record and return it with its assigned id.
    fn insert(&self, meditation: NewMeditation) -> Result<MeditationRecord, StoreError>;
    /// Load a record by id.
    fn get(&self, id: MeditationId) -> Result<Option<MeditationRecord>, StoreError>;
    /// List the most recent records, newest first.
    fn list_recent(&self, limit: usize) -> Result<Vec<MeditationRecord>, StoreError>;
    /// Set the saved flag; returns the updated record if it exists.
    fn set_saved(
        &self,
        id: MeditationId,
        saved: bool,
    ) -> Result<Option<MeditationRecord>, StoreError>;
    /// Drop and recreate the whole store.
    fn reset(&self) -> Result<(), StoreError>;
}

/// Errors returned by the meditation store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// SQLite-backed store implementation.
pub struct SqliteMeditationStore {
    /// Single connection; SQLite serializes writers anyway.
    conn: Mutex<Connection>,
}

impl SqliteMeditationStore {
    /// Open (and migrate) the database at the given location.
    pub fn open(location: &DatabaseLocation) -> Result<Self, StoreError> {
        let conn = match location {
            DatabaseLocation::Memory => Connection::open_in_memory()?,
            DatabaseLocation::File(path) => {
                if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty())
                {
                    std::fs::create_dir_all(parent)?;
                }
                Connection::open(path)?
            }
        };
        conn.execute_batch(CREATE_TABLE)?;
        info!("initialized meditation store (location={location:?})");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::open(&DatabaseLocation::Memory)
    }
}

impl MeditationStore for SqliteMeditationStore {
    fn insert(&self, meditation: NewMeditation) -> Result<MeditationRecord, StoreError> {
        if meditation.script.trim().is_empty() {
            return Err(StoreError::InvalidRecord("script is empty".to_string()));
        }
        if meditation.audio_url.trim().is_empty() {
            return Err(StoreError::InvalidRecord("audio reference is empty".to_string()));
        }
        let now = Utc::now();
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO meditation (title, script, audio_url, duration_seconds, emotions, goals, \
             outcomes, is_saved, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?8)",
            params![
                meditation.title,
                meditation.script,
                meditation.audio_url,
                meditation.duration_seconds,
                MetadataCodec::encode_optional(meditation.emotions.as_deref()),
                MetadataCodec::encode_optional(meditation.goals.as_deref()),
                MetadataCodec::encode_optional(meditation.outcomes.as_deref()),
                now,
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!(
            "stored meditation (id={}, script_len={})",
            id,
            meditation.script.len()
        );
        Ok(MeditationRecord {
            id,
            title: meditation.title,
            script: meditation.script,
            audio_url: meditation.audio_url,
            duration_seconds: meditation.duration_seconds,
            emotions: meditation.emotions,
            goals: meditation.goals,
            outcomes: meditation.outcomes,
            is_saved: false,
            created_at: now,
            updated_at: now,
        })
    }

    fn get(&self, id: MeditationId) -> Result<Option<MeditationRecord>, StoreError> {
        let conn = self.conn.lock();
        let record = conn
            .query_row(&format!("{SELECT_COLUMNS} WHERE id = ?1"), [id], read_record)
            .optional()?;
        Ok(record)
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<MeditationRecord>, StoreError> {
        let conn = self.conn.lock();
        let mut statement =
            conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id DESC LIMIT ?1"))?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = statement
            .query_map([limit], read_record)?
            .collect::<Result<Vec<_>, _>>()?;
        debug!("listed meditations (returned={})", records.len());
        Ok(records)
    }

    fn set_saved(
        &self,
        id: MeditationId,
        saved: bool,
    ) -> Result<Option<MeditationRecord>, StoreError> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE meditation SET is_saved = ?1, updated_at = ?2 WHERE id = ?3",
            params![saved, Utc::now(), id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        debug!("updated saved flag (id={id}, saved={saved})");
        let record = conn
            .query_row(&format!("{SELECT_COLUMNS} WHERE id = ?1"), [id], read_record)
            .optional()?;
        Ok(record)
    }

    fn reset(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute_batch("DROP TABLE IF EXISTS meditation;")?;
        conn.execute_batch(CREATE_TABLE)?;
        info!("meditation store reset");
        Ok(())
    }
}

fn read_record(row: &Row<'_>) -> rusqlite::Result<MeditationRecord> {
    let metadata = |idx: usize| -> rusqlite::Result<Option<Vec<String>>> {
        let encoded: Option<String> = row.get(idx)?;
        MetadataCodec::decode_optional(encoded.as_deref()).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(err),
            )
        })
    };
    let created_at: DateTime<Utc> = row.get(9)?;
    let updated_at: DateTime<Utc> = row.get(10)?;
    Ok(MeditationRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        script: row.get(2)?,
        audio_url: row.get(3)?,
        duration_seconds: row.get(4)?,
        emotions: metadata(5)?,
        goals: metadata(6)?,
        outcomes: metadata(7)?,
        is_saved: row.get(8)?,
        created_at,
        updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::{MeditationStore, SqliteMeditationStore, StoreError};
    use crate::record::NewMeditation;
    use meditate_rs_config::DatabaseLocation;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn new_meditation(title: &str) -> NewMeditation {
        NewMeditation {
            title: Some(title.to_string()),
            script: "Welcome. Breathe in slowly.".to_string(),
            audio_url: "/static/audio/meditation_00.mp3".to_string(),
            duration_seconds: Some(1),
            emotions: Some(vec!["Calm".to_string(), "a, b".to_string()]),
            goals: Some(vec!["Focus".to_string()]),
            outcomes: Some(Vec::new()),
        }
    }

    #[test]
    fn insert_assigns_increasing_ids_and_round_trips_metadata() {
        let store = SqliteMeditationStore::open_in_memory().expect("store");
        let first = store.insert(new_meditation("first")).expect("insert");
        let second = store.insert(new_meditation("second")).expect("insert");
        assert!(second.id > first.id);
        assert!(!first.is_saved);

        let loaded = store.get(first.id).expect("get").expect("record");
        assert_eq!(
            loaded.emotions,
            Some(vec!["Calm".to_string(), "a, b".to_string()])
        );
        assert_eq!(loaded.outcomes, Some(Vec::new()));
        assert_eq!(loaded.title.as_deref(), Some("first"));
        assert_eq!(loaded.created_at, first.created_at);
    }

    #[test]
    fn get_missing_record_returns_none() {
        let store = SqliteMeditationStore::open_in_memory().expect("store");
        assert_eq!(store.get(42).expect("get"), None);
    }

    #[test]
    fn insert_rejects_partial_records() {
        let store = SqliteMeditationStore::open_in_memory().expect("store");
        let mut meditation = new_meditation("partial");
        meditation.audio_url = String::new();
        let err = store.insert(meditation).expect_err("partial");
        assert!(matches!(err, StoreError::InvalidRecord(_)));
        assert!(store.list_recent(10).expect("list").is_empty());
    }

    #[test]
    fn list_recent_returns_newest_first() {
        let store = SqliteMeditationStore::open_in_memory().expect("store");
        for title in ["a", "b", "c"] {
            store.insert(new_meditation(title)).expect("insert");
        }
        let titles: Vec<_> = store
            .list_recent(2)
            .expect("list")
            .into_iter()
            .filter_map(|record| record.title)
            .collect();
        assert_eq!(titles, vec!["c".to_string(), "b".to_string()]);
    }

    #[test]
    fn set_saved_updates_flag_and_timestamp() {
        let store = SqliteMeditationStore::open_in_memory().expect("store");
        let record = store.insert(new_meditation("keep")).expect("insert");
        let saved = store
            .set_saved(record.id, true)
            .expect("update")
            .expect("record");
        assert!(saved.is_saved);
        assert!(saved.updated_at >= record.updated_at);
        assert_eq!(saved.created_at, record.created_at);
        assert_eq!(store.set_saved(999, true).expect("update"), None);
    }

    #[test]
    fn reset_clears_everything() {
        let temp = tempdir().expect("tempdir");
        let location = DatabaseLocation::File(temp.path().join("db").join("med.db"));
        let store = SqliteMeditationStore::open(&location).expect("store");
        let record = store.insert(new_meditation("gone")).expect("insert");
        store.reset().expect("reset");
        assert_eq!(store.get(record.id).expect("get"), None);
        let fresh = store.insert(new_meditation("fresh")).expect("insert");
        assert_eq!(fresh.id, 1);
    }
}
