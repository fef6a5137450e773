//! Durable stores for the server-side flat collection.
//!
//! A store only knows how to load the whole collection once at startup and
//! save the whole collection after every mutation. Ordering is preserved;
//! nothing else about the records is interpreted here.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::params;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::database::Database;
use crate::types::bookmark::BookmarkRecord;
use crate::types::errors::StoreError;
use crate::types::settings::StoreBackend;

/// Trait defining the durable store collaborator.
pub trait DurableStore: Send {
    /// Returns the persisted collection, or an empty one if nothing was saved yet.
    fn load(&self) -> Result<Vec<BookmarkRecord>, StoreError>;
    /// Persists the entire collection, replacing the previous state.
    fn save(&mut self, records: &[BookmarkRecord]) -> Result<(), StoreError>;
}

impl DurableStore for Box<dyn DurableStore> {
    fn load(&self) -> Result<Vec<BookmarkRecord>, StoreError> {
        (**self).load()
    }

    fn save(&mut self, records: &[BookmarkRecord]) -> Result<(), StoreError> {
        (**self).save(records)
    }
}

/// Opens the store selected by `backend` at `path`.
pub fn open_store(backend: StoreBackend, path: &Path) -> Result<Box<dyn DurableStore>, StoreError> {
    match backend {
        StoreBackend::Json => Ok(Box::new(JsonFileStore::new(path))),
        StoreBackend::Sqlite => Ok(Box::new(SqliteStore::open(path)?)),
    }
}

/// On-disk document layout: `{"bookmarks": [...]}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    bookmarks: Vec<BookmarkRecord>,
}

/// Store that keeps the collection as one JSON document on disk.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "db.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl DurableStore for JsonFileStore {
    fn load(&self) -> Result<Vec<BookmarkRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| StoreError::Io(format!("Failed to read {}: {}", self.path.display(), e)))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let document: StoreDocument = serde_json::from_str(&content).map_err(|e| {
            StoreError::Serialization(format!("Failed to parse {}: {}", self.path.display(), e))
        })?;
        Ok(document.bookmarks)
    }

    /// Writes a sibling temp file, then renames it over the store so a crash
    /// mid-write leaves the previous document intact.
    fn save(&mut self, records: &[BookmarkRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Io(format!("Failed to create store directory: {}", e))
                })?;
            }
        }

        let document = StoreDocument {
            bookmarks: records.to_vec(),
        };
        let json = serde_json::to_string_pretty(&document)
            .map_err(|e| StoreError::Serialization(format!("Failed to serialize store: {}", e)))?;

        let temp = self.temp_path();
        fs::write(&temp, json)
            .map_err(|e| StoreError::Io(format!("Failed to write {}: {}", temp.display(), e)))?;
        fs::rename(&temp, &self.path).map_err(|e| {
            StoreError::Io(format!("Failed to replace {}: {}", self.path.display(), e))
        })?;
        Ok(())
    }
}

/// Store backed by the `bookmark_records` table.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Opens (or creates) the database file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Io(format!("Failed to create store directory: {}", e))
                })?;
            }
        }
        Ok(Self::new(Database::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<(String, String)> {
        Ok((row.get(0)?, row.get(1)?))
    }
}

impl DurableStore for SqliteStore {
    fn load(&self) -> Result<Vec<BookmarkRecord>, StoreError> {
        let mut stmt = self
            .db
            .connection()
            .prepare("SELECT id, fields FROM bookmark_records ORDER BY position")?;
        let rows = stmt.query_map([], Self::row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            let (id, fields) = row?;
            let fields: Map<String, Value> = serde_json::from_str(&fields).map_err(|e| {
                StoreError::Serialization(format!("Corrupt fields for {}: {}", id, e))
            })?;
            records.push(BookmarkRecord { id, fields });
        }
        Ok(records)
    }

    /// Rewrites the table inside one transaction.
    fn save(&mut self, records: &[BookmarkRecord]) -> Result<(), StoreError> {
        let tx = self.db.connection_mut().transaction()?;
        tx.execute("DELETE FROM bookmark_records", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO bookmark_records (position, id, fields) VALUES (?1, ?2, ?3)",
            )?;
            for (position, record) in records.iter().enumerate() {
                let fields = serde_json::to_string(&record.fields)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                stmt.execute(params![position as i64, record.id, fields])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

/// In-memory store. `fail_saves` makes every `save` fail, leaving the last
/// saved state untouched.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    saved: Vec<BookmarkRecord>,
    save_count: usize,
    fail_saves: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose `load` returns `records`.
    pub fn with_records(records: Vec<BookmarkRecord>) -> Self {
        Self {
            saved: records,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn saved(&self) -> &[BookmarkRecord] {
        &self.saved
    }

    pub fn save_count(&self) -> usize {
        self.save_count
    }
}

impl DurableStore for MemoryStore {
    fn load(&self) -> Result<Vec<BookmarkRecord>, StoreError> {
        Ok(self.saved.clone())
    }

    fn save(&mut self, records: &[BookmarkRecord]) -> Result<(), StoreError> {
        if self.fail_saves {
            return Err(StoreError::Io("simulated write failure".to_string()));
        }
        self.saved = records.to_vec();
        self.save_count += 1;
        Ok(())
    }
}
