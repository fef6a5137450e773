//! Reconciler for the server-side flat collection.
//!
//! Owns the in-memory collection together with its durable store. Every
//! operation runs as one critical section: acquire the lock, mutate the
//! collection, persist it, release. Concurrent `Changed` merges therefore
//! cannot lose each other's updates.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, warn};

use crate::services::durable_store::DurableStore;
use crate::types::bookmark::BookmarkRecord;
use crate::types::errors::SyncError;
use crate::types::sync::{ApplyOutcome, SyncAction};

struct Collection<S> {
    records: Vec<BookmarkRecord>,
    store: S,
}

impl<S: DurableStore> Collection<S> {
    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    /// On failure the in-memory state keeps the mutation; the next
    /// successful save closes the gap.
    fn persist(&mut self) -> Result<(), SyncError> {
        self.store.save(&self.records).map_err(|e| {
            error!("Failed to persist {} bookmark records: {}", self.records.len(), e);
            SyncError::Persistence(e)
        })
    }
}

/// Applies sync actions and bulk imports to the flat collection.
pub struct Reconciler<S: DurableStore> {
    inner: Mutex<Collection<S>>,
}

impl<S: DurableStore> Reconciler<S> {
    /// Loads the collection from `store`. Called once at process start.
    pub fn open(store: S) -> Result<Self, SyncError> {
        let records = store.load()?;
        debug!("Loaded {} bookmark records", records.len());
        Ok(Self {
            inner: Mutex::new(Collection { records, store }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Collection<S>> {
        // A poisoned lock still guards a well-formed collection.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies one action and persists the result.
    ///
    /// - `Created` appends, or replaces in place when the id already exists.
    /// - `Removed` drops the matching record; an unknown id is a no-op.
    /// - `Changed` shallow-merges fields into the matching record; an unknown
    ///   id is a no-op.
    ///
    /// The collection is persisted after every action, no-ops included.
    pub fn apply(&self, action: SyncAction) -> Result<ApplyOutcome, SyncError> {
        let mut collection = self.lock();

        let outcome = match action {
            SyncAction::Created(record) => match collection.position(&record.id) {
                Some(index) => {
                    debug!("Created for existing id {}, replacing", record.id);
                    collection.records[index] = record;
                    ApplyOutcome::Replaced
                }
                None => {
                    collection.records.push(record);
                    ApplyOutcome::Appended
                }
            },
            SyncAction::Removed(id) => {
                let before = collection.records.len();
                collection.records.retain(|r| r.id != id);
                if collection.records.len() < before {
                    ApplyOutcome::Removed
                } else {
                    warn!("Removed for unknown id {}, ignoring", id);
                    ApplyOutcome::Ignored
                }
            }
            SyncAction::Changed(id, fields) => match collection.position(&id) {
                Some(index) => {
                    collection.records[index].merge(&fields);
                    ApplyOutcome::Merged
                }
                None => {
                    warn!("Changed for unknown id {}, dropping update", id);
                    ApplyOutcome::Ignored
                }
            },
        };

        collection.persist()?;
        Ok(outcome)
    }

    /// Replaces the whole collection with `records`, verbatim, and persists it.
    pub fn replace_all(&self, records: Vec<BookmarkRecord>) -> Result<(), SyncError> {
        let mut collection = self.lock();
        debug!(
            "Replacing {} bookmark records with {}",
            collection.records.len(),
            records.len()
        );
        collection.records = records;
        collection.persist()
    }

    /// Snapshot of the current in-memory collection.
    pub fn records(&self) -> Vec<BookmarkRecord> {
        self.lock().records.clone()
    }

    pub fn get(&self, id: &str) -> Option<BookmarkRecord> {
        self.lock().records.iter().find(|r| r.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs `f` against the store while holding the collection lock.
    pub fn inspect_store<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.lock().store)
    }
}
