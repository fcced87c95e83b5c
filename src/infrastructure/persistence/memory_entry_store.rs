//! In-process entry storage.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::domain::entities::Entry;
use crate::domain::repositories::{EntryStore, MAX_ID_ATTEMPTS, StoreError, StoreResult};
use crate::utils::id_generator::{generate_id, hash_url};

#[derive(Default)]
struct Indexes {
    /// id -> entry
    entries: HashMap<String, Entry>,
    /// hash -> id
    ids: HashMap<String, String>,
    closed: bool,
}

impl Indexes {
    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

/// Entry storage backed by two maps behind a single mutex.
///
/// Every operation holds the lock for its whole duration, so the dedup
/// check-then-insert in [`EntryStore::add_entry`] is atomic with respect to
/// concurrent adds and deletes. Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryEntryStore {
    inner: Mutex<Indexes>,
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        debug!("Using in-memory entry store");
        Self::default()
    }
}

#[async_trait]
impl EntryStore for MemoryEntryStore {
    async fn add_entry(&self, url: &str) -> StoreResult<Entry> {
        let hash = hash_url(url);
        let mut guard = self.inner.lock();
        guard.ensure_open()?;

        if let Some(existing) = guard.ids.get(&hash).and_then(|id| guard.entries.get(id)) {
            return Ok(existing.clone());
        }

        let id = (0..MAX_ID_ATTEMPTS)
            .map(|_| generate_id())
            .find(|candidate| !guard.entries.contains_key(candidate))
            .ok_or(StoreError::IdSpaceExhausted(MAX_ID_ATTEMPTS))?;

        let entry = Entry::new(id, url.to_string(), hash);
        guard.ids.insert(entry.hash.clone(), entry.id.clone());
        guard.entries.insert(entry.id.clone(), entry.clone());

        debug!(id = %entry.id, "Stored new entry");
        Ok(entry)
    }

    async fn get_entry(&self, id: &str) -> StoreResult<Option<Entry>> {
        let guard = self.inner.lock();
        guard.ensure_open()?;
        Ok(guard.entries.get(id).cloned())
    }

    async fn delete_entry(&self, id: &str) -> StoreResult<()> {
        let mut guard = self.inner.lock();
        guard.ensure_open()?;

        if let Some(entry) = guard.entries.remove(id) {
            guard.ids.remove(&entry.hash);
            debug!(id, "Deleted entry");
        }
        Ok(())
    }

    async fn has_url_hash(&self, hash: &str) -> StoreResult<bool> {
        let guard = self.inner.lock();
        guard.ensure_open()?;
        Ok(guard.ids.contains_key(hash))
    }

    async fn count_entries(&self) -> StoreResult<usize> {
        let guard = self.inner.lock();
        guard.ensure_open()?;
        Ok(guard.entries.len())
    }

    async fn close(&self) -> StoreResult<()> {
        let mut guard = self.inner.lock();
        guard.entries.clear();
        guard.ids.clear();
        guard.closed = true;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "in_mem"
    }

    async fn health_check(&self) -> bool {
        !self.inner.lock().closed
    }
}
