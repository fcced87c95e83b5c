//! Entry entity: a short id bound to a URL and its content hash.

use serde::{Deserialize, Serialize};

use crate::utils::id_generator::hash_url;

/// A stored short-id/URL/hash tuple.
///
/// Entries are immutable once created; the only lifecycle transition after
/// creation is deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Randomly generated short identifier.
    pub id: String,
    /// Normalized absolute URL.
    pub url: String,
    /// SHA-256 hex digest of `url`, the deduplication key.
    pub hash: String,
}

impl Entry {
    /// Creates an entry from its parts.
    pub fn new(id: String, url: String, hash: String) -> Self {
        Self { id, url, hash }
    }

    /// Returns true if `hash` matches the digest of `url`.
    pub fn is_consistent(&self) -> bool {
        hash_url(&self.url) == self.hash
    }
}

/// Notification published to watchers when an entry is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryNotification {
    pub id: String,
    pub url: String,
}

impl From<&Entry> for EntryNotification {
    fn from(entry: &Entry) -> Self {
        Self {
            id: entry.id.clone(),
            url: entry.url.clone(),
        }
    }
}
