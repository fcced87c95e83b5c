//! Storage contract shared by every backend.

use crate::domain::entities::Entry;
use async_trait::async_trait;

/// Errors surfaced by storage backends.
///
/// A missing entry is never an error: lookups return `Ok(None)` and deletes of
/// unknown ids succeed.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or rejected the command.
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    /// The store was closed and can no longer be used.
    #[error("storage backend is closed")]
    Closed,

    /// Stored data could not be decoded into an [`Entry`].
    #[error("corrupt entry under key {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// No unused short id was found within the retry budget.
    #[error("no free short id after {0} attempts")]
    IdSpaceExhausted(usize),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Number of fresh ids a backend tries before giving up on a create.
pub const MAX_ID_ATTEMPTS: usize = 10;

/// Content-addressed storage for short links.
///
/// Every backend keeps two indexes, `id -> Entry` and `hash -> id`, and must
/// behave identically from the outside:
///
/// - **Dedup**: at most one entry exists per URL hash; re-adding a URL returns
///   the stored entry unchanged
/// - **Not-found is not an error**: `get_entry` returns `None`, `delete_entry`
///   is a no-op
/// - **Delete completeness**: deleting an id removes both index entries
///
/// URLs are expected to be normalized by the caller
/// (see [`crate::utils::url_normalizer`]).
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryEntryStore`] - mutex-guarded maps
/// - [`crate::infrastructure::persistence::RedisEntryStore`] - Redis hashes and strings
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Stores `url`, or returns the existing entry with the same content hash.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on backend failures,
    /// [`StoreError::IdSpaceExhausted`] if no free id was found.
    async fn add_entry(&self, url: &str) -> StoreResult<Entry>;

    /// Looks up an entry by short id.
    async fn get_entry(&self, id: &str) -> StoreResult<Option<Entry>>;

    /// Removes an entry and its hash index. Unknown ids are ignored.
    async fn delete_entry(&self, id: &str) -> StoreResult<()>;

    /// Returns true if an entry with this content hash exists.
    async fn has_url_hash(&self, hash: &str) -> StoreResult<bool>;

    /// Counts live entries.
    async fn count_entries(&self) -> StoreResult<usize>;

    /// Releases backend resources. Later calls return [`StoreError::Closed`].
    async fn close(&self) -> StoreResult<()>;

    /// Short backend name used in logs and health checks.
    fn backend(&self) -> &'static str;

    /// Checks if the backend is reachable.
    async fn health_check(&self) -> bool;
}
