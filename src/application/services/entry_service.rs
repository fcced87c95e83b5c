//! Entry creation, lookup and deletion service.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::domain::broadcast::BroadcastHub;
use crate::domain::entities::Entry;
use crate::domain::repositories::EntryStore;
use crate::error::AppError;
use crate::utils::id_generator::hash_url;
use crate::utils::short_id::validate_short_id;
use crate::utils::url_normalizer::normalize_url;

/// Service for storing URLs and announcing them to watchers.
///
/// Holds the store selected at startup behind a trait object, so the same
/// service runs on top of either backend.
pub struct EntryService {
    store: Arc<dyn EntryStore>,
    hub: Arc<BroadcastHub>,
}

impl EntryService {
    pub fn new(store: Arc<dyn EntryStore>, hub: Arc<BroadcastHub>) -> Self {
        Self { store, hub }
    }

    /// Normalizes and stores a URL, then publishes the resulting entry.
    ///
    /// Storing the same normalized URL twice returns the original entry.
    /// Both outcomes are published.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is invalid, and the
    /// mapped storage error otherwise.
    pub async fn create_entry(&self, raw_url: &str) -> Result<Entry, AppError> {
        let url = normalize_url(raw_url)?;
        let entry = self.store.add_entry(&url).await?;

        if !self.hub.publish(&entry) {
            debug!(id = %entry.id, "Entry stored but not broadcast");
        }

        Ok(entry)
    }

    /// Retrieves an entry by its short id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a malformed id and
    /// [`AppError::NotFound`] if no entry has it.
    pub async fn get_entry(&self, id: &str) -> Result<Entry, AppError> {
        validate_short_id(id)?;

        self.store
            .get_entry(id)
            .await?
            .ok_or_else(|| AppError::not_found("Entry not found", json!({ "id": id })))
    }

    /// Deletes an entry. Deleting an unknown id succeeds.
    pub async fn delete_entry(&self, id: &str) -> Result<(), AppError> {
        validate_short_id(id)?;
        self.store.delete_entry(id).await?;
        Ok(())
    }

    /// Whether a URL (after normalization) is already stored.
    pub async fn contains_url(&self, raw_url: &str) -> Result<bool, AppError> {
        let url = normalize_url(raw_url)?;
        Ok(self.store.has_url_hash(&hash_url(&url)).await?)
    }

    pub async fn count_entries(&self) -> Result<usize, AppError> {
        Ok(self.store.count_entries().await?)
    }

    /// Name of the active storage backend.
    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    pub async fn storage_reachable(&self) -> bool {
        self.store.health_check().await
    }

    /// Releases the storage backend.
    pub async fn close(&self) -> Result<(), AppError> {
        self.store.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::EntryNotification;
    use crate::domain::repositories::{MockEntryStore, StoreError};
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    fn create_test_entry(id: &str, url: &str) -> Entry {
        Entry::new(id.to_string(), url.to_string(), hash_url(url))
    }

    /// Builds a service whose published notifications land in the returned
    /// receiver.
    fn service_with(
        store: MockEntryStore,
    ) -> (EntryService, Arc<BroadcastHub>, mpsc::Receiver<EntryNotification>) {
        let hub = Arc::new(BroadcastHub::new(8, 4));
        let (tx, rx) = mpsc::channel(8);
        hub.subscribe(tx);
        (EntryService::new(Arc::new(store), hub.clone()), hub, rx)
    }

    async fn next_published(rx: &mut mpsc::Receiver<EntryNotification>) -> EntryNotification {
        timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap()
    }

    /// Publishes a marker and checks it is the first thing watchers see.
    async fn assert_nothing_published(
        hub: &BroadcastHub,
        rx: &mut mpsc::Receiver<EntryNotification>,
    ) {
        hub.publish(&create_test_entry("marker", "https://marker.example.com"));
        assert_eq!(next_published(rx).await.id, "marker");
    }

    #[tokio::test]
    async fn test_create_entry_success() {
        let mut mock_store = MockEntryStore::new();

        let created = create_test_entry("abc123", "https://example.com");
        mock_store
            .expect_add_entry()
            .withf(|url| url == "https://example.com")
            .times(1)
            .returning(move |_| Ok(created.clone()));

        let (service, _hub, mut rx) = service_with(mock_store);

        let entry = service.create_entry("https://example.com").await.unwrap();
        assert_eq!(entry.id, "abc123");

        let notification = next_published(&mut rx).await;
        assert_eq!(notification.id, "abc123");
        assert_eq!(notification.url, "https://example.com");
    }

    #[tokio::test]
    async fn test_create_entry_normalizes_url() {
        let mut mock_store = MockEntryStore::new();

        let created = create_test_entry("abc123", "https://example.com/path");
        mock_store
            .expect_add_entry()
            .withf(|url| url == "https://example.com/path")
            .times(1)
            .returning(move |_| Ok(created.clone()));

        let (service, _hub, _rx) = service_with(mock_store);

        let result = service.create_entry("  example.com/path  ").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_entry_publishes_dedup_hit() {
        let mut mock_store = MockEntryStore::new();

        let existing = create_test_entry("exist1", "https://example.com");
        mock_store
            .expect_add_entry()
            .times(2)
            .returning(move |_| Ok(existing.clone()));

        let (service, _hub, mut rx) = service_with(mock_store);

        service.create_entry("https://example.com").await.unwrap();
        service.create_entry("https://example.com").await.unwrap();

        assert_eq!(next_published(&mut rx).await.id, "exist1");
        assert_eq!(next_published(&mut rx).await.id, "exist1");
    }

    #[tokio::test]
    async fn test_create_entry_invalid_url() {
        let mut mock_store = MockEntryStore::new();
        mock_store.expect_add_entry().times(0);

        let (service, hub, mut rx) = service_with(mock_store);

        let result = service.create_entry("ftp://example.com").await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
        assert_nothing_published(&hub, &mut rx).await;
    }

    #[tokio::test]
    async fn test_create_entry_backend_down() {
        let mut mock_store = MockEntryStore::new();
        mock_store
            .expect_add_entry()
            .times(1)
            .returning(|_| Err(StoreError::Unavailable("connection refused".to_string())));

        let (service, hub, mut rx) = service_with(mock_store);

        let result = service.create_entry("https://example.com").await;

        assert!(matches!(result.unwrap_err(), AppError::Unavailable { .. }));
        assert_nothing_published(&hub, &mut rx).await;
    }

    #[tokio::test]
    async fn test_get_entry_found() {
        let mut mock_store = MockEntryStore::new();

        let existing = create_test_entry("abc123", "https://example.com");
        mock_store
            .expect_get_entry()
            .withf(|id| id == "abc123")
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));

        let (service, _hub, _rx) = service_with(mock_store);

        let entry = service.get_entry("abc123").await.unwrap();
        assert_eq!(entry.url, "https://example.com");
    }

    #[tokio::test]
    async fn test_get_entry_not_found() {
        let mut mock_store = MockEntryStore::new();
        mock_store
            .expect_get_entry()
            .times(1)
            .returning(|_| Ok(None));

        let (service, _hub, _rx) = service_with(mock_store);

        let result = service.get_entry("zzz999").await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_entry_malformed_id() {
        let mut mock_store = MockEntryStore::new();
        mock_store.expect_get_entry().times(0);

        let (service, _hub, _rx) = service_with(mock_store);

        let result = service.get_entry("bad-id!").await;
        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_delete_entry() {
        let mut mock_store = MockEntryStore::new();
        mock_store
            .expect_delete_entry()
            .withf(|id| id == "abc123")
            .times(1)
            .returning(|_| Ok(()));

        let (service, _hub, _rx) = service_with(mock_store);

        assert!(service.delete_entry("abc123").await.is_ok());
    }

    #[tokio::test]
    async fn test_contains_url_hashes_normalized_form() {
        let mut mock_store = MockEntryStore::new();

        let expected = hash_url("https://example.com");
        mock_store
            .expect_has_url_hash()
            .withf(move |hash| *hash == expected)
            .times(1)
            .returning(|_| Ok(true));

        let (service, _hub, _rx) = service_with(mock_store);

        assert!(service.contains_url("example.com").await.unwrap());
    }
}
