#![allow(dead_code)]

use rand::Rng;
use rand::distr::Alphanumeric;
use std::sync::Arc;
use url_watch::domain::broadcast::BroadcastHub;
use url_watch::domain::repositories::EntryStore;
use url_watch::infrastructure::persistence::{MemoryEntryStore, RedisEntryStore};
use url_watch::state::AppState;

/// Database used by the Redis-backed tests. Flushed before every case.
pub const TEST_REDIS_URL: &str = "redis://127.0.0.1:6379/15";

/// A unique, valid URL for tests that must not collide with each other.
pub fn random_url() -> String {
    let path: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();

    format!("https://example.com/{}", path)
}

pub fn memory_store() -> Arc<dyn EntryStore> {
    Arc::new(MemoryEntryStore::new())
}

/// `TEST_REDIS_URL` from the environment, or the default test database.
pub fn test_redis_url() -> String {
    std::env::var("TEST_REDIS_URL").unwrap_or_else(|_| TEST_REDIS_URL.to_string())
}

/// Connects to the test Redis database and empties it.
pub async fn redis_store() -> Arc<dyn EntryStore> {
    let store = RedisEntryStore::connect(&test_redis_url()).await.unwrap();
    store.flush().await.unwrap();
    Arc::new(store)
}

pub fn create_test_state() -> AppState {
    AppState::new(memory_store(), Arc::new(BroadcastHub::new(16, 8)))
}

pub fn create_test_state_with(store: Arc<dyn EntryStore>) -> AppState {
    AppState::new(store, Arc::new(BroadcastHub::new(16, 8)))
}
