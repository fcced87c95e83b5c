//! Redis implementation of the entry store.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use async_trait::async_trait;
use parking_lot::RwLock;
use redis::{AsyncCommands, Client, RedisError, Script, aio::ConnectionManager};
use tracing::{debug, info, warn};

use crate::domain::entities::Entry;
use crate::domain::repositories::{EntryStore, MAX_ID_ATTEMPTS, StoreError, StoreResult};
use crate::utils::id_generator::{generate_id, hash_url};

const ID_KEY_PREFIX: &str = "id:";
const HASH_KEY_PREFIX: &str = "hash:";
const ID_KEY_PATTERN: &str = "id:*";
const SCAN_BATCH: usize = 500;

/// Deletes `KEYS[1]`, and `KEYS[2]` only while it still holds `ARGV[1]`.
/// Returns 1 if the hash index was removed.
static DELETE_ENTRY: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
        redis.call('DEL', KEYS[1])
        if redis.call('GET', KEYS[2]) == ARGV[1] then
            return redis.call('DEL', KEYS[2])
        end
        return 0
        ",
    )
});

impl From<RedisError> for StoreError {
    fn from(e: RedisError) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// Entry storage in Redis.
///
/// # Key layout
///
/// - `id:<id>` - hash with fields `url`, `hash`, `id`
/// - `hash:<hash>` - string holding the id
///
/// # Consistency
///
/// Both keys of an entry are written in one `MULTI/EXEC` transaction and
/// deleted by one server-side script, so readers never see half an entry.
/// The dedup lookup that precedes a write is a separate round trip: two
/// concurrent first-time adds of the same URL can both miss it and store two
/// entries. The later write wins the hash index and the earlier id stays
/// reachable by id only; deleting that earlier id leaves the index alone.
pub struct RedisEntryStore {
    connection: RwLock<Option<ConnectionManager>>,
}

impl RedisEntryStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the URL is invalid, the
    /// connection cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str) -> StoreResult<Self> {
        info!("Connecting to Redis entry store");

        let client = Client::open(redis_url).map_err(|e| {
            StoreError::Unavailable(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to connect to Redis: {}", e)))?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| StoreError::Unavailable(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            connection: RwLock::new(Some(manager)),
        })
    }

    /// Deletes every key in the selected database.
    ///
    /// Intended for administration and test cleanup.
    pub async fn flush(&self) -> StoreResult<()> {
        let mut conn = self.connection()?;
        let () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;
        warn!("Flushed Redis database");
        Ok(())
    }

    fn connection(&self) -> StoreResult<ConnectionManager> {
        self.connection.read().clone().ok_or(StoreError::Closed)
    }

    async fn id_for_hash(
        &self,
        conn: &mut ConnectionManager,
        hash: &str,
    ) -> StoreResult<Option<String>> {
        Ok(conn.get(hash_key(hash)).await?)
    }

    async fn load_entry(
        &self,
        conn: &mut ConnectionManager,
        id: &str,
    ) -> StoreResult<Option<Entry>> {
        let key = id_key(id);
        let fields: HashMap<String, String> = conn.hgetall(&key).await?;

        if fields.is_empty() {
            return Ok(None);
        }

        entry_from_fields(&key, fields).map(Some)
    }

    /// Picks an id that is not in use yet.
    async fn fresh_id(&self, conn: &mut ConnectionManager) -> StoreResult<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = generate_id();
            let taken: bool = conn.exists(id_key(&candidate)).await?;

            if !taken {
                return Ok(candidate);
            }
            debug!(id = %candidate, "Short id already taken, retrying");
        }

        Err(StoreError::IdSpaceExhausted(MAX_ID_ATTEMPTS))
    }
}

#[async_trait]
impl EntryStore for RedisEntryStore {
    async fn add_entry(&self, url: &str) -> StoreResult<Entry> {
        let hash = hash_url(url);
        let mut conn = self.connection()?;

        if let Some(id) = self.id_for_hash(&mut conn, &hash).await? {
            match self.load_entry(&mut conn, &id).await? {
                Some(existing) => return Ok(existing),
                None => warn!(id = %id, "Hash index points at a missing entry; recreating"),
            }
        }

        let id = self.fresh_id(&mut conn).await?;
        let entry = Entry::new(id, url.to_string(), hash);

        let () = redis::pipe()
            .atomic()
            .hset_multiple(
                id_key(&entry.id),
                &[
                    ("url", entry.url.as_str()),
                    ("hash", entry.hash.as_str()),
                    ("id", entry.id.as_str()),
                ],
            )
            .ignore()
            .set(hash_key(&entry.hash), &entry.id)
            .ignore()
            .query_async(&mut conn)
            .await?;

        debug!(id = %entry.id, "Stored new entry");
        Ok(entry)
    }

    async fn get_entry(&self, id: &str) -> StoreResult<Option<Entry>> {
        let mut conn = self.connection()?;
        self.load_entry(&mut conn, id).await
    }

    async fn delete_entry(&self, id: &str) -> StoreResult<()> {
        let mut conn = self.connection()?;

        let Some(entry) = self.load_entry(&mut conn, id).await? else {
            return Ok(());
        };

        let mut invocation = DELETE_ENTRY.key(id_key(&entry.id));
        invocation.key(hash_key(&entry.hash)).arg(&entry.id);
        let removed_index: bool = invocation.invoke_async(&mut conn).await?;

        debug!(id, removed_index, "Deleted entry");
        Ok(())
    }

    async fn has_url_hash(&self, hash: &str) -> StoreResult<bool> {
        let mut conn = self.connection()?;
        Ok(conn.exists(hash_key(hash)).await?)
    }

    async fn count_entries(&self) -> StoreResult<usize> {
        let mut conn = self.connection()?;

        // SCAN may return a key more than once, so collect before counting.
        let mut keys: HashSet<String> = HashSet::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(ID_KEY_PATTERN)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            keys.extend(batch);

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(keys.len())
    }

    async fn close(&self) -> StoreResult<()> {
        if self.connection.write().take().is_some() {
            info!("Redis entry store closed");
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn health_check(&self) -> bool {
        match self.connection() {
            Ok(mut conn) => conn.ping::<()>().await.is_ok(),
            Err(_) => false,
        }
    }
}

fn id_key(id: &str) -> String {
    format!("{ID_KEY_PREFIX}{id}")
}

fn hash_key(hash: &str) -> String {
    format!("{HASH_KEY_PREFIX}{hash}")
}

/// Decodes the field set stored under `id:<id>`.
fn entry_from_fields(key: &str, mut fields: HashMap<String, String>) -> StoreResult<Entry> {
    let mut take = |field: &str| {
        fields.remove(field).ok_or_else(|| StoreError::Corrupt {
            key: key.to_string(),
            reason: format!("missing field `{field}`"),
        })
    };

    let id = take("id")?;
    let url = take("url")?;
    let hash = take("hash")?;

    let entry = Entry::new(id, url, hash);
    if !entry.is_consistent() {
        return Err(StoreError::Corrupt {
            key: key.to_string(),
            reason: "stored hash does not match url".to_string(),
        });
    }

    Ok(entry)
}
