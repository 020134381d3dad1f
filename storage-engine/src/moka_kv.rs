use async_trait::async_trait;
use files_core::ports::{KeyValueDriver, KeyValueHandle};
use moka::Expiry;
use moka::future::Cache;
use shared::{Error, Result, StoredValue, TtlSecs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Clone, Debug)]
struct Entry {
    value: String,
    ttl: Duration,
}

/// Per-entry expiry: every insert (or overwrite) restarts the entry's own TTL
struct EntryTtl;

impl Expiry<String, Entry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

struct Inner {
    cache: Cache<String, Entry>,
    reachable: AtomicBool,
    open: AtomicBool,
}

/// Moka-backed key-value store living in process
/// Acts as both the driver and the connection handle; clones share state
#[derive(Clone)]
pub struct MemoryKeyValueStore {
    inner: Arc<Inner>,
}

impl Default for MemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::with_reachability(true)
    }

    /// A store whose `connect` always fails
    pub fn unreachable() -> Self {
        Self::with_reachability(false)
    }

    fn with_reachability(reachable: bool) -> Self {
        let cache = Cache::builder()
            .name("memory-kv")
            .expire_after(EntryTtl)
            .build();

        Self {
            inner: Arc::new(Inner {
                cache,
                reachable: AtomicBool::new(reachable),
                open: AtomicBool::new(false),
            }),
        }
    }

    /// Simulate the transport dropping underneath an established connection
    pub fn close(&self) {
        self.inner.open.store(false, Ordering::Release);
    }

    pub fn reopen(&self) {
        self.inner.open.store(true, Ordering::Release);
    }

    fn ensure_open(&self) -> Result<()> {
        if self.inner.open.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(Error::Transport("connection closed".to_string()))
        }
    }
}

#[async_trait]
impl KeyValueDriver for MemoryKeyValueStore {
    async fn connect(&self) -> Result<Arc<dyn KeyValueHandle>> {
        if !self.inner.reachable.load(Ordering::Acquire) {
            return Err(Error::Connection("in-memory store is unreachable".to_string()));
        }
        self.reopen();
        Ok(Arc::new(self.clone()))
    }
}

#[async_trait]
impl KeyValueHandle for MemoryKeyValueStore {
    fn is_open(&self) -> bool {
        self.inner.open.load(Ordering::Acquire)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.ensure_open()?;
        // Expired entries are never returned, even before moka evicts them
        Ok(self.inner.cache.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: StoredValue, ttl: TtlSecs) -> Result<()> {
        self.ensure_open()?;
        if ttl.0 == 0 {
            return Err(Error::Transport(
                "invalid expire time in 'set' command".to_string(),
            ));
        }

        let entry = Entry {
            value: value.to_string(),
            ttl: ttl.as_duration(),
        };
        self.inner.cache.insert(key.to_string(), entry).await;
        debug!("memory-kv set {} (ttl {}s)", key, ttl.0);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.ensure_open()?;
        Ok(self.inner.cache.remove(key).await.is_some())
    }
}

impl std::fmt::Debug for MemoryKeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryKeyValueStore")
            .field("entry_count", &self.inner.cache.entry_count())
            .field("open", &self.is_open())
            .finish()
    }
}
