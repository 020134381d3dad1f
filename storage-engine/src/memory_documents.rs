use async_trait::async_trait;
use dashmap::DashMap;
use files_core::ports::{DocumentDriver, DocumentHandle};
use serde_json::Value;
use shared::config::DbConfig;
use shared::{Error, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
struct Inner {
    // (database, collection) -> documents
    collections: DashMap<(String, String), Vec<Value>>,
    unreachable: AtomicBool,
    failing: AtomicBool,
}

/// In-process document store; clones share the same data
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    inner: Arc<Inner>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `connect` always fails
    pub fn unreachable() -> Self {
        let store = Self::new();
        store.inner.unreachable.store(true, Ordering::Release);
        store
    }

    pub fn insert_document(&self, database: &str, collection: &str, document: Value) {
        self.inner
            .collections
            .entry((database.to_string(), collection.to_string()))
            .or_default()
            .push(document);
    }

    /// Make every query fail with a transport error until reset
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::Release);
    }

    fn count(&self, database: &str, collection: &str) -> Result<u64> {
        if self.inner.failing.load(Ordering::Acquire) {
            return Err(Error::Transport("server selection timeout".to_string()));
        }

        let key = (database.to_string(), collection.to_string());
        Ok(self
            .inner
            .collections
            .get(&key)
            .map(|docs| docs.len() as u64)
            .unwrap_or(0))
    }
}

#[async_trait]
impl DocumentDriver for MemoryDocumentStore {
    async fn connect(&self, config: &DbConfig) -> Result<Arc<dyn DocumentHandle>> {
        if self.inner.unreachable.load(Ordering::Acquire) {
            return Err(Error::Connection(format!("{} is unreachable", config.url())));
        }

        Ok(Arc::new(MemoryDatabase {
            store: self.clone(),
            name: config.database_name.clone(),
        }))
    }
}

/// A handle bound to one database of a [`MemoryDocumentStore`]
pub struct MemoryDatabase {
    store: MemoryDocumentStore,
    name: String,
}

#[async_trait]
impl DocumentHandle for MemoryDatabase {
    async fn count_documents(&self, collection: &str) -> Result<u64> {
        self.store.count(&self.name, collection)
    }
}
