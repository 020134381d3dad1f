#![deny(clippy::all)]

use async_trait::async_trait;
use shared::config::DbConfig;
use shared::{Result, StoredValue, TtlSecs};
use std::sync::Arc;

// Ports are the pluggable extension points for the external stores behind each facade

/// Port for establishing a document-database connection
/// The returned handle is bound to `config.database_name`
#[async_trait]
pub trait DocumentDriver: Send + Sync + 'static {
    async fn connect(&self, config: &DbConfig) -> Result<Arc<dyn DocumentHandle>>;
}

/// Port for operations over an established document-database connection
#[async_trait]
pub trait DocumentHandle: Send + Sync + 'static {
    async fn count_documents(&self, collection: &str) -> Result<u64>;
}

/// Port for establishing a key-value store connection
#[async_trait]
pub trait KeyValueDriver: Send + Sync + 'static {
    async fn connect(&self) -> Result<Arc<dyn KeyValueHandle>>;
}

/// Port for operations over an established key-value store connection
#[async_trait]
pub trait KeyValueHandle: Send + Sync + 'static {
    /// Whether the underlying transport still considers itself open
    fn is_open(&self) -> bool;
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: StoredValue, ttl: TtlSecs) -> Result<()>;
    /// Returns whether the key existed
    async fn delete(&self, key: &str) -> Result<bool>;
}
