use super::as_connection_error;
use crate::connection::{ConnectionState, ConnectionStatus};
use crate::ports::{KeyValueDriver, KeyValueHandle};
use shared::{Error, StoredValue, TtlSecs};
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Facade over the key-value store
pub struct KeyValueStoreFacade {
    driver: Arc<dyn KeyValueDriver>,
    status: ConnectionStatus,
    handle: OnceLock<Arc<dyn KeyValueHandle>>,
}

impl KeyValueStoreFacade {
    /// Build an unconnected facade; no I/O happens until `connect`
    pub fn create(driver: Arc<dyn KeyValueDriver>) -> Self {
        Self {
            driver,
            status: ConnectionStatus::new(),
            handle: OnceLock::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.status.state()
    }

    pub fn last_error(&self) -> Option<&Error> {
        self.status.last_error()
    }

    /// Resolve the connection. Failures are logged and recorded, never returned.
    pub async fn connect(&self) -> ConnectionState {
        if self.status.begin().is_err() {
            let state = self.status.state();
            if state.is_terminal() {
                debug!("Key-value store connection already {}", state);
            } else {
                debug!("Key-value store connection attempt already in progress");
            }
            return state;
        }

        match self.driver.connect().await {
            Ok(handle) => {
                let _ = self.handle.set(handle);
                self.status.succeed();
                info!("Connected to key-value store");
            }
            Err(e) => {
                let e = as_connection_error(e);
                error!("Failed to connect to key-value store: {}", e);
                self.status.fail(e);
            }
        }

        self.status.state()
    }

    /// Launch `connect` in the background and return immediately
    pub fn spawn_connect(self: &Arc<Self>) -> JoinHandle<ConnectionState> {
        let facade = Arc::clone(self);
        tokio::spawn(async move { facade.connect().await })
    }

    /// Connected according to our state machine AND the transport is still open.
    /// The transport can drop on its own, in which case the two disagree and
    /// the store counts as unavailable.
    pub fn is_alive(&self) -> bool {
        self.status.is_connected() && self.handle.get().is_some_and(|handle| handle.is_open())
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let handle = self.live_handle()?;

        match handle.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!("get({}) failed: {}", key, e);
                None
            }
        }
    }

    /// Store `value` under `key` for `ttl`, replacing any previous value
    pub async fn set(&self, key: &str, value: impl Into<StoredValue>, ttl: TtlSecs) {
        let Some(handle) = self.live_handle() else {
            debug!("Dropping set({}): {}", key, Error::StoreUnavailable);
            return;
        };

        if let Err(e) = handle.set(key, value.into(), ttl).await {
            warn!("set({}) failed: {}", key, e);
        }
    }

    pub async fn delete(&self, key: &str) {
        let Some(handle) = self.live_handle() else {
            debug!("Dropping delete({}): {}", key, Error::StoreUnavailable);
            return;
        };

        if let Err(e) = handle.delete(key).await {
            warn!("delete({}) failed: {}", key, e);
        }
    }

    fn live_handle(&self) -> Option<&Arc<dyn KeyValueHandle>> {
        self.status.ensure_connected().ok()?;
        self.handle.get().filter(|handle| handle.is_open())
    }
}

impl std::fmt::Debug for KeyValueStoreFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyValueStoreFacade")
            .field("state", &self.status.state())
            .field("alive", &self.is_alive())
            .finish()
    }
}
