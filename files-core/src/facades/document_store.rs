use super::as_connection_error;
use crate::connection::{ConnectionState, ConnectionStatus};
use crate::ports::{DocumentDriver, DocumentHandle};
use shared::Error;
use shared::config::DbConfig;
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub const USERS_COLLECTION: &str = "users";
pub const FILES_COLLECTION: &str = "files";

/// Facade over the document database
pub struct DocumentStoreFacade {
    config: DbConfig,
    driver: Arc<dyn DocumentDriver>,
    status: ConnectionStatus,
    handle: OnceLock<Arc<dyn DocumentHandle>>,
}

impl DocumentStoreFacade {
    /// Build an unconnected facade; no I/O happens until `connect`
    pub fn create(config: DbConfig, driver: Arc<dyn DocumentDriver>) -> Self {
        Self {
            config,
            driver,
            status: ConnectionStatus::new(),
            handle: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    pub fn url(&self) -> String {
        self.config.url()
    }

    pub fn state(&self) -> ConnectionState {
        self.status.state()
    }

    pub fn last_error(&self) -> Option<&Error> {
        self.status.last_error()
    }

    /// Resolve the connection. Failures are logged and recorded, never returned.
    /// Only the first call does any work; later calls report the current state.
    pub async fn connect(&self) -> ConnectionState {
        if self.status.begin().is_err() {
            let state = self.status.state();
            if state.is_terminal() {
                debug!("Document store connection already {}", state);
            } else {
                debug!("Document store connection attempt already in progress");
            }
            return state;
        }

        info!(
            "Connecting to document store at {} (database {})",
            self.config.url(),
            self.config.database_name
        );

        match self.driver.connect(&self.config).await {
            Ok(handle) => {
                // begin() guarantees a single writer, so the cell is empty here
                let _ = self.handle.set(handle);
                self.status.succeed();
                info!("Connected to document store {}", self.config.url());
            }
            Err(e) => {
                let e = as_connection_error(e);
                error!("Error connecting to document store: {}", e);
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

    pub fn is_alive(&self) -> bool {
        self.status.is_connected()
    }

    /// Number of documents in `collection`, or 0 when the store is unreachable
    pub async fn count_documents(&self, collection: &str) -> u64 {
        let Some(handle) = self.live_handle() else {
            return 0;
        };

        match handle.count_documents(collection).await {
            Ok(count) => count,
            Err(e) => {
                warn!("count_documents({}) failed: {}", collection, e);
                0
            }
        }
    }

    pub async fn nb_users(&self) -> u64 {
        self.count_documents(USERS_COLLECTION).await
    }

    pub async fn nb_files(&self) -> u64 {
        self.count_documents(FILES_COLLECTION).await
    }

    fn live_handle(&self) -> Option<&Arc<dyn DocumentHandle>> {
        if let Err(e) = self.status.ensure_connected() {
            debug!("Document store degraded: {}", e);
            return None;
        }
        self.handle.get()
    }
}

impl std::fmt::Debug for DocumentStoreFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStoreFacade")
            .field("config", &self.config)
            .field("state", &self.status.state())
            .finish()
    }
}
