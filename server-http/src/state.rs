use files_core::{ConnectionState, DocumentStoreFacade, KeyValueStoreFacade};
use std::sync::Arc;
use tracing::{info, warn};

/// Server state shared across handlers
///
/// Each facade is built once at startup; handlers only ever see these shared
/// references.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DocumentStoreFacade>,
    pub cache: Arc<KeyValueStoreFacade>,
}

impl AppState {
    pub fn new(db: Arc<DocumentStoreFacade>, cache: Arc<KeyValueStoreFacade>) -> Self {
        Self { db, cache }
    }

    /// Resolve both connections before the server is declared ready.
    /// A failed connection is not fatal: the facade stays in degraded mode.
    pub async fn connect(&self) -> (ConnectionState, ConnectionState) {
        let (db_state, cache_state) = tokio::join!(self.db.connect(), self.cache.connect());

        match db_state {
            ConnectionState::Connected => info!("Document store ready at {}", self.db.url()),
            state => warn!(
                "Document store {} ({}); counts will read as 0",
                state,
                self.db.url()
            ),
        }
        match cache_state {
            ConnectionState::Connected => info!("Key-value store ready"),
            state => warn!("Key-value store {}; lookups will read as empty", state),
        }

        (db_state, cache_state)
    }
}
