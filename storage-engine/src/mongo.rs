use async_trait::async_trait;
use files_core::ports::{DocumentDriver, DocumentHandle};
use mongodb::bson::{Document, doc};
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use shared::config::DbConfig;
use shared::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// MongoDB driver for the document-store facade
#[derive(Clone, Debug)]
pub struct MongoDriver {
    app_name: String,
    server_selection_timeout: Option<Duration>,
}

impl Default for MongoDriver {
    fn default() -> Self {
        Self::new("files-manager")
    }
}

impl MongoDriver {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            server_selection_timeout: None,
        }
    }

    /// Override the driver's own server selection timeout (30s by default)
    pub fn with_server_selection_timeout(mut self, timeout: Duration) -> Self {
        self.server_selection_timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl DocumentDriver for MongoDriver {
    async fn connect(&self, config: &DbConfig) -> Result<Arc<dyn DocumentHandle>> {
        let mut options = ClientOptions::parse(config.url())
            .await
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", config.url(), e)))?;
        options.app_name = Some(self.app_name.clone());
        if let Some(timeout) = self.server_selection_timeout {
            options.server_selection_timeout = Some(timeout);
        }

        let client = Client::with_options(options).map_err(|e| Error::Connection(e.to_string()))?;
        let database = client.database(&config.database_name);

        // The client connects lazily; a ping forces server selection now
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        debug!("MongoDB ping to {} succeeded", config.url());

        Ok(Arc::new(MongoDatabase { database }))
    }
}

/// Handle bound to one MongoDB database
pub struct MongoDatabase {
    database: Database,
}

#[async_trait]
impl DocumentHandle for MongoDatabase {
    async fn count_documents(&self, collection: &str) -> Result<u64> {
        self.database
            .collection::<Document>(collection)
            .count_documents(doc! {})
            .await
            .map_err(|e| Error::Transport(e.to_string()))
    }
}
