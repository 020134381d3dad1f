use files_core::{DocumentStoreFacade, KeyValueStoreFacade};
use server_http::{AppState, build_router};
use shared::config::{DbConfig, ServerConfig};
use std::sync::Arc;
use storage_engine::{MongoDriver, RedisDriver};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting files manager HTTP server...");

    // Load environment variables from .env file (if exists)
    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    let db_config = DbConfig::from_env();
    let server_config = ServerConfig::from_env();

    // One facade per store for the whole process, handed to the router below
    let db = Arc::new(DocumentStoreFacade::create(
        db_config,
        Arc::new(MongoDriver::default()),
    ));
    let cache = Arc::new(KeyValueStoreFacade::create(Arc::new(RedisDriver::default())));

    let state = AppState::new(db, cache);
    state.connect().await;

    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(server_config.bind_addr()).await?;
    info!("HTTP Server listening on http://{}", server_config.bind_addr());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Ctrl+C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("SIGTERM handler unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    info!("Shutting down gracefully...");
}
