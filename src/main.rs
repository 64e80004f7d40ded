mod auth;
mod config;
mod db;
mod handlers;
mod importer;
mod inventory;
mod models;
mod netbox;
mod router;
mod scripts;
mod utils;

use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{Config, InventoryBackend};
use db::Store;
use importer::Fetcher;
use inventory::Inventory;
use netbox::NetBoxClient;

/// Application state shared across handlers
pub struct AppState {
    /// Backend the scripts write to
    pub inventory: Arc<dyn Inventory>,
    /// Local database; always holds the user accounts
    pub store: Store,
    pub fetcher: Fetcher,
    pub config: Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forge_scripts=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let mut cfg = Config::load()?;
    if cfg.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET not set - generating random secret (tokens will be invalidated on restart)");
        cfg.jwt_secret = uuid::Uuid::new_v4().to_string();
    }
    tracing::info!("Starting ForgeScripts Server");
    tracing::info!("Database: {}", cfg.db_path);
    tracing::info!("Listen: {}", cfg.listen_addr);

    // Initialize database
    let store = Store::with_pool_size(&cfg.db_path, cfg.db_max_connections).await?;
    tracing::info!("Database initialized (pool_size={})", cfg.db_max_connections);
    store
        .ensure_admin_user(&cfg.admin_username, &cfg.admin_password)
        .await?;

    // Select the inventory backend
    let inventory: Arc<dyn Inventory> = match &cfg.backend {
        InventoryBackend::Local => {
            tracing::info!("Inventory backend: local database");
            Arc::new(store.clone())
        }
        InventoryBackend::NetBox { url, token } => {
            let nb = NetBoxClient::new(url.clone(), token.clone(), cfg.fetch_timeout)?;
            if nb.test_connection().await {
                tracing::info!("Inventory backend: NetBox at {}", url);
            } else {
                tracing::warn!("Inventory backend: NetBox at {} is not reachable yet", url);
            }
            Arc::new(nb)
        }
    };

    let fetcher = Fetcher::new(cfg.fetch_timeout, cfg.import_dir.clone())?;
    tracing::info!("CSV import directory: {}", cfg.import_dir.display());

    // Create app state
    let state = Arc::new(AppState {
        inventory,
        store,
        fetcher,
        config: cfg.clone(),
    });

    // Build router
    let app = router::build(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
    tracing::info!("ForgeScripts listening on {}", cfg.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("ForgeScripts shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
