mod api;
mod buttons;
mod config;
mod metrics;
mod net;
mod state_manager;
mod wake_manager;

use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use anyhow::{Context, Result};
use crate::config::Config;
use crate::net::probe::Prober;
use crate::net::wol::MacAddr;
use crate::state_manager::StateHandle;
use crate::wake_manager::WakeManager;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lanpaneld=info")),
        )
        .init();

    tracing::info!("Starting lanpaneld");

    // Load config
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/etc/lanpanel/lanpaneld.toml"));

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    tracing::info!("Loaded config from {}", config_path.display());

    // Validate the wake address up front so a misconfigured MAC fails fast
    // instead of surfacing per request
    let mac: MacAddr = config
        .wake
        .mac
        .parse()
        .with_context(|| format!("Invalid wake.mac in config: {:?}", config.wake.mac))?;
    tracing::info!("Wake target is {}", mac);

    let prober = Arc::new(
        Prober::new(&config.probe).context("Failed to build reachability prober")?,
    );

    // Cancellation token for graceful shutdown; in-flight wake jobs check it
    // between poll attempts
    let cancel = CancellationToken::new();

    let wake = WakeManager::new(
        prober.clone() as Arc<dyn crate::net::probe::Probe>,
        mac,
        Arc::new(config.wake.clone()),
        cancel.clone(),
    );

    let listen = config.panel.listen.clone();

    // Start the single-writer state thread that owns config and runtime flags
    let state = StateHandle::spawn(config, config_path);

    // Build API router
    let app_state = api::routes::AppState {
        state: state.clone(),
        wake,
        prober,
    };
    let app = api::routes::router(app_state);

    // Bind HTTP server
    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .with_context(|| format!("Failed to bind to {}", listen))?;

    tracing::info!("API listening on {}", listen);

    // Run server with graceful shutdown
    let server_cancel = cancel.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async move { server_cancel.cancelled().await })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutdown signal received");

    // Trigger cancellation; wake jobs unwind with a Cancelled terminal state
    cancel.cancel();

    let _ = server_handle.await;

    // Shutdown state thread
    if let Err(e) = state.shutdown().await {
        tracing::error!("Failed to shutdown state thread: {}", e);
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
