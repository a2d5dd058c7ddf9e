use std::path::PathBuf;
use std::sync::Arc;

use intent_config::ConfigCore;
use intent_server::{build_router, AppState};
use intent_store::RouteStore;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

fn data_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("intent-hub")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let dir = data_dir();
    std::fs::create_dir_all(&dir)?;

    let config = Arc::new(ConfigCore::load(
        dir.join("settings.toml"),
        Some(dir.join(".env")),
    )?);
    let store = Arc::new(RouteStore::open(dir.join("routes.json"))?);

    let state = AppState::bootstrap(config, store)?;
    state.spawn_rebind_task();

    let router = build_router(state);

    let port: u16 = std::env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(8080);
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(%port, "intent-hub listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    tracing::info!("shutdown signal received");
}
