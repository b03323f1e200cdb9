mod routes;
mod singleton;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

use weekcal_core::config::WeekcalConfig;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = WeekcalConfig::load().context("Failed to load weekcal config")?;
    let port = config.server.port;

    // Ensure only one instance is running
    let _lock = singleton::acquire_lock(port)?;

    let state = AppState::from_config(&config)?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::router(state).layer(cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, cache = %config.cache_path().display(), "weekcal-server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
