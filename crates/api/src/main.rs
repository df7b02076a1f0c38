//! retrykit - retry scenario server
//!
//! Main entry point for the HTTP service.

use anyhow::Context;
use retrykit_api::{build_router, shutdown, AppState};
use retrykit_infra::{config, init_tracing};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before reading configuration from the environment
    let dotenv = dotenvy::dotenv();

    let config = config::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(e) => debug!(error = %e, "No .env loaded"),
    }

    let shutdown_token = CancellationToken::new();
    let state = AppState::from_config(&config)
        .context("failed to initialise application state")?
        .with_shutdown(shutdown_token.clone());
    let app = build_router(state);

    let listener = TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    info!(addr = %listener.local_addr()?, upstream = %config.upstream.base_url, "retrykit listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown::shutdown().await;
            shutdown_token.cancel();
        })
        .await
        .context("server error")?;

    info!("retrykit stopped");
    Ok(())
}
