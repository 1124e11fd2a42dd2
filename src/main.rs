use anyhow::{Context, Result};
use factorypulse::api::create_app;
use factorypulse::config::FactoryConfig;
use factorypulse::state::{spawn_ticker, FactoryEngine};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "factorypulse=info".into()),
        )
        .init();

    info!("FactoryPulse starting...");

    let config = FactoryConfig::load().context("Failed to load configuration")?;
    info!(
        bind = %config.server.bind,
        tick_interval_ms = config.simulation.tick_interval_ms,
        responder = ?config.responder.kind,
        "Configuration loaded"
    );

    let engine = Arc::new(
        FactoryEngine::from_config(&config).context("Failed to initialize factory engine")?,
    );

    let ticker = spawn_ticker(Arc::clone(&engine), config.simulation.tick_interval());
    info!("Simulation ticker started");

    let router = create_app(Arc::clone(&engine));
    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    info!(bind = %config.server.bind, "HTTP API listening");

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "HTTP API server error");
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    server_handle.abort();
    ticker.stop().await;
    info!(revision = engine.revision(), "FactoryPulse stopped");

    Ok(())
}
