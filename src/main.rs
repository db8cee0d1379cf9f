use order_fulfillment::http;
use order_fulfillment::lifecycle::{setup_tracing, FulfillmentConfig, FulfillmentSystem};
use std::time::Duration;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config_path = std::env::args().nth(1);
    let config = FulfillmentConfig::load(config_path.as_deref()).map_err(|e| {
        error!(error = %e, "Invalid configuration");
        e.to_string()
    })?;

    let system = FulfillmentSystem::start(&config)
        .await
        .map_err(|e| e.to_string())?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind {addr}: {e}"))?;
    info!(%addr, "HTTP server listening");

    let app = http::router(system.app_state());
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("HTTP server error: {e}");
    }

    // The router and its handler state are gone; actors can drain now.
    let timeout = Duration::from_secs(config.server.shutdown_timeout_secs);
    match tokio::time::timeout(timeout, system.shutdown()).await {
        Ok(result) => result?,
        Err(_) => {
            error!(?timeout, "Shutdown timed out");
            return Err("shutdown timed out".into());
        }
    }

    info!("Application completed successfully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
