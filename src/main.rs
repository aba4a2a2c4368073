use std::net::SocketAddr;
use std::process::ExitCode;

use tokio::net::TcpListener;
use tracing::{error, info};

use gmass_webhook::{AppState, Config, EventType, build_router, metrics, utils};

#[tokio::main]
async fn main() -> ExitCode {
    // .env may carry RUST_LOG / LOG_FORMAT, so load it before logging starts
    let _ = dotenvy::dotenv();
    utils::init_tracing();

    info!(
        "Starting GMass Webhook Receiver v{}",
        env!("CARGO_PKG_VERSION")
    );

    match run().await {
        Ok(()) => ExitCode::from(exitcode::OK as u8),
        Err(exit_code) => ExitCode::from(exit_code as u8),
    }
}

/// Run the application, returning an exit code on error.
async fn run() -> Result<(), exitcode::ExitCode> {
    // Load configuration; refuse to start without keys
    let config = Config::from_env().map_err(|e| {
        error!("{e}");
        exitcode::CONFIG
    })?;
    info!(
        host = %config.host,
        port = %config.port,
        keys = config.api_keys.len(),
        "Configuration loaded"
    );

    if let Some(metrics_addr) = config.metrics_addr() {
        metrics::try_init_metrics(metrics_addr);
    }

    // Build application state and router
    let addr: SocketAddr = config.server_addr().parse().map_err(|e| {
        error!("Invalid server address: {e}");
        exitcode::CONFIG
    })?;
    let app = build_router(AppState::new(config));

    // Start server
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind to {addr}: {e}");
        exitcode::UNAVAILABLE
    })?;

    info!("Server listening on http://{addr}");
    info!("API endpoints:");
    info!("  GET  /                      - Service status");
    info!("  GET  /health                - Health check");
    for event_type in EventType::ALL {
        info!("  POST {:<24}- {} events", event_type.path(), event_type.label());
    }

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(utils::shutdown_signal())
        .await
        .map_err(|e| {
            error!("Server error: {e}");
            exitcode::SOFTWARE
        })?;

    info!("Server shutdown complete");
    Ok(())
}
