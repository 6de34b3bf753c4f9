//! Waypoint HTTP Server
//!
//! Main entry point for the HTTP API server.

use std::time::Duration;

use axum::http::{HeaderValue, Method};
use infrastructure::{AppConfig, Providers, init_logging};
use presentation_http::{AppState, routes, set_expose_internal_errors};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    init_logging(&config.logging)?;
    info!("Waypoint v{} starting...", env!("CARGO_PKG_VERSION"));

    config.validate()?;
    set_expose_internal_errors(config.server.expose_error_details);

    info!(
        environment = %config.environment,
        host = %config.server.host,
        port = %config.server.port,
        "Configuration loaded"
    );

    let providers = Providers::from_config(&config)?;

    let cors_layer = if config.server.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET])
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .server
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET])
            .allow_headers(Any)
    };

    let addr = config.server.bind_address();
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs);

    let app = routes::create_router(AppState::new(providers, config))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM) and handle graceful shutdown
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    // Force exit if in-flight requests do not drain in time
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        tracing::warn!(?timeout, "Graceful shutdown timed out, exiting");
        std::process::exit(1);
    });
}
