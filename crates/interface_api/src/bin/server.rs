//! Dutyback API Server Binary
//!
//! This binary starts the HTTP API hosting claim wizard sessions.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin dutyback-api
//!
//! # Run with environment variables
//! API_HOST=0.0.0.0 API_PORT=8080 API_CDS_CUTOVER=2024-06-01 cargo run --bin dutyback-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_SESSION_IDLE_SECS` - Seconds before an untouched wizard session is evicted (default: 1800)
//! * `API_CDS_CUTOVER` - First import date (YYYY-MM-DD) filed through CDS; unset routes all customs claims to C285

use std::net::SocketAddr;
use std::sync::Arc;

use domain_claims::adapters::InMemoryClaimStore;
use interface_api::{config::ApiConfig, router_with_state, AppState};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Main entry point for the API server.
///
/// # Errors
///
/// Returns an error if the server fails to bind to the configured address
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = load_config();

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        cds_cutover = ?config.cds_cutover,
        "Starting Dutyback API Server"
    );

    let state = AppState::new(config.clone(), Arc::new(InMemoryClaimStore::new()));
    state.sessions.spawn_idle_eviction(config.session_idle_timeout());
    let app = router_with_state(state);

    let addr: SocketAddr = config.server_addr().parse()?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads API configuration from environment variables.
///
/// Falls back to defaults when the environment cannot be parsed.
fn load_config() -> ApiConfig {
    ApiConfig::from_env().unwrap_or_else(|err| {
        eprintln!("invalid API_* configuration ({err}), using defaults");
        ApiConfig::default()
    })
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
