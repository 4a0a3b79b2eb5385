//! Sigil API Server
//!
//! JWT bearer-token auth service supporting HS256, RS256, and ES256 over
//! one contract.
//!
//! # Features
//!
//! - Login / refresh / verify / protected flows per algorithm
//! - Algorithm-pinned verification (no algorithm-confusion surface)
//! - JWKS export for the asymmetric public keys
//! - PBKDF2 password flows with an iteration cap
//! - In-memory request log with gated inspection endpoints
//! - Graceful shutdown handling
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings (HS256 only, dev secret)
//! sigil-server
//!
//! # Start with custom config
//! sigil-server --config /path/to/config.toml
//!
//! # Start with environment overrides
//! SIGIL__SERVER__PORT=8080 sigil-server
//! SIGIL__AUTH__KEYS__HS256_SECRET=... sigil-server
//! ```

mod config;

use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sigil_api::{create_router, AppState};
use sigil_audit::MemoryRequestLog;
use sigil_auth::AuthService;

use crate::config::ServerConfig;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Sigil API Server - multi-algorithm JWT auth service
#[derive(Parser, Debug)]
#[command(name = "sigil-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "SIGIL_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "SIGIL_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SIGIL_PORT")]
    port: Option<u16>,

    /// HS256 shared secret
    #[arg(long, env = "SIGIL_HS256_SECRET", hide_env_values = true)]
    hs256_secret: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SIGIL_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log format (json, pretty)
    #[arg(long, env = "SIGIL_LOG_FORMAT", default_value = "pretty")]
    log_format: String,
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut server_config = ServerConfig::load(args.config.as_deref())?;

    // CLI arguments win over file and environment
    if let Some(host) = args.host {
        server_config.server.host = host;
    }
    if let Some(port) = args.port {
        server_config.server.port = port;
    }
    if let Some(secret) = args.hs256_secret {
        server_config.auth.keys.hs256_secret = Some(secret);
    }
    server_config.logging.level = args.log_level;
    server_config.logging.format = args.log_format;

    init_logging(&server_config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Sigil API Server"
    );

    // Key material is imported here; bad PEM or a missing keyring fails
    // startup instead of surfacing per request
    let auth = AuthService::new(server_config.auth.clone())
        .map_err(|e| anyhow::anyhow!("auth initialization failed: {e}"))?;

    tracing::info!(
        algorithms = ?auth
            .configured_algorithms()
            .iter()
            .map(|a| a.tag())
            .collect::<Vec<_>>(),
        "Authentication service initialized"
    );

    let logs = std::sync::Arc::new(MemoryRequestLog::new(server_config.logs.capacity));
    let state = AppState::with_log_store(auth, logs);
    let app = create_router(state);

    let addr = server_config.server.socket_addr()?;
    tracing::info!(
        host = %server_config.server.host,
        port = %server_config.server.port,
        "Server listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(server_config.server.shutdown_timeout()))
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &config::LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber.with(fmt::layer().json().with_target(true)).init();
        }
        _ => {
            subscriber.with(fmt::layer().pretty().with_target(true)).init();
        }
    }

    Ok(())
}

// =============================================================================
// Graceful Shutdown
// =============================================================================

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    tracing::info!(
        timeout_secs = timeout.as_secs(),
        "Waiting for in-flight requests to complete..."
    );
}
