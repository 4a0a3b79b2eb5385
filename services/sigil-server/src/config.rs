//! Server Configuration
//!
//! Configuration management for the Sigil API server. Supports environment
//! variables, config files, and CLI arguments.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

use sigil_auth::AuthConfig;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Server binding configuration
    pub server: ServerSettings,

    /// Authentication configuration (keys, lifetimes, password params)
    pub auth: AuthConfig,

    /// Request-log configuration
    pub logs: LogSettings,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server binding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Shutdown timeout in seconds
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            shutdown_timeout_secs: 30,
        }
    }
}

impl ServerSettings {
    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid bind address: {e}"))
    }

    /// Get the shutdown timeout duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Request-log settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Entries retained by the in-memory store
    pub capacity: usize,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            capacity: sigil_audit::DEFAULT_LOG_CAPACITY,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment and optional config file
    ///
    /// Precedence, lowest to highest: built-in defaults, `config/default`,
    /// `config/local`, the explicit file, `SIGIL__`-prefixed environment
    /// variables.
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false));

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("SIGIL")
                .separator("__")
                .try_parsing(true),
        );

        let loaded = builder.build()?;
        let server_config: ServerConfig = loaded.try_deserialize().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            ServerConfig::default()
        });

        Ok(server_config)
    }
}
