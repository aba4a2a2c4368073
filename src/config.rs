//! Application configuration loaded from environment variables.
//!
//! # Configuration Hierarchy
//!
//! Configuration is read from the process environment. The binary loads a
//! `.env` file from the working directory before calling
//! [`Config::from_env`]; variables already set in the environment take
//! precedence over it.
//!
//! # Required
//!
//! - `GMASS_API_KEYS`: Comma-separated list of accepted `X-apikey` values.
//!   The server refuses to start when it is empty.
//!
//! # Optional
//!
//! - `HOST`: Bind IP address for the API and metrics listeners (default: `0.0.0.0`)
//! - `PORT`: Listen port (default: 5000)
//! - `SERVICE_NAME`: Name reported by `GET /` (default: `GMass`)
//! - `MAX_REQUEST_BODY_SIZE`: Webhook body limit in bytes (default: 1MB)
//! - `CORS_ALLOWED_ORIGINS`: Comma-separated origins (default: `*`)
//! - `METRICS_PORT`: Prometheus exporter port on `HOST` (default: 0 = disabled)
//!
//! Logging (`RUST_LOG`, `LOG_FORMAT`) is configured in
//! [`utils::init_tracing`](crate::utils::init_tracing) before this module
//! runs, so configuration errors can be reported through the subscriber.

use std::env;
use std::net::{IpAddr, SocketAddr};

use crate::error::{AppError, AppResult};
use crate::keys::KeyStore;

/// Environment variable holding the authorized API keys.
pub const API_KEYS_VAR: &str = "GMASS_API_KEYS";

/// Application configuration loaded from environment variables.
///
/// # Example
///
/// ```rust,ignore
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.server_addr());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Server host address (default: "0.0.0.0")
    pub host: String,

    /// Server port (default: 5000)
    pub port: u16,

    /// Name shown in the `GET /` status message (default: "GMass")
    pub service_name: String,

    // =========================================================================
    // Security Configuration
    // =========================================================================
    /// Keys accepted in the `X-apikey` header
    pub api_keys: KeyStore,

    /// Maximum request body size in bytes (default: 1MB)
    pub max_request_body_size: usize,

    /// Allowed CORS origins; `*` allows any origin
    pub cors_allowed_origins: Vec<String>,

    // =========================================================================
    // Observability Configuration
    // =========================================================================
    /// Port for Prometheus metrics endpoint (default: 0 = disabled)
    pub metrics_port: u16,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if no API keys are configured or any
    /// value fails to parse or validate.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// `from_env` delegates here; tests pass a closure over a map so they
    /// never mutate the real process environment.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_keys = KeyStore::from_source(&lookup(API_KEYS_VAR).unwrap_or_default())?;

        let config = Self {
            // Server
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_var(&lookup, "PORT", 5000)?,
            service_name: lookup("SERVICE_NAME")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "GMass".to_string()),

            // Security
            api_keys,
            max_request_body_size: parse_var(&lookup, "MAX_REQUEST_BODY_SIZE", 1024 * 1024)?,
            cors_allowed_origins: parse_cors_origins(lookup("CORS_ALLOWED_ORIGINS")),

            // Observability
            metrics_port: parse_var(&lookup, "METRICS_PORT", 0)?,
        };

        // Validate configuration before returning
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values for consistency and correctness.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if validation fails.
    ///
    /// Key usability is checked earlier by [`KeyStore::from_source`].
    fn validate(&self) -> AppResult<()> {
        if let Err(e) = self.host.parse::<IpAddr>() {
            return Err(AppError::ConfigError(format!(
                "Invalid HOST '{}': {e}",
                self.host
            )));
        }

        if self.max_request_body_size == 0 {
            return Err(AppError::ConfigError(
                "MAX_REQUEST_BODY_SIZE must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the full server address for binding.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if Prometheus metrics export is enabled.
    pub fn metrics_enabled(&self) -> bool {
        self.metrics_port > 0
    }

    /// Get the metrics endpoint address.
    ///
    /// The exporter shares `host` with the API listener. Returns `None` if
    /// metrics are disabled (port = 0).
    pub fn metrics_addr(&self) -> Option<SocketAddr> {
        if !self.metrics_enabled() {
            return None;
        }
        // host is checked by validate()
        let ip: IpAddr = self.host.parse().ok()?;
        Some(SocketAddr::new(ip, self.metrics_port))
    }
}

/// Parse a variable into the specified type, falling back to `default` when unset.
fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(val) => val
            .parse()
            .map_err(|e| AppError::ConfigError(format!("Invalid {name}: {e}"))),
        None => Ok(default),
    }
}

/// Parse CORS allowed origins, defaulting to any origin.
fn parse_cors_origins(raw: Option<String>) -> Vec<String> {
    let origins: Vec<String> = raw
        .unwrap_or_else(|| "*".to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if origins.is_empty() {
        vec!["*".to_string()]
    } else {
        origins
    }
}

/// Default configuration for testing and development.
///
/// The default key set is empty and therefore unusable; tests supply their
/// own keys via struct update syntax.
impl Default for Config {
    fn default() -> Self {
        Self {
            // Server
            host: "0.0.0.0".to_string(),
            port: 5000,
            service_name: "GMass".to_string(),
            // Security
            api_keys: KeyStore::load(""),
            max_request_body_size: 1024 * 1024, // 1MB
            cors_allowed_origins: vec!["*".to_string()],
            // Observability
            metrics_port: 0,
        }
    }
}
