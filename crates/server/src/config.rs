//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `ROLLCALL_HOST` - Bind address (default: 127.0.0.1)
//! - `ROLLCALL_PORT` - Listen port (default: 3000)
//! - `ROLLCALL_IMPORT_DIR` - Directory searched by `POST /register-bulk/local` (default: .)
//! - `ROLLCALL_REPORT_DIR` - Directory generated reports are written to (default: reports)
//! - `ROLLCALL_REGISTRAR_URL` - Remote `registerUser` endpoint; bulk imports
//!   register in-process when unset
//! - `ROLLCALL_IMPORT_CONCURRENCY` - Registration calls in flight per import (default: 1)
//! - `ROLLCALL_MAX_UPLOAD_BYTES` - Request body limit (default: 10 MiB)
//! - `ROLLCALL_LOG_JSON` - Emit JSON logs when set
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

const DEFAULT_MAX_UPLOAD_BYTES: &str = "10485760";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory that local-file imports are resolved against
    pub import_dir: PathBuf,
    /// Directory that generated reports are saved to
    pub report_dir: PathBuf,
    /// Remote registration endpoint used by bulk imports
    pub registrar_url: Option<Url>,
    /// Maximum registration calls in flight during one import
    pub import_concurrency: NonZeroUsize,
    /// Maximum accepted request body size in bytes
    pub max_upload_bytes: usize,
    /// Emit structured JSON logs instead of human-readable text
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let registrar_url = lookup("ROLLCALL_REGISTRAR_URL")
            .map(|raw| {
                Url::parse(&raw).map_err(|e| {
                    ConfigError::InvalidEnvVar("ROLLCALL_REGISTRAR_URL".to_string(), e.to_string())
                })
            })
            .transpose()?;

        Ok(Self {
            host: parse_or_default(&lookup, "ROLLCALL_HOST", "127.0.0.1")?,
            port: parse_or_default(&lookup, "ROLLCALL_PORT", "3000")?,
            import_dir: get_or_default(&lookup, "ROLLCALL_IMPORT_DIR", ".").into(),
            report_dir: get_or_default(&lookup, "ROLLCALL_REPORT_DIR", "reports").into(),
            registrar_url,
            import_concurrency: parse_or_default(&lookup, "ROLLCALL_IMPORT_CONCURRENCY", "1")?,
            max_upload_bytes: parse_or_default(
                &lookup,
                "ROLLCALL_MAX_UPLOAD_BYTES",
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
            log_json: lookup("ROLLCALL_LOG_JSON").is_some(),
            sentry_dsn: lookup("SENTRY_DSN"),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a variable, falling back to a default.
fn get_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| default.to_string())
}

/// Get a variable (or its default) and parse it.
fn parse_or_default<F, T>(lookup: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    get_or_default(lookup, key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
