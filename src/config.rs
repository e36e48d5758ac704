//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Every key is optional.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::domain::connection_registry::DEFAULT_DISPLAY_NAME;
use crate::error::RelayError;
use crate::service::dispatcher::DEFAULT_WELCOME_MESSAGE;

/// Port used when neither `LISTEN_ADDR` nor `PORT` is set.
pub const DEFAULT_PORT: u16 = 8080;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:8080`).
    pub listen_addr: SocketAddr,

    /// Directory served for static assets.
    pub static_dir: PathBuf,

    /// Page returned for a plain `GET /`.
    pub index_file: PathBuf,

    /// Text of the `system` frame sent to each new connection.
    pub welcome_message: String,

    /// Display name of connections that have not set one.
    pub default_display_name: String,

    /// Tracing output format.
    pub log_format: LogFormat,
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidConfig`] if the listen address cannot be
    /// parsed.
    pub fn from_env() -> Result<Self, RelayError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// `LISTEN_ADDR` wins over `HOST`/`PORT`. An unparseable `PORT` falls
    /// back to [`DEFAULT_PORT`].
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidConfig`] if the resulting address cannot
    /// be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_addr = match lookup("LISTEN_ADDR") {
            Some(addr) => addr,
            None => {
                let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
                let port = parse_or(lookup("PORT"), DEFAULT_PORT);
                format!("{host}:{port}")
            }
        };
        let listen_addr: SocketAddr = raw_addr
            .parse()
            .map_err(|_| RelayError::InvalidConfig(format!("listen address {raw_addr:?}")))?;

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            listen_addr,
            static_dir: lookup("STATIC_DIR")
                .map_or_else(|| PathBuf::from("public"), PathBuf::from),
            index_file: lookup("INDEX_FILE")
                .map_or_else(|| PathBuf::from("index.html"), PathBuf::from),
            welcome_message: lookup("WELCOME_MESSAGE")
                .unwrap_or_else(|| DEFAULT_WELCOME_MESSAGE.to_string()),
            default_display_name: lookup("DEFAULT_DISPLAY_NAME")
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
            log_format,
        })
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            static_dir: PathBuf::from("public"),
            index_file: PathBuf::from("index.html"),
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
            default_display_name: DEFAULT_DISPLAY_NAME.to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Parses an optional value as `T`, returning `default` on missing or
/// invalid input.
fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}
