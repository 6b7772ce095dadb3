//! Process configuration read from `CODESNIP_*` environment variables.
//!
//! Model settings (API key, model, token budget) are not here; they live in
//! the database and are edited through the settings screen.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use codesnip_openai::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use thiserror::Error;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_DB_PATH: &str = "codesnip.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidBind { var: &'static str, value: String },

    #[error("{var} must be a whole number of seconds: {value}")]
    InvalidTimeout { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub db_path: PathBuf,
    /// `None` means a random per-process secret.
    pub nonce_secret: Option<String>,
    pub openai_base_url: String,
    pub openai_timeout: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_raw = get("CODESNIP_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw.parse().map_err(|_| ConfigError::InvalidBind {
            var: "CODESNIP_BIND",
            value: bind_raw.clone(),
        })?;

        let openai_timeout = match get("CODESNIP_OPENAI_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::InvalidTimeout {
                    var: "CODESNIP_OPENAI_TIMEOUT_SECS",
                    value: raw,
                })?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            bind,
            db_path: get("CODESNIP_DB")
                .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
                .into(),
            nonce_secret: get("CODESNIP_NONCE_SECRET"),
            openai_base_url: get("CODESNIP_OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            openai_timeout,
        })
    }
}
