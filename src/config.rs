//! Relay configuration.
//!
//! Read once from the environment at startup. A missing credential or an
//! unusable timeout refuses startup before the listener binds.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::RelayError;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_PORT: u16 = 3000;
/// Per-attempt timeout bound. Must stay finite so a single hung model cannot
/// stall the whole fallback sequence.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(25);

/// Startup configuration for the relay service.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Bearer token for the upstream API. Redacted in `Debug`, never logged.
    pub api_key: SecretString,
    /// Listen port.
    pub port: u16,
    /// Upstream base URL (the `/chat/completions` path is appended).
    pub base_url: String,
    /// Per-attempt request timeout. Always finite.
    pub request_timeout: Duration,
}

impl RelayConfig {
    /// Load configuration from the environment.
    ///
    /// `RELAY_API_KEY` is required; `PORT`, `RELAY_BASE_URL`, and
    /// `RELAY_TIMEOUT_SECS` fall back to defaults.
    pub fn from_env() -> Result<Self, RelayError> {
        Self::from_parts(
            std::env::var("RELAY_API_KEY").ok(),
            std::env::var("PORT").ok(),
            std::env::var("RELAY_BASE_URL").ok(),
            std::env::var("RELAY_TIMEOUT_SECS").ok(),
        )
    }

    /// Build a configuration directly; used by embedders and tests.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            port: DEFAULT_PORT,
            base_url: base_url.into(),
            request_timeout,
        }
    }

    fn from_parts(
        api_key: Option<String>,
        port: Option<String>,
        base_url: Option<String>,
        timeout_secs: Option<String>,
    ) -> Result<Self, RelayError> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| RelayError::Configuration("RELAY_API_KEY is not set".into()))?;

        let port = match port {
            Some(raw) => raw.parse().map_err(|_| {
                RelayError::Configuration(format!("PORT must be a port number, got '{raw}'"))
            })?,
            None => DEFAULT_PORT,
        };

        let request_timeout = match timeout_secs {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    RelayError::Configuration(format!(
                        "RELAY_TIMEOUT_SECS must be an integer, got '{raw}'"
                    ))
                })?;
                if secs == 0 {
                    return Err(RelayError::Configuration(
                        "RELAY_TIMEOUT_SECS must be at least 1".into(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            api_key: SecretString::from(api_key),
            port,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout,
        })
    }
}
