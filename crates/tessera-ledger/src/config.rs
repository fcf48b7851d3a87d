//! # Ledger Client Configuration
//!
//! Configures the base URL and timeout for the aggregator HTTP API.
//! Defaults point to a local node; override via environment variables or
//! explicit construction for tests.

use url::Url;

use thiserror::Error;

/// Default aggregator endpoint for a locally running node.
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8585";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for connecting to the ledger aggregator.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Base URL of the aggregator HTTP API.
    pub base_url: Url,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl LedgerConfig {
    /// Configuration for an explicit base URL with the default timeout.
    pub fn for_base_url(base_url: Url) -> Self {
        Self {
            base_url: normalize(base_url),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `TESSERA_LEDGER_URL` (default: `http://127.0.0.1:8585`)
    /// - `TESSERA_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("TESSERA_LEDGER_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let base_url = raw.parse().map_err(|e| ConfigError::InvalidUrl {
            var: "TESSERA_LEDGER_URL",
            detail: format!("{e}: {raw}"),
        })?;
        let timeout_secs = std::env::var("TESSERA_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Ok(Self {
            base_url: normalize(base_url),
            timeout_secs,
        })
    }
}

/// API paths are appended textually to the base URL; without a trailing
/// slash a path like `/ledger` would fuse with the API prefix.
fn normalize(mut base_url: Url) -> Url {
    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }
    base_url
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An environment variable did not parse as a URL.
    #[error("invalid URL in {var}: {detail}")]
    InvalidUrl {
        /// The variable that failed to parse.
        var: &'static str,
        /// What was wrong with it.
        detail: String,
    },
}
