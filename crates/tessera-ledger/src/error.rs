//! # Ledger Client Error Types
//!
//! Errors from the ledger boundary. The taxonomy matters more than usual
//! here: transient transport failures are retryable and must never be
//! surfaced as validation or security failures, while API-level rejections
//! are protocol violations and must never be retried.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors from ledger gateway operations.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Transport-level failure (connection refused, timeout, TLS).
    /// Transient — the caller may retry with backoff.
    #[error("transport error calling {endpoint}: {source}")]
    Http {
        /// Which RPC operation failed.
        endpoint: String,
        /// The underlying reqwest error.
        source: reqwest::Error,
    },

    /// The ledger answered with a non-success status. 4xx statuses are
    /// protocol rejections (fatal); 5xx are server faults (retryable).
    #[error("ledger API error on {endpoint}: status {status}: {body}")]
    Api {
        /// Which RPC operation failed.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// The ledger's response did not deserialize into the expected shape.
    /// Treated as a transport failure, not as ledger state.
    #[error("malformed response from {endpoint}: {source}")]
    Deserialization {
        /// Which RPC operation failed.
        endpoint: String,
        /// The underlying reqwest error.
        source: reqwest::Error,
    },

    /// The gateway could not be reached at all. Produced by the in-memory
    /// ledger's fault injection and by request construction failures.
    #[error("ledger unreachable on {endpoint}: {detail}")]
    Unreachable {
        /// Which RPC operation failed.
        endpoint: String,
        /// What went wrong.
        detail: String,
    },

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl LedgerError {
    /// Whether this error is an API-level protocol rejection (a 4xx), as
    /// opposed to a transient transport condition.
    pub fn is_protocol_rejection(&self) -> bool {
        matches!(self, LedgerError::Api { status, .. } if (400..500).contains(status))
    }
}
