//! # Error Types — Structured Error Hierarchy
//!
//! Errors for the foundational layer. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations, and carry enough
//! context (expected vs actual lengths, the offending value) to diagnose
//! a failure without a debugger.

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Opaque state data and commitment payloads must use strings or
    /// integers so that every implementation serializes them identically.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error constructing or parsing an identifier newtype.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A hex-encoded field failed to decode.
    #[error("invalid hex in {field}: {detail}")]
    InvalidHex {
        /// Which field was being parsed.
        field: &'static str,
        /// What was wrong with it.
        detail: String,
    },

    /// A fixed-length field had the wrong length.
    #[error("{field} must be {expected} bytes, got {actual}")]
    InvalidLength {
        /// Which field was being parsed.
        field: &'static str,
        /// Required byte length.
        expected: usize,
        /// Observed byte length.
        actual: usize,
    },

    /// An address string did not match the `tess:` format.
    #[error("malformed address: {0}")]
    MalformedAddress(String),
}
