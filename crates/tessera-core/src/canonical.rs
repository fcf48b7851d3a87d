//! # Canonical Serialization — JCS-Compatible Canonicalization
//!
//! Defines [`CanonicalBytes`], the sole construction path for bytes used in
//! digest computation and signing across the workspace.
//!
//! ## Security Invariant
//!
//! The inner `Vec<u8>` is private. The only way to construct `CanonicalBytes`
//! is through [`CanonicalBytes::new()`]. An offline commitment is signed by
//! the sender and re-hashed by the recipient and by the ledger, on different
//! machines, from independently deserialized copies — all three must produce
//! the same bytes or the signature and request id stop lining up. Funneling
//! every hash and signature input through this constructor makes the "wrong
//! serialization path" class of defects structurally impossible.
//!
//! ## Canonicalization Rules
//!
//! 1. Reject floats — opaque amounts must be strings or integers.
//! 2. Normalize RFC 3339 datetime strings to UTC with `Z` suffix, truncated
//!    to seconds.
//! 3. Sort object keys lexicographically.
//! 4. Compact separators (no whitespace).

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS-compatible canonicalization.
///
/// The inner `Vec<u8>` is private — downstream code cannot construct
/// `CanonicalBytes` except through [`CanonicalBytes::new()`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// This is the ONLY way to construct `CanonicalBytes`. All digest and
    /// signature computation in the stack must flow through this constructor.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let normalized = normalize_value(value)?;
        Ok(Self(serde_json::to_vec(&normalized)?))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume and return the inner byte vector.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Recursively normalize a JSON value according to the canonicalization rules.
///
/// `serde_json` is built with default features, so `Map` preserves insertion
/// order; objects are rebuilt into a `BTreeMap` first to force lexicographic
/// key order regardless of how the input was assembled.
fn normalize_value(value: Value) -> Result<Value, CanonicalizationError> {
    match value {
        Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                if n.is_f64() && !n.is_i64() && !n.is_u64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(Value::Number(n))
        }
        Value::Object(map) => {
            let sorted: std::collections::BTreeMap<String, Value> = map.into_iter().collect();
            let mut out = serde_json::Map::new();
            for (k, v) in sorted {
                out.insert(k, normalize_value(v)?);
            }
            Ok(Value::Object(out))
        }
        Value::Array(arr) => {
            let normalized: Result<Vec<_>, _> = arr.into_iter().map(normalize_value).collect();
            Ok(Value::Array(normalized?))
        }
        Value::String(s) => {
            // If the string parses as RFC 3339, normalize to UTC with Z
            // suffix, truncated to seconds.
            if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&s) {
                let utc = dt.with_timezone(&chrono::Utc);
                Ok(Value::String(utc.format("%Y-%m-%dT%H:%M:%SZ").to_string()))
            } else {
                Ok(Value::String(s))
            }
        }
        other => Ok(other),
    }
}
