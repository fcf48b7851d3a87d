//! # Content Digest — SHA-256 Content Addressing
//!
//! Defines [`ContentDigest`], the 32-byte SHA-256 digest type used for state
//! hashes, transaction hashes, Merkle tree nodes, and request id derivation.
//!
//! ## Security Invariant
//!
//! [`sha256_digest()`] accepts only [`CanonicalBytes`], ensuring that every
//! digest of structured data in the system was produced through the
//! canonicalization pipeline. [`sha256_raw()`] exists for domain-separated
//! fixed-layout inputs (Merkle leaves/nodes, request ids) where the input is
//! already an unambiguous byte concatenation.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::ValidationError;

/// A 32-byte SHA-256 digest.
///
/// Serializes as a 64-character lowercase hex string for JSON
/// interoperability with the ledger wire format.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentDigest(pub [u8; 32]);

impl ContentDigest {
    /// Create a digest from raw 32 bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a digest from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, ValidationError> {
        let bytes = decode_hex("digest", hex)?;
        if bytes.len() != 32 {
            return Err(ValidationError::InvalidLength {
                field: "digest",
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContentDigest({}…)", &self.to_hex()[..8])
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Compute a SHA-256 content digest from canonical bytes.
///
/// This is the standard digest path for structured data: token states,
/// commitment payloads, genesis payloads.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    ContentDigest(sha256_raw(data.as_bytes()))
}

/// SHA-256 over raw bytes, returning the 32-byte array.
///
/// Reserved for fixed-layout inputs: Merkle leaf/node hashing with domain
/// separation prefixes, and request id derivation.
pub fn sha256_raw(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Decode a hex string into bytes, with the field name carried into errors.
pub(crate) fn decode_hex(field: &'static str, hex: &str) -> Result<Vec<u8>, ValidationError> {
    let hex = hex.trim().to_lowercase();
    if hex.len() % 2 != 0 {
        return Err(ValidationError::InvalidHex {
            field,
            detail: format!("odd length {}", hex.len()),
        });
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| ValidationError::InvalidHex {
                field,
                detail: format!("at position {i}: {e}"),
            })
        })
        .collect()
}
