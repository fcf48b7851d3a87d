//! # Identifier Newtypes
//!
//! Domain-primitive newtypes for the transfer protocol. Each identifier is a
//! distinct type — you cannot pass a [`TokenId`] where a [`RequestId`] is
//! expected.
//!
//! ## Determinism
//!
//! [`RequestId::derive()`] is the single most load-bearing function here:
//! the ledger keys its append-only record on request ids, so the same
//! `(public key, state digest)` pair must derive the same id on the sender's
//! machine, the recipient's machine, and the ledger. Idempotent resubmission
//! and double-spend conflict detection both hang off this equality.

use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::digest::{decode_hex, sha256_raw, ContentDigest};
use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// TokenId
// ---------------------------------------------------------------------------

/// A unique 32-byte token identifier, generated at mint time.
///
/// Serializes as a 64-character lowercase hex string.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenId([u8; 32]);

impl TokenId {
    /// Generate a fresh random token identifier.
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create a token identifier from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the raw 32-byte identifier.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, ValidationError> {
        let bytes = decode_hex("token id", hex)?;
        if bytes.len() != 32 {
            return Err(ValidationError::InvalidLength {
                field: "token id",
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl Serialize for TokenId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TokenId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenId({}…)", &self.to_hex()[..8])
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// TokenTypeId
// ---------------------------------------------------------------------------

/// The immutable type descriptor of a token class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenTypeId(String);

impl TokenTypeId {
    /// Create a token type identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Access the type name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TokenTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// RequestId
// ---------------------------------------------------------------------------

/// The deterministic key under which a state spend is recorded on the ledger.
///
/// Derived as `sha256(public_key ‖ state_digest)`. Two different transfers
/// consuming the same source state derive the same request id, which is how
/// the ledger detects double-spends; the same transfer resubmitted derives
/// the same id with the same payload, which is how it detects duplicates.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(ContentDigest);

impl RequestId {
    /// Derive the request id for spending `state_digest` owned by the key
    /// with the given 32 public key bytes.
    pub fn derive(public_key: &[u8; 32], state_digest: &ContentDigest) -> Self {
        let mut input = Vec::with_capacity(64);
        input.extend_from_slice(public_key);
        input.extend_from_slice(state_digest.as_bytes());
        Self(ContentDigest::from_bytes(sha256_raw(&input)))
    }

    /// The underlying digest value.
    pub fn as_digest(&self) -> &ContentDigest {
        &self.0
    }

    /// The raw 32 bytes, used as the sparse Merkle tree key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    /// Render as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, ValidationError> {
        Ok(Self(ContentDigest::from_hex(hex)?))
    }
}

impl std::fmt::Debug for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RequestId({}…)", &self.to_hex()[..8])
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Salt
// ---------------------------------------------------------------------------

/// A random 32-byte salt carried in a commitment payload.
///
/// Keeps otherwise-identical transfer payloads distinguishable and blinds
/// the payload digest. Hex serde like the other 32-byte types.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Salt([u8; 32]);

impl Salt {
    /// Generate a fresh random salt.
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create a salt from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl Serialize for Salt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Salt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        let bytes = decode_hex("salt", &hex).map_err(serde::de::Error::custom)?;
        if bytes.len() != 32 {
            return Err(serde::de::Error::custom(ValidationError::InvalidLength {
                field: "salt",
                expected: 32,
                actual: bytes.len(),
            }));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl std::fmt::Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Salt({}…)", &self.to_hex()[..8])
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A recipient address: `tess:` followed by 64 hex chars of a predicate
/// digest.
///
/// The address commits to the recipient's unlock predicate without revealing
/// anything the predicate does not already reveal; validation checks that a
/// transfer's resulting state carries the predicate the address committed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

/// Address scheme prefix.
const ADDRESS_SCHEME: &str = "tess:";

impl Address {
    /// Build an address from a predicate digest.
    pub fn from_digest(digest: &ContentDigest) -> Self {
        Self(format!("{ADDRESS_SCHEME}{}", digest.to_hex()))
    }

    /// Parse and validate an address string.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let hex = s
            .strip_prefix(ADDRESS_SCHEME)
            .ok_or_else(|| ValidationError::MalformedAddress(format!("missing scheme: {s}")))?;
        // Parsing the digest validates length and hex alphabet.
        ContentDigest::from_hex(hex)
            .map_err(|e| ValidationError::MalformedAddress(e.to_string()))?;
        Ok(Self(format!("{ADDRESS_SCHEME}{}", hex.trim().to_lowercase())))
    }

    /// Access the full address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
