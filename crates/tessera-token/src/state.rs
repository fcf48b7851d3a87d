//! # Token State
//!
//! A token's state is a predicate (who may consume it) plus opaque state
//! data. The state digest — computed over the canonical serialization of
//! both — is what a transfer commitment consumes and what request ids are
//! derived from.

use serde::{Deserialize, Serialize};

use tessera_core::{sha256_digest, CanonicalBytes, CanonicalizationError, ContentDigest};

use crate::predicate::OwnerPredicate;

/// The current state of a token: ownership condition plus opaque data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenState {
    /// The unlock condition for this state.
    pub predicate: OwnerPredicate,
    /// Opaque application data bound into the state, if any. Must not
    /// contain floats (canonicalization rejects them).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl TokenState {
    /// Create a state with no attached data.
    pub fn new(predicate: OwnerPredicate) -> Self {
        Self {
            predicate,
            data: None,
        }
    }

    /// Create a state carrying opaque data.
    pub fn with_data(predicate: OwnerPredicate, data: serde_json::Value) -> Self {
        Self {
            predicate,
            data: Some(data),
        }
    }

    /// The canonical digest of this state. This is the `stateHash` that
    /// request ids are derived from and that commitments consume.
    pub fn digest(&self) -> Result<ContentDigest, CanonicalizationError> {
        Ok(sha256_digest(&CanonicalBytes::new(self)?))
    }

    /// The canonical digest of the attached data alone, if any. Used to
    /// check the `recipient_data_hash` binding of a commitment.
    pub fn data_digest(&self) -> Result<Option<ContentDigest>, CanonicalizationError> {
        match &self.data {
            Some(data) => Ok(Some(sha256_digest(&CanonicalBytes::new(data)?))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tessera_crypto::Ed25519KeyPair;

    #[test]
    fn digest_covers_predicate_and_data() {
        let predicate = OwnerPredicate::new(Ed25519KeyPair::generate().public_key());
        let bare = TokenState::new(predicate.clone());
        let with_data = TokenState::with_data(predicate, json!({"unit": "kg", "qty": 3}));
        assert_ne!(bare.digest().unwrap(), with_data.digest().unwrap());
    }

    #[test]
    fn digest_is_stable_across_serde() {
        let predicate = OwnerPredicate::new(Ed25519KeyPair::generate().public_key());
        let state = TokenState::with_data(predicate, json!({"b": 1, "a": 2}));
        let json = serde_json::to_string(&state).unwrap();
        let back: TokenState = serde_json::from_str(&json).unwrap();
        assert_eq!(state.digest().unwrap(), back.digest().unwrap());
    }
}
