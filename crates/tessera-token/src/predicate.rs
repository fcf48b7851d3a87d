//! # Owner Predicate
//!
//! The unlock condition a token state carries: the Ed25519 public key whose
//! holder may consume the state. A transaction consuming the state must be
//! signed by the matching private key.

use serde::{Deserialize, Serialize};

use tessera_core::{sha256_raw, Address, ContentDigest};
use tessera_crypto::Ed25519PublicKey;

/// Domain separation prefix for address derivation.
const ADDRESS_DOMAIN: u8 = 0x02;

/// The ownership condition embedded in a [`crate::TokenState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerPredicate {
    /// The key whose holder owns the state.
    pub public_key: Ed25519PublicKey,
}

impl OwnerPredicate {
    /// Create a predicate owned by the given key.
    pub fn new(public_key: Ed25519PublicKey) -> Self {
        Self { public_key }
    }

    /// Derive the address that commits to this predicate:
    /// `tess:` + hex(`SHA256(0x02 ‖ public_key)`).
    pub fn address(&self) -> Address {
        let mut input = Vec::with_capacity(1 + 32);
        input.push(ADDRESS_DOMAIN);
        input.extend_from_slice(self.public_key.as_bytes());
        Address::from_digest(&ContentDigest::from_bytes(sha256_raw(&input)))
    }

    /// Whether `signer` is the key this predicate requires.
    pub fn matches_signer(&self, signer: &Ed25519PublicKey) -> bool {
        &self.public_key == signer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_crypto::Ed25519KeyPair;

    #[test]
    fn address_is_deterministic_per_key() {
        let keys = Ed25519KeyPair::generate();
        let p = OwnerPredicate::new(keys.public_key());
        assert_eq!(p.address(), p.address());
    }

    #[test]
    fn distinct_keys_distinct_addresses() {
        let a = OwnerPredicate::new(Ed25519KeyPair::generate().public_key());
        let b = OwnerPredicate::new(Ed25519KeyPair::generate().public_key());
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn matches_signer_compares_keys() {
        let keys = Ed25519KeyPair::generate();
        let other = Ed25519KeyPair::generate();
        let p = OwnerPredicate::new(keys.public_key());
        assert!(p.matches_signer(&keys.public_key()));
        assert!(!p.matches_signer(&other.public_key()));
    }
}
