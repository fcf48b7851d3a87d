//! # Transfer Commitment
//!
//! The pre-signed transfer authorization at the center of the offline
//! handoff. The current owner builds and signs it while offline; the
//! recipient later submits it verbatim. Nothing in it can be re-signed or
//! amended by anyone but the original owner, and nothing in it needs to be:
//! the artifact is complete at creation time.

use serde::{Deserialize, Serialize};

use tessera_core::{
    sha256_digest, Address, CanonicalBytes, CanonicalizationError, ContentDigest, RequestId, Salt,
};
use tessera_crypto::{Ed25519PublicKey, Ed25519Signature};

/// The canonical payload a commitment signature covers.
///
/// Field order is irrelevant — canonicalization sorts keys — but every
/// field that the transfer semantics depend on must be in here, and the
/// signature covers nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitmentPayload {
    /// Digest of the state being consumed.
    pub source_state_hash: ContentDigest,
    /// Address committing to the recipient's predicate.
    pub recipient: Address,
    /// Random salt keeping payloads distinguishable.
    pub salt: Salt,
    /// Digest the recipient's state data must hash to, if data is carried.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_data_hash: Option<ContentDigest>,
    /// Free-form transfer message, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A signed, self-contained transfer authorization.
///
/// Invariant: `public_key` is the key of the predicate guarding the source
/// state — the current owner, never the recipient. `request_id` is the
/// derivation of `(public_key, source_state_hash)` and is recomputed, not
/// trusted, by every verifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferCommitment {
    /// The ledger key this commitment will be recorded under.
    pub request_id: RequestId,
    /// Digest of the state being consumed.
    pub source_state_hash: ContentDigest,
    /// Address committing to the recipient's predicate.
    pub recipient: Address,
    /// Random salt from the payload.
    pub salt: Salt,
    /// Bound recipient data digest, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_data_hash: Option<ContentDigest>,
    /// Free-form transfer message, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The owner's signature over the canonical payload.
    pub signature: Ed25519Signature,
    /// The owner's public key — the signer.
    pub public_key: Ed25519PublicKey,
}

impl TransferCommitment {
    /// The payload this commitment's signature covers.
    pub fn payload(&self) -> CommitmentPayload {
        CommitmentPayload {
            source_state_hash: self.source_state_hash,
            recipient: self.recipient.clone(),
            salt: self.salt,
            recipient_data_hash: self.recipient_data_hash,
            message: self.message.clone(),
        }
    }

    /// Canonical bytes of the signed payload.
    pub fn payload_bytes(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        CanonicalBytes::new(&self.payload())
    }

    /// Canonical bytes of the whole commitment, signature included.
    ///
    /// Two commitments are "the same submission" exactly when these bytes
    /// are equal — the ledger's duplicate-vs-conflict decision and the
    /// transaction hash both key off them.
    pub fn canonical_bytes(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        CanonicalBytes::new(self)
    }

    /// The transaction hash the ledger records for this commitment.
    pub fn transaction_hash(&self) -> Result<ContentDigest, CanonicalizationError> {
        Ok(sha256_digest(&self.canonical_bytes()?))
    }

    /// Recompute the request id from the signer key and source state hash.
    pub fn derived_request_id(&self) -> RequestId {
        RequestId::derive(self.public_key.as_bytes(), &self.source_state_hash)
    }
}
