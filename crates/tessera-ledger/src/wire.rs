//! # Wire Types for the Aggregator RPC
//!
//! Request/response shapes shared by every [`crate::LedgerGateway`]
//! implementation. The commitment itself travels verbatim — its own serde
//! form is the submit request body.

use serde::{Deserialize, Serialize};

use tessera_core::ContentDigest;
use tessera_crypto::{Ed25519PublicKey, Ed25519Signature, InclusionProof};

/// Outcome of submitting a commitment, as classified by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// First submission for this request id; the commitment was recorded.
    Accepted,
    /// A byte-identical commitment was already recorded under this request
    /// id. Success for idempotency purposes — proceed to polling.
    Duplicate,
    /// A *different* commitment was already recorded under this request id:
    /// the source state has been spent by another transfer.
    Conflict {
        /// The ledger's stated reason.
        reason: String,
    },
}

/// Wire form of the submit response: `{"status": "...", "reason": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponseBody {
    /// One of `accepted`, `duplicate`, `conflict`.
    pub status: SubmitStatus,
    /// Present on `conflict`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Status discriminant of [`SubmitResponseBody`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitStatus {
    /// Recorded now.
    Accepted,
    /// Already recorded, byte-identical.
    Duplicate,
    /// Already recorded, different payload.
    Conflict,
}

impl SubmitResponseBody {
    /// Classify into the gateway-level outcome.
    pub fn into_outcome(self) -> SubmitOutcome {
        match self.status {
            SubmitStatus::Accepted => SubmitOutcome::Accepted,
            SubmitStatus::Duplicate => SubmitOutcome::Duplicate,
            SubmitStatus::Conflict => SubmitOutcome::Conflict {
                reason: self
                    .reason
                    .unwrap_or_else(|| "request id already spent by a different commitment".into()),
            },
        }
    }
}

/// The ledger's attestation of who authorized a recorded spend.
///
/// Carried alongside an inclusion proof so a verifier can confirm the
/// recorded transaction was authorized by the key the request id was
/// derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Authenticator {
    /// The signer of the recorded commitment.
    pub public_key: Ed25519PublicKey,
    /// The commitment's signature, verbatim.
    pub signature: Ed25519Signature,
    /// The state hash the commitment consumed.
    pub source_state_hash: ContentDigest,
}

/// Response to a proof or status query.
///
/// `included: false` with no authenticator and no transaction hash is the
/// **normal** unspent response, not an error. The proof may be absent when
/// the ledger has not yet generated one (polling will observe it later);
/// when present it is verified locally against its own root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InclusionProofResponse {
    /// Whether the request id is recorded as spent.
    pub included: bool,
    /// The recorded transaction hash, when included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<ContentDigest>,
    /// The spend authenticator, when included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator: Option<Authenticator>,
    /// Merkle path and root, when the ledger has generated one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<InclusionProof>,
}

impl InclusionProofResponse {
    /// The "not yet in the tree" response used when the transport layer
    /// reports the proof as not found.
    pub fn not_included() -> Self {
        Self {
            included: false,
            transaction_hash: None,
            authenticator: None,
            proof: None,
        }
    }
}
