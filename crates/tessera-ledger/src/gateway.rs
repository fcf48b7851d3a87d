//! # Ledger Gateway Trait
//!
//! The seam between the transfer protocol and any ledger implementation.
//! The commitment submitter and the ownership status query are generic over
//! this trait so they run identically against the HTTP client and the
//! in-process ledger.

use tessera_core::{ContentDigest, RequestId};
use tessera_crypto::Ed25519PublicKey;
use tessera_token::TransferCommitment;

use crate::error::LedgerError;
use crate::wire::{InclusionProofResponse, SubmitOutcome};

/// The three-operation RPC contract of the ledger.
///
/// Each operation is independently retryable. Implementations must
/// guarantee atomic first-writer-wins per request id for
/// [`submit_commitment`](LedgerGateway::submit_commitment): among
/// concurrent submissions of distinct commitments with the same request id,
/// exactly one observes `Accepted`; the rest observe `Conflict` (or
/// `Duplicate` when byte-identical).
#[allow(async_fn_in_trait)]
pub trait LedgerGateway {
    /// Submit a pre-signed commitment for recording.
    async fn submit_commitment(
        &self,
        commitment: &TransferCommitment,
    ) -> Result<SubmitOutcome, LedgerError>;

    /// Fetch the inclusion proof (or non-inclusion answer) for a request id.
    ///
    /// "Proof not yet generated" is `Ok` with `included: false` — never an
    /// error.
    async fn get_inclusion_proof(
        &self,
        request_id: &RequestId,
    ) -> Result<InclusionProofResponse, LedgerError>;

    /// Fetch the spend status of `(public_key, state_hash)` — the same
    /// query as [`get_inclusion_proof`](LedgerGateway::get_inclusion_proof)
    /// keyed by the derived request id, usable without holding a
    /// commitment.
    async fn get_status(
        &self,
        public_key: &Ed25519PublicKey,
        state_hash: &ContentDigest,
    ) -> Result<InclusionProofResponse, LedgerError>;
}
