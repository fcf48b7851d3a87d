//! # Ownership Status Query
//!
//! Answers "do I still own this token?" for a locally held copy, by
//! querying the ledger for the spend status of the right state and feeding
//! the verified answer through the resolver.
//!
//! ## Which State Gets Queried
//!
//! - With a pending commitment in hand, the question is whether the
//!   *current* state has been spent — by our own commitment (submitted by
//!   the recipient) or a competing one.
//! - Without one, a copy with completed transfers asks about the state its
//!   latest record consumed: an `Included` answer matching that record's
//!   transaction hash confirms the chain; a mismatch means the copy is
//!   stale.
//! - A freshly minted token simply asks about its only state.
//!
//! ## Verification Before Resolution
//!
//! An `Included` claim is only believed if it arrives with a Merkle path
//! that verifies against its own root and records a transaction hash
//! consistent with the claim. A claim that cannot be verified resolves to
//! `Indeterminate`, exactly like an unreachable ledger — never to
//! "spent" and never to "unspent".

use tessera_core::{ContentDigest, RequestId};
use tessera_crypto::{Ed25519PublicKey, ProofOutcome};
use tessera_ledger::LedgerGateway;
use tessera_token::{resolve, LedgerAnswer, OwnershipStatus, Token, TransferCommitment};

use crate::error::TransferError;

/// Resolve the ownership status of a locally held token copy.
///
/// `pending` is the unsubmitted trailing commitment accompanying the copy,
/// if any. The token's proof chain is validated first; a copy that does not
/// validate has no status to resolve.
pub async fn query_ownership<G: LedgerGateway>(
    gateway: &G,
    token: &Token,
    pending: Option<&TransferCommitment>,
) -> Result<OwnershipStatus, TransferError> {
    tessera_token::validate_token(token).map_err(TransferError::InvalidToken)?;

    let (public_key, state_hash) = query_target(token, pending.is_some())?;
    let answer = match gateway.get_status(&public_key, &state_hash).await {
        Ok(resp) if !resp.included => LedgerAnswer::NotIncluded,
        Ok(resp) => verify_included_answer(&resp, &public_key, &state_hash),
        Err(e) => {
            tracing::warn!(error = %e, "ledger unreachable for status query");
            LedgerAnswer::Unavailable
        }
    };

    let view = token.chain_view(pending.is_some())?;
    Ok(resolve(&view, &answer))
}

/// The (key, state hash) pair whose spend status decides this copy's
/// ownership.
fn query_target(
    token: &Token,
    pending: bool,
) -> Result<(Ed25519PublicKey, ContentDigest), TransferError> {
    if !pending {
        if let Some(latest) = token.latest_transfer() {
            return Ok((
                latest.commitment.public_key,
                latest.commitment.source_state_hash,
            ));
        }
    }
    let state_hash = token
        .state
        .digest()
        .map_err(tessera_token::TokenError::from)?;
    Ok((token.state.predicate.public_key, state_hash))
}

/// Verify an `included` response locally before believing it.
fn verify_included_answer(
    resp: &tessera_ledger::InclusionProofResponse,
    public_key: &Ed25519PublicKey,
    state_hash: &ContentDigest,
) -> LedgerAnswer {
    let request_id = RequestId::derive(public_key.as_bytes(), state_hash);
    let Some(proof) = &resp.proof else {
        tracing::warn!(%request_id, "included claim without a proof");
        return LedgerAnswer::Invalid;
    };
    match proof.outcome(request_id.as_bytes()) {
        ProofOutcome::Included(transaction_hash) => {
            if let Some(claimed) = resp.transaction_hash {
                if claimed != transaction_hash {
                    tracing::warn!(%request_id, "proof and claim disagree on transaction hash");
                    return LedgerAnswer::Invalid;
                }
            }
            LedgerAnswer::Included { transaction_hash }
        }
        ProofOutcome::NotIncluded | ProofOutcome::Invalid => {
            tracing::warn!(%request_id, "included claim with a proof that does not verify");
            LedgerAnswer::Invalid
        }
    }
}
