//! # Proof-Chain Validator
//!
//! Structural and cryptographic validation of a token's entire provenance
//! chain: the genesis record and every transfer record. Invoked before a
//! new commitment is built and before a received package is accepted.
//!
//! Validation failures are protocol violations — fatal, non-retryable, and
//! reported with the index of the offending record. They are never produced
//! by network conditions; a token that cannot be *checked* because the
//! ledger is unreachable resolves to `Indeterminate` elsewhere, it does not
//! fail here.

use tessera_crypto::{verify_signature, ProofOutcome};

use crate::commitment::TransferCommitment;
use crate::error::TokenError;
use crate::state::TokenState;
use crate::token::{Token, TransferRecord};

/// Verify a commitment against the state it claims to consume.
///
/// Checks, in order:
/// 1. the source state hash matches the given state's digest;
/// 2. the signer key is the state predicate's key (the central authenticity
///    invariant — the *owner* signs, never the recipient);
/// 3. the request id is the derivation of (signer key, source state hash);
/// 4. the signature verifies over the canonical payload.
pub fn verify_commitment(
    commitment: &TransferCommitment,
    source_state: &TokenState,
) -> Result<(), TokenError> {
    let expected = source_state.digest()?;
    if commitment.source_state_hash != expected {
        return Err(TokenError::SourceStateMismatch {
            expected,
            actual: commitment.source_state_hash,
        });
    }
    if !source_state.predicate.matches_signer(&commitment.public_key) {
        return Err(TokenError::SignerMismatch {
            signer: commitment.public_key.to_hex(),
            predicate: source_state.predicate.public_key.to_hex(),
        });
    }
    if commitment.request_id != commitment.derived_request_id() {
        return Err(TokenError::RequestIdMismatch);
    }
    let payload = commitment.payload_bytes()?;
    verify_signature(&commitment.signature, &payload, &commitment.public_key)
        .map_err(|e| TokenError::SignatureInvalid(e.to_string()))
}

/// Verify the bindings a transfer record adds on top of its commitment:
/// the recipient address commits to the new state's predicate, and the
/// recipient data hash (if bound) matches the new state's data.
fn verify_record_bindings(record: &TransferRecord) -> Result<(), TokenError> {
    let derived = record.new_state.predicate.address();
    if record.commitment.recipient != derived {
        return Err(TokenError::RecipientMismatch {
            committed: record.commitment.recipient.to_string(),
            derived: derived.to_string(),
        });
    }
    match (
        &record.commitment.recipient_data_hash,
        record.new_state.data_digest()?,
    ) {
        (Some(bound), Some(actual)) if *bound == actual => Ok(()),
        (Some(_), Some(_)) => Err(TokenError::DataBinding(
            "state data does not hash to the committed recipient data hash".into(),
        )),
        (Some(_), None) => Err(TokenError::DataBinding(
            "commitment binds recipient data but the state carries none".into(),
        )),
        (None, Some(_)) => Err(TokenError::DataBinding(
            "state carries data the commitment never bound".into(),
        )),
        (None, None) => Ok(()),
    }
}

/// Verify a record's inclusion proof: the path must prove, against its own
/// root, that the record's request id maps to the record's transaction hash.
fn verify_record_proof(record: &TransferRecord) -> Result<(), TokenError> {
    let expected_tx = record.transaction_hash()?;
    match record
        .inclusion_proof
        .outcome(record.commitment.request_id.as_bytes())
    {
        ProofOutcome::Included(value) if value == expected_tx => Ok(()),
        ProofOutcome::Included(value) => Err(TokenError::ProofInvalid(format!(
            "proof records transaction {value}, expected {expected_tx}"
        ))),
        ProofOutcome::NotIncluded => Err(TokenError::ProofInvalid(
            "proof shows the request id as not recorded".into(),
        )),
        ProofOutcome::Invalid => Err(TokenError::ProofInvalid(
            "path does not commit to its root".into(),
        )),
    }
}

/// Validate a token's full proof chain.
///
/// Genesis signature, then per record: chain linkage, commitment
/// verification, recipient and data bindings, inclusion proof. Finally the
/// current state must equal the replayed end of the chain.
pub fn validate_token(token: &Token) -> Result<(), TokenError> {
    token.genesis.verify()?;

    let mut current = &token.genesis.state;
    for (index, record) in token.transfers.iter().enumerate() {
        verify_commitment(&record.commitment, current)
            .map_err(|e| TokenError::at_record(index, e))?;
        verify_record_bindings(record).map_err(|e| TokenError::at_record(index, e))?;
        verify_record_proof(record).map_err(|e| TokenError::at_record(index, e))?;
        current = &record.new_state;
    }

    if &token.state != current {
        return Err(TokenError::StateMismatch);
    }
    tracing::debug!(token_id = %token.id(), transfers = token.transfers.len(), "proof chain valid");
    Ok(())
}
