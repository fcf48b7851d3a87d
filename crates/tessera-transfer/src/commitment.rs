//! # Commitment Builder
//!
//! Builds and signs a transfer commitment from a locally held token. Fully
//! offline: no ledger round trip, no network dependency of any kind. The
//! resulting artifact is complete at creation time — the recipient submits
//! it verbatim, amending nothing.

use tessera_core::{Address, ContentDigest, RequestId, Salt};
use tessera_crypto::Ed25519KeyPair;
use tessera_token::{validate_token, CommitmentPayload, Token, TransferCommitment};

use crate::error::TransferError;

/// Optional bindings carried by a commitment.
#[derive(Debug, Clone, Default)]
pub struct TransferOptions {
    /// Payload salt; freshly random when not supplied.
    pub salt: Option<Salt>,
    /// Digest the recipient's new state data must hash to. When set, the
    /// ledger-recorded transfer can only complete with data matching it.
    pub recipient_data_hash: Option<ContentDigest>,
    /// Free-form message to the recipient.
    pub message: Option<String>,
}

/// Build and sign a commitment transferring `token` to `recipient`.
///
/// Validates the token's full proof chain first — a commitment is never
/// built over a chain that does not check out — then requires `keypair` to
/// be the current state predicate's key. With the default random salt,
/// rebuilding a commitment for the same transfer produces a distinct
/// artifact with the *same* request id, which the ledger will classify as a
/// conflict if both are ever submitted.
pub fn build_commitment(
    keypair: &Ed25519KeyPair,
    token: &Token,
    recipient: Address,
    options: TransferOptions,
) -> Result<TransferCommitment, TransferError> {
    validate_token(token).map_err(TransferError::InvalidToken)?;

    let signer = keypair.public_key();
    if !token.state.predicate.matches_signer(&signer) {
        return Err(TransferError::NotTokenOwner {
            signer: signer.to_hex(),
            predicate: token.state.predicate.public_key.to_hex(),
        });
    }

    let source_state_hash = token.state.digest().map_err(tessera_token::TokenError::from)?;
    let payload = CommitmentPayload {
        source_state_hash,
        recipient,
        salt: options.salt.unwrap_or_else(Salt::random),
        recipient_data_hash: options.recipient_data_hash,
        message: options.message,
    };
    let signature = keypair.sign(
        &tessera_core::CanonicalBytes::new(&payload).map_err(tessera_token::TokenError::from)?,
    );

    let commitment = TransferCommitment {
        request_id: RequestId::derive(signer.as_bytes(), &source_state_hash),
        source_state_hash,
        recipient: payload.recipient,
        salt: payload.salt,
        recipient_data_hash: payload.recipient_data_hash,
        message: payload.message,
        signature,
        public_key: signer,
    };
    tracing::debug!(
        token_id = %token.id(),
        request_id = %commitment.request_id,
        recipient = %commitment.recipient,
        "built transfer commitment"
    );
    Ok(commitment)
}
