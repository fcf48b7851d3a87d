//! # Token Error Types
//!
//! Structured errors for token model construction and proof-chain
//! validation. Every validation failure is a protocol violation — fatal and
//! non-retryable — as opposed to the transient transport errors of the
//! ledger client, which live in `tessera-ledger`.

use thiserror::Error;

use tessera_core::{CanonicalizationError, ContentDigest};
use tessera_crypto::CryptoError;

/// Errors from token construction and proof-chain validation.
#[derive(Error, Debug)]
pub enum TokenError {
    /// The genesis record's signature does not verify under the genesis
    /// predicate key.
    #[error("genesis signature invalid: {0}")]
    GenesisSignature(String),

    /// A commitment's source state hash does not match the state it is
    /// chained onto.
    #[error("source state mismatch: commitment consumes {actual}, chain state is {expected}")]
    SourceStateMismatch {
        /// Digest of the state the chain actually holds at this point.
        expected: ContentDigest,
        /// Digest the commitment claims to consume.
        actual: ContentDigest,
    },

    /// A commitment's signer key is not the key of the predicate guarding
    /// the consumed state.
    #[error("commitment signer {signer} does not match source state predicate {predicate}")]
    SignerMismatch {
        /// Hex of the key that signed the commitment.
        signer: String,
        /// Hex of the predicate key of the consumed state.
        predicate: String,
    },

    /// A commitment's signature does not verify over its payload.
    #[error("commitment signature invalid: {0}")]
    SignatureInvalid(String),

    /// A commitment's request id is not the derivation of its own signer
    /// key and source state hash.
    #[error("request id does not match derive(public_key, source_state_hash)")]
    RequestIdMismatch,

    /// A transfer's resulting state carries a predicate that does not match
    /// the committed recipient address.
    #[error("recipient address mismatch: committed {committed}, state predicate derives {derived}")]
    RecipientMismatch {
        /// Address named in the commitment.
        committed: String,
        /// Address derived from the new state's predicate.
        derived: String,
    },

    /// The recipient data carried by a state does not match the data hash
    /// bound into the commitment.
    #[error("recipient data binding violated: {0}")]
    DataBinding(String),

    /// A completed transfer record's inclusion proof is absent, malformed,
    /// or does not prove inclusion of the record's transaction hash.
    #[error("inclusion proof for transfer record does not verify: {0}")]
    ProofInvalid(String),

    /// The token's current state is not the state reached by replaying the
    /// provenance chain.
    #[error("token state is not the replay of its provenance chain")]
    StateMismatch,

    /// A failure localized to one transfer record of the chain.
    #[error("transfer record {index}: {source}")]
    Record {
        /// Zero-based index of the offending record.
        index: usize,
        /// The underlying failure.
        source: Box<TokenError>,
    },

    /// Canonicalization of a payload failed.
    #[error(transparent)]
    Canonicalization(#[from] CanonicalizationError),

    /// An underlying cryptographic operation failed structurally (bad key
    /// bytes, bad hex) — distinct from a verification failure.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl TokenError {
    /// Wrap an error with the index of the transfer record it occurred in.
    pub fn at_record(index: usize, source: TokenError) -> Self {
        TokenError::Record {
            index,
            source: Box::new(source),
        }
    }
}
