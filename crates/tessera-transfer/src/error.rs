//! # Transfer Protocol Errors
//!
//! Three error families with sharply different consequences:
//!
//! - [`TransferError`] — building a commitment failed. Local, fatal.
//! - [`PackageDefect`] — an offline package is structurally or
//!   cryptographically bad. Fatal, non-retryable: the package must be
//!   re-issued by the sender, the ledger is never consulted.
//! - [`SubmitError`] — redeeming a package failed. Some variants are final
//!   verdicts (`AlreadySpent`, `Rejected`), some are retryable conditions
//!   (`Timeout`, `Ledger`). Callers must not collapse these.

use std::time::Duration;

use thiserror::Error;

use tessera_ledger::LedgerError;
use tessera_token::TokenError;

/// Errors from building a transfer commitment.
#[derive(Error, Debug)]
pub enum TransferError {
    /// The token's own proof chain does not validate; no commitment may be
    /// built from it.
    #[error("token proof chain invalid: {0}")]
    InvalidToken(#[source] TokenError),

    /// The signing key is not the key of the current state's predicate.
    #[error("signing key {signer} does not own the current state (predicate key {predicate})")]
    NotTokenOwner {
        /// Hex of the key offered for signing.
        signer: String,
        /// Hex of the current predicate key.
        predicate: String,
    },

    /// A payload failed to canonicalize or sign.
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Structural or cryptographic defects of an offline package.
///
/// Every variant is a protocol violation: detected entirely locally,
/// reported without consulting the ledger, and never retried.
#[derive(Error, Debug)]
pub enum PackageDefect {
    /// The enclosed token's proof chain does not validate (bad genesis
    /// signature, broken chain linkage, missing or unverifiable inclusion
    /// proof on a completed record, doctored current state).
    #[error("enclosed token invalid: {0}")]
    Chain(#[source] TokenError),

    /// The pending commitment does not verify against the enclosed token's
    /// current state — wrong source state hash, wrong signer, tampered
    /// request id, or bad signature.
    #[error("pending commitment invalid: {0}")]
    Pending(#[source] TokenError),

    /// The package bytes do not decode as a package.
    #[error("package does not decode: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Reading or writing the package file failed.
    #[error("package file i/o: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from submitting an offline package for redemption.
#[derive(Error, Debug)]
pub enum SubmitError {
    /// The package failed validation before anything was sent.
    #[error(transparent)]
    Package(#[from] PackageDefect),

    /// The pending commitment is addressed to a different recipient than
    /// the key pair presented for redemption.
    #[error("package is addressed to {committed}, presented key derives {derived}")]
    NotAddressedToRecipient {
        /// Address the sender committed to.
        committed: String,
        /// Address derived from the presented key.
        derived: String,
    },

    /// The recipient data offered at redemption does not satisfy the data
    /// hash bound into the commitment.
    #[error("recipient data binding violated: {0}")]
    DataBinding(String),

    /// A *different* commitment consuming the same source state is already
    /// recorded. Final: this transfer lost the race and can never complete.
    #[error("source state already spent by a different commitment: {reason}")]
    AlreadySpent {
        /// The ledger's stated reason.
        reason: String,
    },

    /// The ledger rejected the commitment as a protocol violation.
    #[error("ledger rejected the commitment (status {status}): {body}")]
    Rejected {
        /// HTTP-style status the ledger answered with.
        status: u16,
        /// The rejection body.
        body: String,
    },

    /// The inclusion proof did not appear within the polling deadline.
    /// Retryable: resubmission of the identical package is idempotent.
    #[error("no inclusion proof after {waited:?}; resubmit later")]
    Timeout {
        /// How long the submitter polled before giving up.
        waited: Duration,
    },

    /// The ledger could not be reached to submit. Retryable.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Assembling the completed transfer record failed.
    #[error(transparent)]
    Token(#[from] TokenError),
}
