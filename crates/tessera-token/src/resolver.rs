//! # Ownership State Resolver
//!
//! Classifies a token's ownership status from two inputs: a snapshot of the
//! local provenance chain ([`ChainView`]) and a fresh ledger answer
//! ([`LedgerAnswer`]). The resolver is a pure function — no cached status
//! anywhere in the system, recomputed on demand — and every input
//! combination maps to exactly one [`OwnershipStatus`].
//!
//! ## Transition Table
//!
//! | ledger answer | pending commitment | latest tx matches | → status |
//! |---|---|---|---|
//! | NotIncluded | false | — | Current |
//! | NotIncluded | true | — | PendingTransfer |
//! | Included | — | yes | Confirmed |
//! | Included | — | no | Outdated |
//! | Invalid | — | — | Indeterminate |
//! | Unavailable | — | — | Indeterminate |
//!
//! The two `Indeterminate` rows are the ones that protect correctness under
//! degraded conditions: a proof that fails verification and a ledger that
//! cannot be reached both mean "no conclusion" — never "spent", never
//! "unspent", and never "the token is bad".

use serde::{Deserialize, Serialize};

use tessera_core::ContentDigest;

/// A token's ownership status as resolved against the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipStatus {
    /// The local state is unspent and no transfer is in flight. Building a
    /// new commitment is permitted.
    Current,
    /// The local state has been consumed by a transfer this copy does not
    /// record as its latest. The copy is stale; refresh it from the party
    /// holding the confirmed successor state.
    Outdated,
    /// An unsubmitted trailing commitment accompanies this copy; the state
    /// is not yet spent on the ledger. Building a replacement commitment is
    /// permitted (only one can ever win).
    PendingTransfer,
    /// The ledger records exactly the transfer this copy holds as its
    /// latest. The chain is complete through the last hop.
    Confirmed,
    /// No conclusion could be drawn — the ledger was unreachable or its
    /// proof did not verify. Not a validation failure of the token; retry
    /// later.
    Indeterminate,
}

impl OwnershipStatus {
    /// Whether building a new transfer commitment from the local state is
    /// permitted in this status.
    pub fn permits_transfer(&self) -> bool {
        matches!(self, Self::Current | Self::PendingTransfer)
    }
}

impl std::fmt::Display for OwnershipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Current => "current",
            Self::Outdated => "outdated",
            Self::PendingTransfer => "pending-transfer",
            Self::Confirmed => "confirmed",
            Self::Indeterminate => "indeterminate",
        };
        f.write_str(s)
    }
}

/// The ledger's answer to "is this spend recorded", after local proof
/// verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerAnswer {
    /// The spend is recorded, with the transaction hash the ledger holds.
    Included {
        /// The recorded transaction hash.
        transaction_hash: ContentDigest,
    },
    /// The spend is provably not recorded. The normal answer for every
    /// currently-owned token — not an error.
    NotIncluded,
    /// The ledger responded but its proof failed verification.
    Invalid,
    /// The ledger could not be reached (transport failure).
    Unavailable,
}

/// Snapshot of the local provenance chain for resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainView {
    /// Whether an unsubmitted trailing commitment accompanies this copy.
    pub pending_commitment: bool,
    /// Transaction hash of the latest completed local transfer, if any.
    pub latest_transaction_hash: Option<ContentDigest>,
}

/// Resolve ownership status from a chain snapshot and a ledger answer.
pub fn resolve(view: &ChainView, answer: &LedgerAnswer) -> OwnershipStatus {
    let status = match answer {
        LedgerAnswer::NotIncluded => {
            if view.pending_commitment {
                OwnershipStatus::PendingTransfer
            } else {
                OwnershipStatus::Current
            }
        }
        LedgerAnswer::Included { transaction_hash } => {
            if view.latest_transaction_hash.as_ref() == Some(transaction_hash) {
                OwnershipStatus::Confirmed
            } else {
                OwnershipStatus::Outdated
            }
        }
        LedgerAnswer::Invalid | LedgerAnswer::Unavailable => OwnershipStatus::Indeterminate,
    };
    tracing::debug!(?answer, ?view, %status, "resolved ownership status");
    status
}
