#![deny(missing_docs)]

//! # tessera-transfer — The Offline Transfer Protocol
//!
//! The four protocol operations on top of the token model and the ledger
//! gateway:
//!
//! - [`build_commitment`] — the current owner signs a transfer while fully
//!   offline.
//! - [`OfflinePackage`] — the self-contained artifact (token + pending
//!   commitment) handed to the recipient out of band, with local-only
//!   validation.
//! - [`Submitter`] — the recipient redeems the package: submit verbatim,
//!   poll for the inclusion proof, append the completed record.
//! - [`query_ownership`] — resolve a held copy's ownership status against
//!   a fresh, locally verified ledger answer.
//!
//! The protocol's safety rests on two facts enforced below and in
//! `tessera-token`: only the current owner's key can produce a commitment
//! the ledger will accept, and only one commitment per source state can
//! ever be recorded.

pub mod commitment;
pub mod error;
pub mod package;
pub mod status;
pub mod submit;

pub use commitment::{build_commitment, TransferOptions};
pub use error::{PackageDefect, SubmitError, TransferError};
pub use package::OfflinePackage;
pub use status::query_ownership;
pub use submit::{PollPolicy, Submitter};
