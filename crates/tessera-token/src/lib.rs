#![deny(missing_docs)]

//! # tessera-token — Token Model and Ownership Semantics
//!
//! Defines the token data model (genesis record, transfer records, states,
//! owner predicates), the transfer commitment artifact, the full proof-chain
//! validator, and the ownership state resolver.
//!
//! ## The Central Authenticity Invariant
//!
//! A [`TransferCommitment`] must be signed by the key matching the predicate
//! of the state it consumes — the *current owner's* key, never the
//! recipient's. A commitment manufactured with any other key fails
//! verification against the source state's predicate, both locally
//! ([`verify_commitment`]) and at the ledger. Everything else in the
//! protocol leans on this.
//!
//! ## The Resolver
//!
//! [`resolver::resolve()`] is a pure function of a local chain snapshot and
//! a fresh ledger answer — no cached status anywhere. Every input
//! combination maps to exactly one [`OwnershipStatus`].

pub mod commitment;
pub mod error;
pub mod predicate;
pub mod resolver;
pub mod state;
pub mod token;
pub mod validate;

pub use commitment::{CommitmentPayload, TransferCommitment};
pub use error::TokenError;
pub use predicate::OwnerPredicate;
pub use resolver::{resolve, ChainView, LedgerAnswer, OwnershipStatus};
pub use state::TokenState;
pub use token::{GenesisRecord, Token, TransferRecord};
pub use validate::{validate_token, verify_commitment};
