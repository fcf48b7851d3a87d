#![deny(missing_docs)]

//! # tessera-ledger — Ledger Gateway
//!
//! The narrow RPC boundary between the transfer protocol and the ledger
//! service: submit a commitment, fetch an inclusion proof by request id,
//! fetch the spend status of a (public key, state hash) pair. Pure I/O plus
//! retry policy — no business logic.
//!
//! ## The One Rule That Matters
//!
//! A transport-level "not found" for a proof means the request id is not
//! (yet) in the tree. That is the **normal** answer for every
//! currently-owned token, and it maps to a `NotIncluded` response — never
//! to an error. Errors are reserved for genuine transport failures
//! (connection refused, malformed response, timeout). Conflating the two
//! would make every unspent token look failed.
//!
//! ## Implementations
//!
//! - [`HttpLedgerClient`] — typed reqwest client for the aggregator HTTP
//!   API, with bounded retry on connect/timeout errors.
//! - [`InMemoryLedger`] — in-process ledger with the same atomic
//!   first-writer-wins semantics, backed by the sparse Merkle tree; used by
//!   tests and local development, with optional fault injection.

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod memory;
pub(crate) mod retry;
pub mod wire;

pub use config::{ConfigError, LedgerConfig};
pub use error::LedgerError;
pub use gateway::LedgerGateway;
pub use http::HttpLedgerClient;
pub use memory::InMemoryLedger;
pub use wire::{Authenticator, InclusionProofResponse, SubmitOutcome};
