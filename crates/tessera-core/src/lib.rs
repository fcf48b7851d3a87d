#![deny(missing_docs)]

//! # tessera-core — Foundational Types for Tessera
//!
//! This crate defines the types that every other crate in the workspace
//! depends on. It has no internal crate dependencies — only `serde`,
//! `serde_json`, `thiserror`, `chrono`, `sha2`, and `rand_core` from the
//! external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** Every identifier is a
//!    distinct type. You cannot pass a [`TokenId`] where a [`RequestId`]
//!    is expected.
//!
//! 2. **[`CanonicalBytes`] is the sole path to digest computation.** Every
//!    byte sequence that gets hashed or signed in the stack flows through
//!    `CanonicalBytes::new()`, which applies JCS-compatible canonicalization.
//!    Two parties that agree on a value agree on its digest, which is what
//!    makes offline pre-signed commitments submittable by someone who never
//!    held the signing key.
//!
//! 3. **Deterministic [`RequestId`] derivation.** A request id is
//!    `sha256(public_key ‖ state_digest)` — the same (key, state) pair always
//!    derives the same id, which is the anchor for the ledger's
//!    first-writer-wins and duplicate-detection semantics.
//!
//! 4. **Structured errors with `thiserror`.** No `Box<dyn Error>`, no
//!    `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_raw, ContentDigest};
pub use error::{CanonicalizationError, ValidationError};
pub use identity::{Address, RequestId, Salt, TokenId, TokenTypeId};
