#![deny(missing_docs)]

//! # tessera-crypto — Cryptographic Primitives
//!
//! Provides the cryptographic building blocks for the transfer protocol:
//!
//! - **Ed25519** signing and verification for transfer commitments and
//!   genesis records.
//! - **Sparse Merkle tree** over 256-bit request ids, with inclusion and
//!   non-inclusion proofs. Non-inclusion is a first-class, provable answer —
//!   "this request id is not in the tree" is the normal state of every
//!   currently-owned token and must never look like an error.
//!
//! ## Crate Policy
//!
//! - Depends only on `tessera-core` internally.
//! - Signing input must be `&CanonicalBytes` — you cannot sign raw bytes.
//! - Private keys are never serialized or logged; secret bytes are zeroized
//!   on drop.
//! - `unsafe` prohibited.

pub mod ed25519;
pub mod error;
pub mod smt;

pub use ed25519::{verify_signature, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use error::CryptoError;
pub use smt::{InclusionProof, MerklePath, ProofOutcome, SparseMerkleTree};
