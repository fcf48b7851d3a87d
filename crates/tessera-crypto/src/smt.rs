//! # Sparse Merkle Tree
//!
//! A binary sparse Merkle tree over 256-bit keys (request ids), supporting
//! compact proofs of both inclusion and non-inclusion. The ledger records a
//! state spend under its request id; a proof against the tree root therefore
//! answers "has this state been consumed" with cryptographic weight in both
//! directions.
//!
//! ## Hashing (Domain Separation)
//!
//! - Occupied leaf: `SHA256(0x00 ‖ key ‖ value)`.
//! - Empty leaf: the all-zero digest.
//! - Node: `SHA256(0x01 ‖ left ‖ right)`.
//!
//! ## Proof Semantics
//!
//! [`MerklePath::verify()`] returns a three-valued [`ProofOutcome`]:
//! `Included` (the key is in the tree, with its recorded value),
//! `NotIncluded` (a valid path to an empty leaf), or `Invalid` (the path
//! does not commit to the given root). `NotIncluded` is a normal answer —
//! it is what every unspent state looks like — and is strictly distinct
//! from `Invalid`, which indicates a malformed or mismatched proof.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use tessera_core::{sha256_raw, ContentDigest};

use crate::error::CryptoError;

/// Tree depth in bits. Keys are 32 bytes.
const DEPTH: usize = 256;

/// Hash of an occupied leaf: `SHA256(0x00 ‖ key ‖ value)`.
fn leaf_hash(key: &[u8; 32], value: &ContentDigest) -> [u8; 32] {
    let mut input = Vec::with_capacity(1 + 32 + 32);
    input.push(0x00);
    input.extend_from_slice(key);
    input.extend_from_slice(value.as_bytes());
    sha256_raw(&input)
}

/// Hash of an interior node: `SHA256(0x01 ‖ left ‖ right)`.
fn node_hash(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut input = Vec::with_capacity(1 + 32 + 32);
    input.push(0x01);
    input.extend_from_slice(left);
    input.extend_from_slice(right);
    sha256_raw(&input)
}

/// Bit `i` of a 32-byte key, counting from the most significant bit.
fn bit_at(key: &[u8; 32], i: usize) -> u8 {
    (key[i / 8] >> (7 - (i % 8))) & 1
}

/// Precomputed hashes of empty subtrees, indexed by height.
///
/// `defaults()[0]` is the empty leaf; `defaults()[h]` is an empty subtree
/// of height `h`.
fn defaults() -> &'static [[u8; 32]; DEPTH + 1] {
    static DEFAULTS: OnceLock<[[u8; 32]; DEPTH + 1]> = OnceLock::new();
    DEFAULTS.get_or_init(|| {
        let mut table = [[0u8; 32]; DEPTH + 1];
        for h in 1..=DEPTH {
            let below = table[h - 1];
            table[h] = node_hash(&below, &below);
        }
        table
    })
}

// ---------------------------------------------------------------------------
// ProofOutcome
// ---------------------------------------------------------------------------

/// The three-valued result of verifying a Merkle path against a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofOutcome {
    /// The key is recorded in the tree with the given value.
    Included(ContentDigest),
    /// The key is provably absent from the tree. This is the normal answer
    /// for an unspent state, not an error.
    NotIncluded,
    /// The path is malformed or does not commit to the given root. No
    /// conclusion about inclusion may be drawn.
    Invalid,
}

// ---------------------------------------------------------------------------
// MerklePath
// ---------------------------------------------------------------------------

/// A sibling path from a leaf to the root of the sparse Merkle tree.
///
/// `leaf` is `Some(value)` for an inclusion path and `None` for a
/// non-inclusion path (the path then terminates in the empty leaf).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerklePath {
    /// Sibling hashes in leaf-to-root order; exactly 256 entries.
    pub siblings: Vec<ContentDigest>,
    /// The leaf value, when the key is present in the tree.
    pub leaf: Option<ContentDigest>,
}

impl MerklePath {
    /// Verify this path for `key` against `expected_root`.
    ///
    /// Never panics on malformed input; structural defects yield
    /// [`ProofOutcome::Invalid`].
    pub fn verify(&self, key: &[u8; 32], expected_root: &ContentDigest) -> ProofOutcome {
        if self.siblings.len() != DEPTH {
            return ProofOutcome::Invalid;
        }
        let mut current = match &self.leaf {
            Some(value) => leaf_hash(key, value),
            None => defaults()[0],
        };
        // Siblings are leaf-to-root; the branching bit at level i (from the
        // leaf) is key bit DEPTH - 1 - i.
        for (i, sibling) in self.siblings.iter().enumerate() {
            current = if bit_at(key, DEPTH - 1 - i) == 0 {
                node_hash(&current, sibling.as_bytes())
            } else {
                node_hash(sibling.as_bytes(), &current)
            };
        }
        if &ContentDigest::from_bytes(current) != expected_root {
            return ProofOutcome::Invalid;
        }
        match &self.leaf {
            Some(value) => ProofOutcome::Included(*value),
            None => ProofOutcome::NotIncluded,
        }
    }
}

// ---------------------------------------------------------------------------
// InclusionProof
// ---------------------------------------------------------------------------

/// A Merkle path bound to the tree root it commits to, plus the ledger's
/// opaque consensus certificate for that root.
///
/// The certificate is carried verbatim and not interpreted here; its wire
/// format belongs to the ledger service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InclusionProof {
    /// The tree root this path commits to.
    pub root: ContentDigest,
    /// The sibling path.
    pub path: MerklePath,
    /// Opaque consensus certificate for the root, if the ledger issued one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<serde_json::Value>,
}

impl InclusionProof {
    /// Verify the path for `key` against this proof's own root.
    pub fn outcome(&self, key: &[u8; 32]) -> ProofOutcome {
        self.path.verify(key, &self.root)
    }
}

// ---------------------------------------------------------------------------
// SparseMerkleTree
// ---------------------------------------------------------------------------

/// An in-memory sparse Merkle tree keyed by 32-byte request ids.
///
/// Keys are write-once: inserting a key that is already present is an
/// error, mirroring the ledger's append-only record.
#[derive(Debug, Default)]
pub struct SparseMerkleTree {
    leaves: BTreeMap<[u8; 32], ContentDigest>,
}

impl SparseMerkleTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of occupied leaves.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Whether the tree has no occupied leaves.
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Record `value` under `key`. Keys are write-once.
    pub fn insert(&mut self, key: [u8; 32], value: ContentDigest) -> Result<(), CryptoError> {
        if self.leaves.contains_key(&key) {
            return Err(CryptoError::Smt(format!(
                "key already recorded: {}",
                ContentDigest::from_bytes(key).to_hex()
            )));
        }
        self.leaves.insert(key, value);
        Ok(())
    }

    /// The recorded value for `key`, if present.
    pub fn get(&self, key: &[u8; 32]) -> Option<&ContentDigest> {
        self.leaves.get(key)
    }

    /// The current root hash.
    pub fn root(&self) -> ContentDigest {
        let entries: Vec<(&[u8; 32], &ContentDigest)> = self.leaves.iter().collect();
        ContentDigest::from_bytes(subtree_hash(&entries, 0))
    }

    /// Build a path for `key` — an inclusion path when the key is present,
    /// a non-inclusion path otherwise. Either way the path verifies against
    /// [`SparseMerkleTree::root()`].
    pub fn prove(&self, key: &[u8; 32]) -> MerklePath {
        let mut entries: Vec<(&[u8; 32], &ContentDigest)> = self.leaves.iter().collect();
        let mut siblings = Vec::with_capacity(DEPTH);

        for depth in 0..DEPTH {
            // BTreeMap iteration is byte-lexicographic, which for equal
            // prefixes is exactly bit order: all bit-0 keys precede bit-1.
            let split = entries.partition_point(|(k, _)| bit_at(k, depth) == 0);
            let (zeros, ones) = entries.split_at(split);
            if bit_at(key, depth) == 0 {
                siblings.push(ContentDigest::from_bytes(subtree_hash(ones, depth + 1)));
                entries = zeros.to_vec();
            } else {
                siblings.push(ContentDigest::from_bytes(subtree_hash(zeros, depth + 1)));
                entries = ones.to_vec();
            }
        }

        // Collected root-to-leaf; verification walks leaf-to-root.
        siblings.reverse();

        MerklePath {
            siblings,
            leaf: entries.first().map(|(_, v)| **v),
        }
    }
}

/// Hash of the subtree at `depth` containing the given (sorted) entries.
fn subtree_hash(entries: &[(&[u8; 32], &ContentDigest)], depth: usize) -> [u8; 32] {
    if entries.is_empty() {
        return defaults()[DEPTH - depth];
    }
    if depth == DEPTH {
        // All 256 bits consumed: exactly one entry can remain.
        let (key, value) = entries[0];
        return leaf_hash(key, value);
    }
    let split = entries.partition_point(|(k, _)| bit_at(k, depth) == 0);
    let (zeros, ones) = entries.split_at(split);
    node_hash(
        &subtree_hash(zeros, depth + 1),
        &subtree_hash(ones, depth + 1),
    )
}
