//! # In-Process Ledger
//!
//! A first-writer-wins ledger backed by the sparse Merkle tree, used by
//! tests and local development. Implements exactly the semantics the remote
//! aggregator guarantees:
//!
//! - atomic first-writer-wins per request id: among concurrent distinct
//!   commitments for one request id, exactly one is accepted;
//! - byte-identical resubmission is reported `Duplicate`, never `Conflict`;
//! - commitments whose request id is not the derivation of their own signer
//!   key and source state hash, or whose signature does not verify, are
//!   rejected as protocol violations;
//! - every proof query answers with a verifiable path against the current
//!   root, for present and absent keys alike.
//!
//! Fault injection ([`InMemoryLedger::fail_next`]) makes the next N calls
//! fail with a transport error, for outage scenario tests.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use tessera_core::{ContentDigest, RequestId};
use tessera_crypto::{verify_signature, Ed25519PublicKey, InclusionProof, SparseMerkleTree};
use tessera_token::TransferCommitment;

use crate::error::LedgerError;
use crate::gateway::LedgerGateway;
use crate::wire::{Authenticator, InclusionProofResponse, SubmitOutcome};

struct LedgerEntry {
    canonical: Vec<u8>,
    transaction_hash: ContentDigest,
    authenticator: Authenticator,
}

#[derive(Default)]
struct Inner {
    tree: SparseMerkleTree,
    entries: HashMap<[u8; 32], LedgerEntry>,
    faults_remaining: u32,
}

/// An in-process ledger with first-writer-wins semantics.
///
/// Cheap to clone; clones share the same record.
#[derive(Clone, Default)]
pub struct InMemoryLedger {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` gateway calls fail with a transport error.
    pub fn fail_next(&self, n: u32) {
        self.inner.lock().faults_remaining = n;
    }

    /// Number of recorded spends.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    fn take_fault(inner: &mut Inner, endpoint: &str) -> Result<(), LedgerError> {
        if inner.faults_remaining > 0 {
            inner.faults_remaining -= 1;
            return Err(LedgerError::Unreachable {
                endpoint: endpoint.into(),
                detail: "injected fault".into(),
            });
        }
        Ok(())
    }

    fn proof_response(inner: &Inner, request_id: &RequestId) -> InclusionProofResponse {
        let path = inner.tree.prove(request_id.as_bytes());
        let proof = InclusionProof {
            root: inner.tree.root(),
            path,
            certificate: None,
        };
        match inner.entries.get(request_id.as_bytes()) {
            Some(entry) => InclusionProofResponse {
                included: true,
                transaction_hash: Some(entry.transaction_hash),
                authenticator: Some(entry.authenticator.clone()),
                proof: Some(proof),
            },
            None => InclusionProofResponse {
                included: false,
                transaction_hash: None,
                authenticator: None,
                proof: Some(proof),
            },
        }
    }
}

impl LedgerGateway for InMemoryLedger {
    async fn submit_commitment(
        &self,
        commitment: &TransferCommitment,
    ) -> Result<SubmitOutcome, LedgerError> {
        let endpoint = "submit_commitment";
        let mut inner = self.inner.lock();
        Self::take_fault(&mut inner, endpoint)?;

        let reject = |detail: String| LedgerError::Api {
            endpoint: endpoint.into(),
            status: 422,
            body: detail,
        };

        // Ledger-side verification: the request id must be the derivation
        // of the commitment's own signer key and source state hash, and the
        // signature must verify under that key. A commitment signed with
        // any key other than the one the request id binds cannot pass.
        if commitment.request_id != commitment.derived_request_id() {
            return Err(reject(
                "request id is not derived from public_key and source_state_hash".into(),
            ));
        }
        let payload = commitment
            .payload_bytes()
            .map_err(|e| reject(format!("payload does not canonicalize: {e}")))?;
        verify_signature(&commitment.signature, &payload, &commitment.public_key)
            .map_err(|e| reject(format!("signature does not verify: {e}")))?;

        let canonical = commitment
            .canonical_bytes()
            .map_err(|e| reject(format!("commitment does not canonicalize: {e}")))?
            .into_bytes();

        let key = *commitment.request_id.as_bytes();
        if let Some(existing) = inner.entries.get(&key) {
            if existing.canonical == canonical {
                tracing::debug!(request_id = %commitment.request_id, "duplicate submission");
                return Ok(SubmitOutcome::Duplicate);
            }
            tracing::debug!(request_id = %commitment.request_id, "conflicting submission");
            return Ok(SubmitOutcome::Conflict {
                reason: "request id already spent by a different commitment".into(),
            });
        }

        let transaction_hash = commitment
            .transaction_hash()
            .map_err(|e| reject(format!("commitment does not canonicalize: {e}")))?;
        inner
            .tree
            .insert(key, transaction_hash)
            .map_err(|e| LedgerError::Unreachable {
                endpoint: endpoint.into(),
                detail: format!("tree insert failed: {e}"),
            })?;
        inner.entries.insert(
            key,
            LedgerEntry {
                canonical,
                transaction_hash,
                authenticator: Authenticator {
                    public_key: commitment.public_key,
                    signature: commitment.signature,
                    source_state_hash: commitment.source_state_hash,
                },
            },
        );
        tracing::debug!(request_id = %commitment.request_id, "commitment recorded");
        Ok(SubmitOutcome::Accepted)
    }

    async fn get_inclusion_proof(
        &self,
        request_id: &RequestId,
    ) -> Result<InclusionProofResponse, LedgerError> {
        let mut inner = self.inner.lock();
        Self::take_fault(&mut inner, "get_inclusion_proof")?;
        Ok(Self::proof_response(&inner, request_id))
    }

    async fn get_status(
        &self,
        public_key: &Ed25519PublicKey,
        state_hash: &ContentDigest,
    ) -> Result<InclusionProofResponse, LedgerError> {
        let mut inner = self.inner.lock();
        Self::take_fault(&mut inner, "get_status")?;
        let request_id = RequestId::derive(public_key.as_bytes(), state_hash);
        Ok(Self::proof_response(&inner, &request_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{CanonicalBytes, Salt, TokenTypeId};
    use tessera_crypto::{Ed25519KeyPair, ProofOutcome};
    use tessera_token::{CommitmentPayload, OwnerPredicate, Token};

    fn commitment_from(
        keys: &Ed25519KeyPair,
        token: &Token,
        recipient: &OwnerPredicate,
        salt: Salt,
    ) -> TransferCommitment {
        let source_state_hash = token.state.digest().unwrap();
        let payload = CommitmentPayload {
            source_state_hash,
            recipient: recipient.address(),
            salt,
            recipient_data_hash: None,
            message: None,
        };
        TransferCommitment {
            request_id: RequestId::derive(keys.public_key().as_bytes(), &source_state_hash),
            source_state_hash,
            recipient: payload.recipient.clone(),
            salt,
            recipient_data_hash: None,
            message: None,
            signature: keys.sign(&CanonicalBytes::new(&payload).unwrap()),
            public_key: keys.public_key(),
        }
    }

    fn setup() -> (Ed25519KeyPair, Token, OwnerPredicate) {
        let owner = Ed25519KeyPair::generate();
        let token = Token::mint(&owner, TokenTypeId::new("grain-lot"), None).unwrap();
        let recipient = OwnerPredicate::new(Ed25519KeyPair::generate().public_key());
        (owner, token, recipient)
    }

    #[tokio::test]
    async fn first_submission_is_accepted() {
        let (owner, token, recipient) = setup();
        let ledger = InMemoryLedger::new();
        let c = commitment_from(&owner, &token, &recipient, Salt::random());
        assert_eq!(
            ledger.submit_commitment(&c).await.unwrap(),
            SubmitOutcome::Accepted
        );
    }

    #[tokio::test]
    async fn identical_resubmission_is_duplicate() {
        let (owner, token, recipient) = setup();
        let ledger = InMemoryLedger::new();
        let c = commitment_from(&owner, &token, &recipient, Salt::random());
        ledger.submit_commitment(&c).await.unwrap();
        assert_eq!(
            ledger.submit_commitment(&c).await.unwrap(),
            SubmitOutcome::Duplicate
        );
    }

    #[tokio::test]
    async fn different_commitment_same_source_is_conflict() {
        let (owner, token, recipient) = setup();
        let other_recipient = OwnerPredicate::new(Ed25519KeyPair::generate().public_key());
        let ledger = InMemoryLedger::new();
        let c1 = commitment_from(&owner, &token, &recipient, Salt::random());
        let c2 = commitment_from(&owner, &token, &other_recipient, Salt::random());
        assert_eq!(c1.request_id, c2.request_id);
        ledger.submit_commitment(&c1).await.unwrap();
        assert!(matches!(
            ledger.submit_commitment(&c2).await.unwrap(),
            SubmitOutcome::Conflict { .. }
        ));
    }

    #[tokio::test]
    async fn foreign_key_spends_only_its_own_request_id() {
        let (_owner, token, recipient) = setup();
        let ledger = InMemoryLedger::new();
        // Signed by a key that does not own the source state, with the
        // request id honestly derived from that wrong key — self-consistent
        // but useless: it spends nothing the real owner holds.
        let intruder = Ed25519KeyPair::generate();
        let c = commitment_from(&intruder, &token, &recipient, Salt::random());
        assert_eq!(
            ledger.submit_commitment(&c).await.unwrap(),
            SubmitOutcome::Accepted
        );
        // The real owner's request id is untouched.
        let owner_request =
            RequestId::derive(token.state.predicate.public_key.as_bytes(), &token.state.digest().unwrap());
        let resp = ledger.get_inclusion_proof(&owner_request).await.unwrap();
        assert!(!resp.included);
    }

    #[tokio::test]
    async fn stolen_request_id_is_rejected() {
        let (owner, token, recipient) = setup();
        let ledger = InMemoryLedger::new();
        let honest = commitment_from(&owner, &token, &recipient, Salt::random());
        // Forge: reuse the owner's request id on a commitment signed by
        // another key.
        let intruder = Ed25519KeyPair::generate();
        let mut forged = commitment_from(&intruder, &token, &recipient, Salt::random());
        forged.request_id = honest.request_id;
        let err = ledger.submit_commitment(&forged).await.unwrap_err();
        assert!(err.is_protocol_rejection());
    }

    #[tokio::test]
    async fn proofs_verify_for_present_and_absent_keys() {
        let (owner, token, recipient) = setup();
        let ledger = InMemoryLedger::new();
        let c = commitment_from(&owner, &token, &recipient, Salt::random());
        ledger.submit_commitment(&c).await.unwrap();

        let resp = ledger.get_inclusion_proof(&c.request_id).await.unwrap();
        let proof = resp.proof.unwrap();
        assert_eq!(
            proof.outcome(c.request_id.as_bytes()),
            ProofOutcome::Included(c.transaction_hash().unwrap())
        );

        let absent = RequestId::derive(&[1u8; 32], &ContentDigest::from_bytes([2u8; 32]));
        let resp = ledger.get_inclusion_proof(&absent).await.unwrap();
        assert!(!resp.included);
        let proof = resp.proof.unwrap();
        assert_eq!(proof.outcome(absent.as_bytes()), ProofOutcome::NotIncluded);
    }

    #[tokio::test]
    async fn status_query_matches_proof_query() {
        let (owner, token, recipient) = setup();
        let ledger = InMemoryLedger::new();
        let c = commitment_from(&owner, &token, &recipient, Salt::random());
        ledger.submit_commitment(&c).await.unwrap();
        let by_status = ledger
            .get_status(&owner.public_key(), &c.source_state_hash)
            .await
            .unwrap();
        assert!(by_status.included);
        assert_eq!(by_status.transaction_hash, Some(c.transaction_hash().unwrap()));
    }

    #[tokio::test]
    async fn injected_faults_surface_as_transport_errors_then_clear() {
        let (owner, token, recipient) = setup();
        let ledger = InMemoryLedger::new();
        let c = commitment_from(&owner, &token, &recipient, Salt::random());
        ledger.fail_next(1);
        let err = ledger.submit_commitment(&c).await.unwrap_err();
        assert!(matches!(err, LedgerError::Unreachable { .. }));
        assert_eq!(
            ledger.submit_commitment(&c).await.unwrap(),
            SubmitOutcome::Accepted
        );
    }

    #[tokio::test]
    async fn concurrent_distinct_commitments_one_winner() {
        let (owner, token, recipient) = setup();
        let other_recipient = OwnerPredicate::new(Ed25519KeyPair::generate().public_key());
        let ledger = InMemoryLedger::new();
        let c1 = commitment_from(&owner, &token, &recipient, Salt::random());
        let c2 = commitment_from(&owner, &token, &other_recipient, Salt::random());

        let l1 = ledger.clone();
        let l2 = ledger.clone();
        let (r1, r2) = tokio::join!(
            tokio::spawn(async move { l1.submit_commitment(&c1).await.unwrap() }),
            tokio::spawn(async move { l2.submit_commitment(&c2).await.unwrap() }),
        );
        let outcomes = [r1.unwrap(), r2.unwrap()];
        let accepted = outcomes
            .iter()
            .filter(|o| matches!(o, SubmitOutcome::Accepted))
            .count();
        let conflicted = outcomes
            .iter()
            .filter(|o| matches!(o, SubmitOutcome::Conflict { .. }))
            .count();
        assert_eq!(accepted, 1);
        assert_eq!(conflicted, 1);
    }
}
