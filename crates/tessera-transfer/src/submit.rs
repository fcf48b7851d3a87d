//! # Commitment Submitter
//!
//! Redeems an offline package: validates it, submits the pending commitment
//! verbatim, polls for the inclusion proof, and appends the completed
//! transfer record to the token.
//!
//! ## Idempotency
//!
//! Resubmitting the identical package is always safe. Commitment signing is
//! deterministic and the submitted bytes are canonical, so a resubmission
//! is byte-identical to the original; the ledger classifies it `Duplicate`
//! and the submitter proceeds to polling exactly as if it had been
//! `Accepted`. A crash between submission and proof retrieval therefore
//! loses nothing.
//!
//! ## Finality
//!
//! `Conflict` — a *different* commitment already recorded under the same
//! request id — is final. The source state is spent, this transfer lost,
//! and no amount of retrying changes that. The submitter reports it as
//! [`SubmitError::AlreadySpent`] and never retries it.

use std::time::Duration;

use tokio::time::Instant;

use tessera_crypto::ProofOutcome;
use tessera_ledger::{LedgerGateway, SubmitOutcome};
use tessera_token::{OwnerPredicate, Token, TokenState, TransferRecord};

use crate::error::SubmitError;
use crate::package::OfflinePackage;

/// Backoff and deadline policy for inclusion proof polling.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Delay before the first poll; doubles per attempt.
    pub initial: Duration,
    /// Ceiling on the per-attempt delay.
    pub cap: Duration,
    /// Total time budget before giving up with a retryable timeout.
    pub deadline: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(250),
            cap: Duration::from_secs(5),
            deadline: Duration::from_secs(60),
        }
    }
}

impl PollPolicy {
    /// A tight policy for tests against an in-process ledger.
    pub fn fast() -> Self {
        Self {
            initial: Duration::from_millis(1),
            cap: Duration::from_millis(10),
            deadline: Duration::from_millis(250),
        }
    }
}

/// Submits offline packages to a ledger and completes the transfer.
#[derive(Debug, Clone)]
pub struct Submitter<G> {
    gateway: G,
    policy: PollPolicy,
}

impl<G: LedgerGateway> Submitter<G> {
    /// Create a submitter with the default polling policy.
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            policy: PollPolicy::default(),
        }
    }

    /// Create a submitter with an explicit polling policy.
    pub fn with_policy(gateway: G, policy: PollPolicy) -> Self {
        Self { gateway, policy }
    }

    /// Redeem `package` for the holder of `recipient_keys`, producing the
    /// completed token.
    ///
    /// `recipient_data` becomes the new state's data and must satisfy the
    /// commitment's `recipient_data_hash` binding when one is present.
    ///
    /// The pending commitment is submitted **verbatim** — the recipient's
    /// key signs nothing here; it only has to *be* the key the commitment's
    /// recipient address was derived from.
    pub async fn submit(
        &self,
        package: OfflinePackage,
        recipient_keys: &tessera_crypto::Ed25519KeyPair,
        recipient_data: Option<serde_json::Value>,
    ) -> Result<Token, SubmitError> {
        package.validate()?;
        let pending = &package.pending;

        let predicate = OwnerPredicate::new(recipient_keys.public_key());
        let derived = predicate.address();
        if pending.recipient != derived {
            return Err(SubmitError::NotAddressedToRecipient {
                committed: pending.recipient.to_string(),
                derived: derived.to_string(),
            });
        }

        let new_state = match recipient_data {
            Some(data) => TokenState::with_data(predicate, data),
            None => TokenState::new(predicate),
        };
        check_data_binding(pending, &new_state)?;

        match self.gateway.submit_commitment(pending).await {
            Ok(SubmitOutcome::Accepted) => {
                tracing::info!(request_id = %pending.request_id, "commitment accepted");
            }
            Ok(SubmitOutcome::Duplicate) => {
                tracing::info!(request_id = %pending.request_id, "commitment already recorded, resuming");
            }
            Ok(SubmitOutcome::Conflict { reason }) => {
                return Err(SubmitError::AlreadySpent { reason });
            }
            Err(e) if e.is_protocol_rejection() => {
                return Err(match e {
                    tessera_ledger::LedgerError::Api { status, body, .. } => {
                        SubmitError::Rejected { status, body }
                    }
                    other => SubmitError::Ledger(other),
                });
            }
            Err(e) => return Err(SubmitError::Ledger(e)),
        }

        let proof = self.poll_for_proof(&package).await?;

        let mut token = package.token;
        token.append_transfer(TransferRecord {
            commitment: package.pending,
            new_state,
            inclusion_proof: proof,
        })?;
        tracing::info!(token_id = %token.id(), "transfer complete");
        Ok(token)
    }

    /// Poll until the ledger produces a verifiable inclusion proof for the
    /// pending commitment, or the deadline passes.
    ///
    /// Transport failures during polling are retried within the deadline —
    /// the commitment is already (or will shortly be) recorded, so patience
    /// is the correct response. An *included* answer carrying a different
    /// transaction hash than ours means a conflicting commitment won and is
    /// final.
    async fn poll_for_proof(
        &self,
        package: &OfflinePackage,
    ) -> Result<tessera_crypto::InclusionProof, SubmitError> {
        let pending = &package.pending;
        let expected_tx = pending.transaction_hash().map_err(tessera_token::TokenError::from)?;
        let started = Instant::now();
        let mut delay = self.policy.initial;

        loop {
            match self.gateway.get_inclusion_proof(&pending.request_id).await {
                Ok(resp) if resp.included => {
                    if let Some(tx) = resp.transaction_hash {
                        if tx != expected_tx {
                            return Err(SubmitError::AlreadySpent {
                                reason: format!(
                                    "ledger records transaction {tx}, ours is {expected_tx}"
                                ),
                            });
                        }
                    }
                    if let Some(proof) = resp.proof {
                        match proof.outcome(pending.request_id.as_bytes()) {
                            ProofOutcome::Included(tx) if tx == expected_tx => return Ok(proof),
                            ProofOutcome::Included(tx) => {
                                return Err(SubmitError::AlreadySpent {
                                    reason: format!(
                                        "proof records transaction {tx}, ours is {expected_tx}"
                                    ),
                                });
                            }
                            // An unverifiable proof now may be a verifiable
                            // one on the next poll (tree mid-rebuild).
                            ProofOutcome::NotIncluded | ProofOutcome::Invalid => {
                                tracing::warn!(
                                    request_id = %pending.request_id,
                                    "included answer with unverifiable proof, polling again"
                                );
                            }
                        }
                    } else {
                        tracing::debug!(
                            request_id = %pending.request_id,
                            "included but proof not yet generated"
                        );
                    }
                }
                Ok(_) => {
                    tracing::debug!(request_id = %pending.request_id, "not yet included");
                }
                Err(e) => {
                    tracing::warn!(request_id = %pending.request_id, error = %e, "poll failed, retrying");
                }
            }

            if started.elapsed() >= self.policy.deadline {
                return Err(SubmitError::Timeout {
                    waited: started.elapsed(),
                });
            }
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(self.policy.cap);
        }
    }
}

fn check_data_binding(
    pending: &tessera_token::TransferCommitment,
    new_state: &TokenState,
) -> Result<(), SubmitError> {
    let actual = new_state
        .data_digest()
        .map_err(tessera_token::TokenError::from)?;
    match (&pending.recipient_data_hash, actual) {
        (Some(bound), Some(actual)) if *bound == actual => Ok(()),
        (Some(_), Some(_)) => Err(SubmitError::DataBinding(
            "offered data does not hash to the committed recipient data hash".into(),
        )),
        (Some(_), None) => Err(SubmitError::DataBinding(
            "commitment binds recipient data but none was offered".into(),
        )),
        (None, Some(_)) => Err(SubmitError::DataBinding(
            "data offered but the commitment never bound any".into(),
        )),
        (None, None) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tessera_core::{sha256_digest, CanonicalBytes, ContentDigest, RequestId, TokenTypeId};
    use tessera_crypto::{Ed25519KeyPair, Ed25519PublicKey};
    use tessera_ledger::{InMemoryLedger, InclusionProofResponse, LedgerError};
    use tessera_token::{validate_token, TransferCommitment};

    use crate::commitment::{build_commitment, TransferOptions};

    /// Records commitments but never produces an inclusion proof, like an
    /// aggregator whose tree rebuild has stalled.
    #[derive(Clone)]
    struct StalledProofLedger(InMemoryLedger);

    impl LedgerGateway for StalledProofLedger {
        async fn submit_commitment(
            &self,
            commitment: &TransferCommitment,
        ) -> Result<SubmitOutcome, LedgerError> {
            self.0.submit_commitment(commitment).await
        }

        async fn get_inclusion_proof(
            &self,
            _request_id: &RequestId,
        ) -> Result<InclusionProofResponse, LedgerError> {
            Ok(InclusionProofResponse::not_included())
        }

        async fn get_status(
            &self,
            public_key: &Ed25519PublicKey,
            state_hash: &ContentDigest,
        ) -> Result<InclusionProofResponse, LedgerError> {
            self.0.get_status(public_key, state_hash).await
        }
    }

    fn minted(owner: &Ed25519KeyPair) -> Token {
        Token::mint(owner, TokenTypeId::new("grain-lot"), None).unwrap()
    }

    fn package_for(
        owner: &Ed25519KeyPair,
        token: &Token,
        recipient_keys: &Ed25519KeyPair,
        options: TransferOptions,
    ) -> OfflinePackage {
        let recipient = OwnerPredicate::new(recipient_keys.public_key());
        let pending = build_commitment(owner, token, recipient.address(), options).unwrap();
        OfflinePackage::assemble(token.clone(), pending).unwrap()
    }

    fn submitter(ledger: &InMemoryLedger) -> Submitter<InMemoryLedger> {
        Submitter::with_policy(ledger.clone(), PollPolicy::fast())
    }

    #[tokio::test]
    async fn full_handoff_produces_a_valid_token() {
        let owner = Ed25519KeyPair::generate();
        let recipient_keys = Ed25519KeyPair::generate();
        let token = minted(&owner);
        let package = package_for(&owner, &token, &recipient_keys, TransferOptions::default());

        let ledger = InMemoryLedger::new();
        let received = submitter(&ledger)
            .submit(package, &recipient_keys, None)
            .await
            .unwrap();

        assert_eq!(received.transfers.len(), 1);
        assert!(received
            .state
            .predicate
            .matches_signer(&recipient_keys.public_key()));
        validate_token(&received).unwrap();
    }

    #[tokio::test]
    async fn resubmission_of_the_same_package_is_idempotent() {
        let owner = Ed25519KeyPair::generate();
        let recipient_keys = Ed25519KeyPair::generate();
        let token = minted(&owner);
        let package = package_for(&owner, &token, &recipient_keys, TransferOptions::default());

        let ledger = InMemoryLedger::new();
        let s = submitter(&ledger);
        let first = s
            .submit(package.clone(), &recipient_keys, None)
            .await
            .unwrap();
        // Crash-and-retry: the identical package goes in again.
        let second = s.submit(package, &recipient_keys, None).await.unwrap();
        assert_eq!(
            first.latest_transfer().unwrap().transaction_hash().unwrap(),
            second.latest_transfer().unwrap().transaction_hash().unwrap()
        );
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn losing_package_reports_already_spent() {
        let owner = Ed25519KeyPair::generate();
        let alice = Ed25519KeyPair::generate();
        let bob = Ed25519KeyPair::generate();
        let token = minted(&owner);
        // Two packages from the same state, to different recipients.
        let to_alice = package_for(&owner, &token, &alice, TransferOptions::default());
        let to_bob = package_for(&owner, &token, &bob, TransferOptions::default());

        let ledger = InMemoryLedger::new();
        let s = submitter(&ledger);
        s.submit(to_alice, &alice, None).await.unwrap();
        let err = s.submit(to_bob, &bob, None).await.unwrap_err();
        assert!(matches!(err, SubmitError::AlreadySpent { .. }));
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn wrong_recipient_key_is_refused_locally() {
        let owner = Ed25519KeyPair::generate();
        let recipient_keys = Ed25519KeyPair::generate();
        let stranger = Ed25519KeyPair::generate();
        let token = minted(&owner);
        let package = package_for(&owner, &token, &recipient_keys, TransferOptions::default());

        let ledger = InMemoryLedger::new();
        let err = submitter(&ledger)
            .submit(package, &stranger, None)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::NotAddressedToRecipient { .. }));
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn data_binding_is_enforced() {
        let owner = Ed25519KeyPair::generate();
        let recipient_keys = Ed25519KeyPair::generate();
        let token = minted(&owner);
        let data = json!({"lot": "A-17", "weight_kg": 500});
        let data_hash = sha256_digest(&CanonicalBytes::new(&data).unwrap());
        let package = package_for(
            &owner,
            &token,
            &recipient_keys,
            TransferOptions {
                recipient_data_hash: Some(data_hash),
                ..TransferOptions::default()
            },
        );

        let ledger = InMemoryLedger::new();
        let s = submitter(&ledger);
        // Wrong data.
        let err = s
            .submit(
                package.clone(),
                &recipient_keys,
                Some(json!({"lot": "B-02"})),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::DataBinding(_)));
        // No data at all.
        let err = s
            .submit(package.clone(), &recipient_keys, None)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::DataBinding(_)));
        // The bound data completes.
        let received = s
            .submit(package, &recipient_keys, Some(data))
            .await
            .unwrap();
        validate_token(&received).unwrap();
    }

    #[tokio::test]
    async fn unreachable_ledger_is_a_retryable_error() {
        let owner = Ed25519KeyPair::generate();
        let recipient_keys = Ed25519KeyPair::generate();
        let token = minted(&owner);
        let package = package_for(&owner, &token, &recipient_keys, TransferOptions::default());

        let ledger = InMemoryLedger::new();
        ledger.fail_next(1);
        let s = submitter(&ledger);
        let err = s
            .submit(package.clone(), &recipient_keys, None)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Ledger(_)));
        // Ledger recovered: the same package completes.
        s.submit(package, &recipient_keys, None).await.unwrap();
    }

    #[tokio::test]
    async fn deadline_expiry_is_a_timeout_and_resubmission_still_completes() {
        let owner = Ed25519KeyPair::generate();
        let recipient_keys = Ed25519KeyPair::generate();
        let token = minted(&owner);
        let package = package_for(&owner, &token, &recipient_keys, TransferOptions::default());

        let ledger = InMemoryLedger::new();
        let stalled = Submitter::with_policy(
            StalledProofLedger(ledger.clone()),
            PollPolicy::fast(),
        );
        let err = stalled
            .submit(package.clone(), &recipient_keys, None)
            .await
            .unwrap_err();
        match err {
            SubmitError::Timeout { waited } => {
                assert!(waited >= PollPolicy::fast().deadline);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        // The commitment was recorded before the polling stalled out; once
        // proofs flow again, the identical package resumes as a duplicate.
        assert_eq!(ledger.len(), 1);
        let received = submitter(&ledger)
            .submit(package, &recipient_keys, None)
            .await
            .unwrap();
        validate_token(&received).unwrap();
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn second_hop_chains_onto_the_first() {
        let owner = Ed25519KeyPair::generate();
        let alice = Ed25519KeyPair::generate();
        let bob = Ed25519KeyPair::generate();
        let token = minted(&owner);

        let ledger = InMemoryLedger::new();
        let s = submitter(&ledger);

        let to_alice = package_for(&owner, &token, &alice, TransferOptions::default());
        let alices_token = s.submit(to_alice, &alice, None).await.unwrap();

        let to_bob = package_for(&alice, &alices_token, &bob, TransferOptions::default());
        let bobs_token = s.submit(to_bob, &bob, None).await.unwrap();

        assert_eq!(bobs_token.transfers.len(), 2);
        assert!(bobs_token.state.predicate.matches_signer(&bob.public_key()));
        validate_token(&bobs_token).unwrap();
        assert_eq!(ledger.len(), 2);
    }
}
