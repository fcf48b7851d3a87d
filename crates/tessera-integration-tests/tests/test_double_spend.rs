//! Double-spend scenarios: two packages built from the same source state,
//! redeemed sequentially and concurrently. Exactly one transfer ever
//! completes; the loser's verdict is final.

use tessera_core::TokenTypeId;
use tessera_crypto::Ed25519KeyPair;
use tessera_ledger::InMemoryLedger;
use tessera_token::{validate_token, OwnerPredicate, OwnershipStatus, Token};
use tessera_transfer::{
    build_commitment, query_ownership, OfflinePackage, PollPolicy, SubmitError, Submitter,
    TransferOptions,
};

fn two_packages_same_state() -> (OfflinePackage, OfflinePackage, Ed25519KeyPair, Ed25519KeyPair) {
    let owner = Ed25519KeyPair::generate();
    let alice = Ed25519KeyPair::generate();
    let bob = Ed25519KeyPair::generate();
    let token = Token::mint(&owner, TokenTypeId::new("grain-lot"), None).unwrap();

    let to_alice = build_commitment(
        &owner,
        &token,
        OwnerPredicate::new(alice.public_key()).address(),
        TransferOptions::default(),
    )
    .unwrap();
    let to_bob = build_commitment(
        &owner,
        &token,
        OwnerPredicate::new(bob.public_key()).address(),
        TransferOptions::default(),
    )
    .unwrap();
    // Same source state, same request id, different commitments.
    assert_eq!(to_alice.request_id, to_bob.request_id);
    assert_ne!(
        to_alice.transaction_hash().unwrap(),
        to_bob.transaction_hash().unwrap()
    );

    (
        OfflinePackage::assemble(token.clone(), to_alice).unwrap(),
        OfflinePackage::assemble(token, to_bob).unwrap(),
        alice,
        bob,
    )
}

#[tokio::test]
async fn sequential_double_spend_second_loses_finally() {
    let (to_alice, to_bob, alice, bob) = two_packages_same_state();
    let ledger = InMemoryLedger::new();
    let s = Submitter::with_policy(ledger.clone(), PollPolicy::fast());

    let alices = s.submit(to_alice, &alice, None).await.unwrap();
    validate_token(&alices).unwrap();

    let err = s.submit(to_bob.clone(), &bob, None).await.unwrap_err();
    assert!(matches!(err, SubmitError::AlreadySpent { .. }));
    // Retrying the loser changes nothing.
    let err = s.submit(to_bob, &bob, None).await.unwrap_err();
    assert!(matches!(err, SubmitError::AlreadySpent { .. }));
    assert_eq!(ledger.len(), 1);
}

#[tokio::test]
async fn concurrent_double_spend_has_exactly_one_winner() {
    let (to_alice, to_bob, alice, bob) = two_packages_same_state();
    let ledger = InMemoryLedger::new();

    let l1 = ledger.clone();
    let l2 = ledger.clone();
    let race_alice = tokio::spawn(async move {
        Submitter::with_policy(l1, PollPolicy::fast())
            .submit(to_alice, &alice, None)
            .await
    });
    let race_bob = tokio::spawn(async move {
        Submitter::with_policy(l2, PollPolicy::fast())
            .submit(to_bob, &bob, None)
            .await
    });

    let (alice_result, bob_result) = (race_alice.await.unwrap(), race_bob.await.unwrap());
    let winners = [alice_result.is_ok(), bob_result.is_ok()]
        .iter()
        .filter(|w| **w)
        .count();
    assert_eq!(winners, 1, "exactly one of the two submissions must win");

    for result in [alice_result, bob_result] {
        match result {
            Ok(token) => validate_token(&token).unwrap(),
            Err(err) => assert!(matches!(err, SubmitError::AlreadySpent { .. })),
        }
    }
    assert_eq!(ledger.len(), 1);
}

#[tokio::test]
async fn losing_senders_copy_resolves_outdated_not_confirmed() {
    let (to_alice, to_bob, alice, _bob) = two_packages_same_state();
    let ledger = InMemoryLedger::new();
    let s = Submitter::with_policy(ledger.clone(), PollPolicy::fast());

    s.submit(to_alice, &alice, None).await.unwrap();

    // The sender still holds the losing package. Its pending commitment
    // shares the winner's request id, so the ledger answers Included with
    // the *winner's* transaction hash — which this copy does not record.
    let status = query_ownership(&ledger, &to_bob.token, Some(&to_bob.pending))
        .await
        .unwrap();
    assert_eq!(status, OwnershipStatus::Outdated);
}
