//! Contract tests for [`HttpLedgerClient`] against a mocked aggregator.
//!
//! The cases that matter most are the classification boundaries: 404 on the
//! proof path is a normal not-included answer, 409 on submit is a
//! well-formed conflict, and only genuinely broken responses become errors.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tessera_core::{CanonicalBytes, ContentDigest, RequestId, Salt, TokenTypeId};
use tessera_crypto::Ed25519KeyPair;
use tessera_ledger::{HttpLedgerClient, LedgerConfig, LedgerError, LedgerGateway, SubmitOutcome};
use tessera_token::{CommitmentPayload, OwnerPredicate, Token, TransferCommitment};

fn client_for(server: &MockServer) -> HttpLedgerClient {
    let config = LedgerConfig::for_base_url(server.uri().parse().unwrap());
    HttpLedgerClient::new(config).unwrap()
}

fn sample_commitment() -> TransferCommitment {
    let keys = Ed25519KeyPair::generate();
    let token = Token::mint(&keys, TokenTypeId::new("grain-lot"), None).unwrap();
    let recipient = OwnerPredicate::new(Ed25519KeyPair::generate().public_key());
    let source_state_hash = token.state.digest().unwrap();
    let payload = CommitmentPayload {
        source_state_hash,
        recipient: recipient.address(),
        salt: Salt::random(),
        recipient_data_hash: None,
        message: None,
    };
    TransferCommitment {
        request_id: RequestId::derive(keys.public_key().as_bytes(), &source_state_hash),
        source_state_hash,
        recipient: payload.recipient.clone(),
        salt: payload.salt,
        recipient_data_hash: None,
        message: None,
        signature: keys.sign(&CanonicalBytes::new(&payload).unwrap()),
        public_key: keys.public_key(),
    }
}

#[tokio::test]
async fn submit_parses_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/commitments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "accepted"})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server)
        .submit_commitment(&sample_commitment())
        .await
        .unwrap();
    assert_eq!(outcome, SubmitOutcome::Accepted);
}

#[tokio::test]
async fn submit_parses_duplicate_as_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/commitments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "duplicate"})))
        .mount(&server)
        .await;

    let outcome = client_for(&server)
        .submit_commitment(&sample_commitment())
        .await
        .unwrap();
    assert_eq!(outcome, SubmitOutcome::Duplicate);
}

#[tokio::test]
async fn submit_parses_conflict_from_409() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/commitments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "status": "conflict",
            "reason": "request id already spent by a different commitment"
        })))
        .mount(&server)
        .await;

    let outcome = client_for(&server)
        .submit_commitment(&sample_commitment())
        .await
        .unwrap();
    match outcome {
        SubmitOutcome::Conflict { reason } => {
            assert!(reason.contains("already spent"));
        }
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn submit_surfaces_rejection_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/commitments"))
        .respond_with(ResponseTemplate::new(422).set_body_string("signature does not verify"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .submit_commitment(&sample_commitment())
        .await
        .unwrap_err();
    match err {
        LedgerError::Api { status, body, .. } => {
            assert_eq!(status, 422);
            assert!(body.contains("signature"));
            assert!(err_is_protocol_rejection(status));
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

fn err_is_protocol_rejection(status: u16) -> bool {
    LedgerError::Api {
        endpoint: "test".into(),
        status,
        body: String::new(),
    }
    .is_protocol_rejection()
}

#[tokio::test]
async fn proof_404_is_not_included_not_an_error() {
    let server = MockServer::start().await;
    let request_id = RequestId::derive(&[1u8; 32], &ContentDigest::from_bytes([2u8; 32]));
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/proofs/{}", request_id.to_hex())))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let resp = client_for(&server)
        .get_inclusion_proof(&request_id)
        .await
        .unwrap();
    assert!(!resp.included);
    assert!(resp.transaction_hash.is_none());
    assert!(resp.proof.is_none());
}

#[tokio::test]
async fn proof_body_deserializes_included_answer() {
    let server = MockServer::start().await;
    let request_id = RequestId::derive(&[1u8; 32], &ContentDigest::from_bytes([2u8; 32]));
    let tx = ContentDigest::from_bytes([7u8; 32]);
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/proofs/{}", request_id.to_hex())))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "included": true,
            "transaction_hash": tx.to_hex(),
        })))
        .mount(&server)
        .await;

    let resp = client_for(&server)
        .get_inclusion_proof(&request_id)
        .await
        .unwrap();
    assert!(resp.included);
    assert_eq!(resp.transaction_hash, Some(tx));
}

#[tokio::test]
async fn status_query_hits_the_derived_request_id_path() {
    let server = MockServer::start().await;
    let keys = Ed25519KeyPair::generate();
    let state_hash = ContentDigest::from_bytes([3u8; 32]);
    let request_id = RequestId::derive(keys.public_key().as_bytes(), &state_hash);
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/proofs/{}", request_id.to_hex())))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client_for(&server)
        .get_status(&keys.public_key(), &state_hash)
        .await
        .unwrap();
    assert!(!resp.included);
}

#[tokio::test]
async fn base_url_with_path_prefix_keeps_its_last_segment() {
    let server = MockServer::start().await;
    let request_id = RequestId::derive(&[1u8; 32], &ContentDigest::from_bytes([2u8; 32]));
    // Without normalization "…/ledger" + "api/v1" would fuse into
    // "…/ledgerapi/v1" and this mock would never match.
    Mock::given(method("GET"))
        .and(path(format!("/ledger/api/v1/proofs/{}", request_id.to_hex())))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let config = LedgerConfig::for_base_url(format!("{}/ledger", server.uri()).parse().unwrap());
    let client = HttpLedgerClient::new(config).unwrap();
    let resp = client.get_inclusion_proof(&request_id).await.unwrap();
    assert!(!resp.included);
}

#[tokio::test]
async fn server_error_on_proof_is_an_api_error() {
    let server = MockServer::start().await;
    let request_id = RequestId::derive(&[1u8; 32], &ContentDigest::from_bytes([2u8; 32]));
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/proofs/{}", request_id.to_hex())))
        .respond_with(ResponseTemplate::new(500).set_body_string("tree rebuild in progress"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_inclusion_proof(&request_id)
        .await
        .unwrap_err();
    match err {
        LedgerError::Api { status, .. } => assert_eq!(status, 500),
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_success_body_is_a_deserialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/commitments"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .submit_commitment(&sample_commitment())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Deserialization { .. }));
}
