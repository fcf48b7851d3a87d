//! # Typed HTTP Client for the Aggregator API
//!
//! ## API Paths
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `/api/v1/commitments` | Submit a commitment |
//! | GET    | `/api/v1/proofs/{request_id}` | Inclusion proof by request id |
//!
//! Status queries are the proof query keyed by the request id derived
//! client-side from `(public_key, state_hash)`.
//!
//! ## Not-Found Mapping
//!
//! A 404 on the proof path means "not (yet) in the tree" and maps to an
//! `included: false` response. This is deliberate and load-bearing: an
//! unspent token's status query lands here every time.

use std::time::Duration;

use tessera_core::{ContentDigest, RequestId};
use tessera_crypto::Ed25519PublicKey;
use tessera_token::TransferCommitment;

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::gateway::LedgerGateway;
use crate::retry::retry_send;
use crate::wire::{InclusionProofResponse, SubmitOutcome, SubmitResponseBody};

/// API version path segment.
const API_PREFIX: &str = "api/v1";

/// Typed reqwest client for the aggregator HTTP API.
#[derive(Debug, Clone)]
pub struct HttpLedgerClient {
    http: reqwest::Client,
    base_url: url::Url,
}

impl HttpLedgerClient {
    /// Create a client from configuration.
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LedgerError::Unreachable {
                endpoint: "client_init".into(),
                detail: e.to_string(),
            })?;
        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    fn proof_url(&self, request_id: &RequestId) -> String {
        format!(
            "{}{}/proofs/{}",
            self.base_url,
            API_PREFIX,
            request_id.to_hex()
        )
    }

    async fn fetch_proof(
        &self,
        endpoint: String,
        url: String,
    ) -> Result<InclusionProofResponse, LedgerError> {
        let resp = retry_send(|| self.http.get(&url).send())
            .await
            .map_err(|e| LedgerError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        // Not found is the normal unspent answer, not an error.
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(%endpoint, "proof not in tree (404), reporting not-included");
            return Ok(InclusionProofResponse::not_included());
        }

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(LedgerError::Api {
                endpoint,
                status,
                body,
            });
        }

        resp.json()
            .await
            .map_err(|e| LedgerError::Deserialization {
                endpoint,
                source: e,
            })
    }
}

impl LedgerGateway for HttpLedgerClient {
    async fn submit_commitment(
        &self,
        commitment: &TransferCommitment,
    ) -> Result<SubmitOutcome, LedgerError> {
        let endpoint = "POST /commitments".to_string();
        let url = format!("{}{}/commitments", self.base_url, API_PREFIX);

        let resp = retry_send(|| self.http.post(&url).json(commitment).send())
            .await
            .map_err(|e| LedgerError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        // A conflict is a well-formed classification, whatever the ledger
        // chose as its HTTP status for it.
        if resp.status().is_success() || resp.status() == reqwest::StatusCode::CONFLICT {
            let body: SubmitResponseBody =
                resp.json().await.map_err(|e| LedgerError::Deserialization {
                    endpoint: endpoint.clone(),
                    source: e,
                })?;
            let outcome = body.into_outcome();
            tracing::debug!(%endpoint, ?outcome, "submission classified");
            return Ok(outcome);
        }

        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Err(LedgerError::Api {
            endpoint,
            status,
            body,
        })
    }

    async fn get_inclusion_proof(
        &self,
        request_id: &RequestId,
    ) -> Result<InclusionProofResponse, LedgerError> {
        let endpoint = format!("GET /proofs/{request_id}");
        let url = self.proof_url(request_id);
        self.fetch_proof(endpoint, url).await
    }

    async fn get_status(
        &self,
        public_key: &Ed25519PublicKey,
        state_hash: &ContentDigest,
    ) -> Result<InclusionProofResponse, LedgerError> {
        let request_id = RequestId::derive(public_key.as_bytes(), state_hash);
        let endpoint = format!("GET /proofs/{request_id} (status)");
        let url = self.proof_url(&request_id);
        self.fetch_proof(endpoint, url).await
    }
}
