//! # Token Provenance Chain
//!
//! A token is its genesis record, the ordered transfer records that each
//! consumed the previous state, and the current state the replay of those
//! records reaches. The chain is the token — there is no authority for a
//! token's history other than the records themselves and the ledger entries
//! they point at.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tessera_core::{CanonicalBytes, CanonicalizationError, ContentDigest, TokenId, TokenTypeId};
use tessera_crypto::{verify_signature, Ed25519KeyPair, Ed25519Signature, InclusionProof};

use crate::commitment::TransferCommitment;
use crate::error::TokenError;
use crate::predicate::OwnerPredicate;
use crate::resolver::ChainView;
use crate::state::TokenState;

// ---------------------------------------------------------------------------
// GenesisRecord
// ---------------------------------------------------------------------------

/// Canonical payload the genesis signature covers.
#[derive(Serialize)]
struct GenesisPayload<'a> {
    token_id: &'a TokenId,
    token_type: &'a TokenTypeId,
    minted_at: &'a DateTime<Utc>,
    state: &'a TokenState,
}

/// The mint record that starts a token's provenance chain.
///
/// Self-signed by the minter's key, which is also the key of the initial
/// state's predicate. A freshly minted token has no ledger footprint; its
/// first appearance on the ledger is the spend of its genesis state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenesisRecord {
    /// The token's identity.
    pub token_id: TokenId,
    /// Immutable type descriptor.
    pub token_type: TokenTypeId,
    /// When the token was minted.
    pub minted_at: DateTime<Utc>,
    /// The initial state.
    pub state: TokenState,
    /// The minter's signature over the canonical genesis payload.
    pub signature: Ed25519Signature,
}

impl GenesisRecord {
    fn payload_bytes(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        CanonicalBytes::new(&GenesisPayload {
            token_id: &self.token_id,
            token_type: &self.token_type,
            minted_at: &self.minted_at,
            state: &self.state,
        })
    }

    /// Verify the genesis signature under the initial state's predicate key.
    pub fn verify(&self) -> Result<(), TokenError> {
        let payload = self.payload_bytes()?;
        verify_signature(&self.signature, &payload, &self.state.predicate.public_key)
            .map_err(|e| TokenError::GenesisSignature(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// TransferRecord
// ---------------------------------------------------------------------------

/// A completed, ledger-proven transfer in a token's provenance chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    /// The commitment that consumed the previous state.
    pub commitment: TransferCommitment,
    /// The state the transfer produced.
    pub new_state: TokenState,
    /// The ledger's inclusion proof for the commitment's request id.
    pub inclusion_proof: InclusionProof,
}

impl TransferRecord {
    /// The transaction hash the ledger recorded for this transfer.
    pub fn transaction_hash(&self) -> Result<ContentDigest, CanonicalizationError> {
        self.commitment.transaction_hash()
    }
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// A token: genesis, completed transfers, and the current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The mint record.
    pub genesis: GenesisRecord,
    /// Completed transfers, oldest first.
    pub transfers: Vec<TransferRecord>,
    /// The state reached by replaying genesis + transfers.
    pub state: TokenState,
}

impl Token {
    /// Mint a new token owned by `keypair`, with a fresh random token id.
    ///
    /// The key pair is borrowed for the signing call only.
    pub fn mint(
        keypair: &Ed25519KeyPair,
        token_type: TokenTypeId,
        data: Option<serde_json::Value>,
    ) -> Result<Self, TokenError> {
        let predicate = OwnerPredicate::new(keypair.public_key());
        let state = match data {
            Some(data) => TokenState::with_data(predicate, data),
            None => TokenState::new(predicate),
        };
        let token_id = TokenId::random();
        let minted_at = Utc::now();
        let payload = CanonicalBytes::new(&GenesisPayload {
            token_id: &token_id,
            token_type: &token_type,
            minted_at: &minted_at,
            state: &state,
        })?;
        let signature = keypair.sign(&payload);
        tracing::debug!(token_id = %token_id, token_type = %token_type, "minted token");
        Ok(Self {
            genesis: GenesisRecord {
                token_id,
                token_type,
                minted_at,
                state: state.clone(),
                signature,
            },
            transfers: Vec::new(),
            state,
        })
    }

    /// The token's identity.
    pub fn id(&self) -> &TokenId {
        &self.genesis.token_id
    }

    /// The most recent completed transfer, if any.
    pub fn latest_transfer(&self) -> Option<&TransferRecord> {
        self.transfers.last()
    }

    /// Append a completed transfer record, advancing the current state.
    ///
    /// Checks only the chain linkage at the seam — the record must consume
    /// the current state and be signed by its predicate key. Full-chain
    /// validation is [`crate::validate_token`].
    pub fn append_transfer(&mut self, record: TransferRecord) -> Result<(), TokenError> {
        let expected = self.state.digest()?;
        if record.commitment.source_state_hash != expected {
            return Err(TokenError::SourceStateMismatch {
                expected,
                actual: record.commitment.source_state_hash,
            });
        }
        if !self.state.predicate.matches_signer(&record.commitment.public_key) {
            return Err(TokenError::SignerMismatch {
                signer: record.commitment.public_key.to_hex(),
                predicate: self.state.predicate.public_key.to_hex(),
            });
        }
        self.state = record.new_state.clone();
        self.transfers.push(record);
        Ok(())
    }

    /// Snapshot of this chain for the ownership resolver.
    ///
    /// `pending_commitment` is whether an unsubmitted trailing commitment
    /// accompanies this copy of the token — the token itself does not carry
    /// one; the offline package does.
    pub fn chain_view(&self, pending_commitment: bool) -> Result<ChainView, TokenError> {
        let latest_transaction_hash = match self.latest_transfer() {
            Some(record) => Some(record.transaction_hash()?),
            None => None,
        };
        Ok(ChainView {
            pending_commitment,
            latest_transaction_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mint_produces_verifiable_genesis() {
        let keys = Ed25519KeyPair::generate();
        let token = Token::mint(&keys, TokenTypeId::new("grain-lot"), None).unwrap();
        token.genesis.verify().unwrap();
        assert!(token.transfers.is_empty());
        assert_eq!(token.state, token.genesis.state);
    }

    #[test]
    fn mint_binds_data_into_state() {
        let keys = Ed25519KeyPair::generate();
        let token = Token::mint(
            &keys,
            TokenTypeId::new("grain-lot"),
            Some(json!({"weight_kg": 500})),
        )
        .unwrap();
        assert!(token.state.data_digest().unwrap().is_some());
    }

    #[test]
    fn tampered_genesis_fails_verification() {
        let keys = Ed25519KeyPair::generate();
        let mut token = Token::mint(&keys, TokenTypeId::new("grain-lot"), None).unwrap();
        token.genesis.token_type = TokenTypeId::new("gold-bar");
        assert!(token.genesis.verify().is_err());
    }

    #[test]
    fn token_serde_round_trip_preserves_genesis_signature() {
        let keys = Ed25519KeyPair::generate();
        let token = Token::mint(&keys, TokenTypeId::new("grain-lot"), None).unwrap();
        let json = serde_json::to_string(&token).unwrap();
        let back: Token = serde_json::from_str(&json).unwrap();
        back.genesis.verify().unwrap();
    }
}
