//! # Offline Package
//!
//! The artifact a sender hands to a recipient out of band: the complete
//! token (genesis, transfer records with inclusion proofs, current state)
//! plus one unsubmitted pending commitment consuming the current state.
//!
//! The package is self-contained — everything the recipient needs to check
//! it is inside it, and everything the ledger needs to record it is the
//! pending commitment verbatim. Validation is entirely local and never
//! consults the ledger; a package that fails it is defective and must be
//! re-issued, no retry will fix it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use tessera_token::{validate_token, verify_commitment, Token, TransferCommitment};

use crate::error::PackageDefect;

/// A token plus the pending commitment transferring it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflinePackage {
    /// The complete token being transferred.
    pub token: Token,
    /// The signed, unsubmitted commitment consuming the token's current
    /// state.
    pub pending: TransferCommitment,
}

impl OfflinePackage {
    /// Assemble and validate a package from a token and its pending
    /// commitment.
    pub fn assemble(token: Token, pending: TransferCommitment) -> Result<Self, PackageDefect> {
        let package = Self { token, pending };
        package.validate()?;
        Ok(package)
    }

    /// Validate the package without consulting the ledger.
    ///
    /// Checks:
    /// 1. the enclosed token's full proof chain (genesis signature, chain
    ///    linkage, recipient/data bindings, an inclusion proof on every
    ///    completed record);
    /// 2. the pending commitment consumes the token's *current* state and
    ///    is signed by its predicate key, with a matching request id and a
    ///    valid signature.
    ///
    /// The pending commitment carries no inclusion proof by construction —
    /// it has not been submitted yet.
    pub fn validate(&self) -> Result<(), PackageDefect> {
        validate_token(&self.token).map_err(PackageDefect::Chain)?;
        verify_commitment(&self.pending, &self.token.state).map_err(PackageDefect::Pending)?;
        tracing::debug!(
            token_id = %self.token.id(),
            request_id = %self.pending.request_id,
            "offline package valid"
        );
        Ok(())
    }

    /// Encode as JSON bytes for out-of-band transport.
    pub fn to_json_vec(&self) -> Result<Vec<u8>, PackageDefect> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Decode from JSON bytes and validate.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, PackageDefect> {
        let package: Self = serde_json::from_slice(bytes)?;
        package.validate()?;
        Ok(package)
    }

    /// Write the package to a file.
    pub fn save(&self, path: &Path) -> Result<(), PackageDefect> {
        std::fs::write(path, self.to_json_vec()?)?;
        Ok(())
    }

    /// Read and validate a package from a file.
    pub fn load(path: &Path) -> Result<Self, PackageDefect> {
        Self::from_json_slice(&std::fs::read(path)?)
    }
}
