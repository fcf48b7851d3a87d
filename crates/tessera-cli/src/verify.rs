//! # Verify Subcommand
//!
//! Local verification of a token or package file: genesis signature, chain
//! linkage, inclusion proofs on completed records, and (for a package) the
//! pending commitment against the current state. Never consults the ledger
//! — this is the check a recipient runs on a package received out of band
//! before deciding to redeem it.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use tessera_token::validate_token;
use tessera_transfer::{OfflinePackage, PackageDefect};

/// Arguments for `tessera verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Path to a token (.tst) or package (.tsp) file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Execute `tessera verify`.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    if args.file.extension().is_some_and(|e| e == "tsp") {
        return verify_package(&args.file);
    }
    verify_token(&args.file)
}

fn verify_package(path: &Path) -> Result<u8> {
    match OfflinePackage::load(path) {
        Ok(package) => {
            println!("OK: package is valid");
            println!("  Token id:   {}", package.token.id());
            println!("  Transfers:  {}", package.token.transfers.len());
            println!("  Request id: {}", package.pending.request_id);
            println!("  Recipient:  {}", package.pending.recipient);
            Ok(0)
        }
        Err(defect @ (PackageDefect::Encoding(_) | PackageDefect::Io(_))) => {
            println!("FAIL: cannot read package: {defect}");
            Ok(1)
        }
        Err(defect) => {
            println!("FAIL: package is defective: {defect}");
            Ok(1)
        }
    }
}

fn verify_token(path: &Path) -> Result<u8> {
    let token = crate::load_token(path)?;
    match validate_token(&token) {
        Ok(()) => {
            println!("OK: token proof chain is valid");
            println!("  Token id:  {}", token.id());
            println!("  Type:      {}", token.genesis.token_type);
            println!("  Transfers: {}", token.transfers.len());
            println!("  Owner:     {}", token.state.predicate.address());
            Ok(0)
        }
        Err(e) => {
            println!("FAIL: token proof chain invalid: {e}");
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::TokenTypeId;
    use tessera_crypto::Ed25519KeyPair;
    use tessera_token::Token;

    #[test]
    fn valid_token_verifies_with_exit_zero() {
        let dir = tempfile::tempdir().unwrap();
        let keys = Ed25519KeyPair::generate();
        let token = Token::mint(&keys, TokenTypeId::new("grain-lot"), None).unwrap();
        let path = dir.path().join("token.tst");
        crate::save_token(&token, &path).unwrap();

        let args = VerifyArgs { file: path };
        assert_eq!(run_verify(&args).unwrap(), 0);
    }

    #[test]
    fn tampered_token_fails_with_exit_one() {
        let dir = tempfile::tempdir().unwrap();
        let keys = Ed25519KeyPair::generate();
        let mut token = Token::mint(&keys, TokenTypeId::new("grain-lot"), None).unwrap();
        token.genesis.token_type = TokenTypeId::new("gold-bar");
        let path = dir.path().join("token.tst");
        crate::save_token(&token, &path).unwrap();

        let args = VerifyArgs { file: path };
        assert_eq!(run_verify(&args).unwrap(), 1);
    }
}
