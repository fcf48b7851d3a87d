//! # Send Subcommand
//!
//! Builds an offline transfer package: signs a commitment transferring a
//! held token to a recipient address and bundles it with the token. Fully
//! offline — the package file travels to the recipient out of band (USB
//! stick, QR, local radio, whatever the deployment has).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use tessera_core::{sha256_digest, Address, CanonicalBytes};
use tessera_transfer::{build_commitment, OfflinePackage, TransferOptions};

/// Arguments for `tessera send`.
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Path to the sender's secret key file.
    #[arg(long)]
    pub key: PathBuf,
    /// Path to the token file being transferred.
    #[arg(long)]
    pub token: PathBuf,
    /// Recipient address (tess:...).
    #[arg(long)]
    pub to: String,
    /// Optional JSON file whose digest the recipient's new state data must
    /// match.
    #[arg(long)]
    pub bind_data: Option<PathBuf>,
    /// Optional free-form message to the recipient.
    #[arg(long)]
    pub message: Option<String>,
    /// Output path for the package file.
    #[arg(long, short, default_value = "transfer.tsp")]
    pub output: PathBuf,
}

/// Execute `tessera send`.
pub fn run_send(args: &SendArgs) -> Result<u8> {
    let keys = crate::load_keypair(&args.key)?;
    let token = crate::load_token(&args.token)?;
    let recipient =
        Address::parse(&args.to).map_err(|e| anyhow::anyhow!("invalid recipient address: {e}"))?;

    let recipient_data_hash = match &args.bind_data {
        Some(path) => {
            let data = crate::load_json(path)?;
            let canonical =
                CanonicalBytes::new(&data).context("failed to canonicalize bound data")?;
            Some(sha256_digest(&canonical))
        }
        None => None,
    };

    let pending = build_commitment(
        &keys,
        &token,
        recipient,
        TransferOptions {
            recipient_data_hash,
            message: args.message.clone(),
            ..TransferOptions::default()
        },
    )
    .map_err(|e| anyhow::anyhow!("failed to build commitment: {e}"))?;

    let request_id = pending.request_id;
    let package = OfflinePackage::assemble(token, pending)
        .map_err(|e| anyhow::anyhow!("failed to assemble package: {e}"))?;
    package
        .save(&args.output)
        .map_err(|e| anyhow::anyhow!("failed to write package: {e}"))?;

    println!("OK: built offline transfer package");
    println!("  Request id: {request_id}");
    println!("  Recipient:  {}", package.pending.recipient);
    println!("  File:       {}", args.output.display());
    println!("Hand the package file to the recipient out of band.");
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::TokenTypeId;
    use tessera_crypto::Ed25519KeyPair;
    use tessera_token::{OwnerPredicate, Token};

    #[test]
    fn send_writes_a_valid_package() {
        let dir = tempfile::tempdir().unwrap();
        let owner = Ed25519KeyPair::generate();
        let key_path = dir.path().join("owner.key");
        let sk_hex: String = owner
            .secret_bytes()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();
        std::fs::write(&key_path, sk_hex).unwrap();

        let token = Token::mint(&owner, TokenTypeId::new("grain-lot"), None).unwrap();
        let token_path = dir.path().join("token.tst");
        crate::save_token(&token, &token_path).unwrap();

        let recipient = OwnerPredicate::new(Ed25519KeyPair::generate().public_key());
        let args = SendArgs {
            key: key_path,
            token: token_path,
            to: recipient.address().to_string(),
            bind_data: None,
            message: Some("for invoice 41".into()),
            output: dir.path().join("transfer.tsp"),
        };
        assert_eq!(run_send(&args).unwrap(), 0);

        let package = OfflinePackage::load(&args.output).unwrap();
        assert_eq!(package.pending.recipient, recipient.address());
        assert_eq!(package.pending.message.as_deref(), Some("for invoice 41"));
    }

    #[test]
    fn send_rejects_a_malformed_address() {
        let dir = tempfile::tempdir().unwrap();
        let owner = Ed25519KeyPair::generate();
        let key_path = dir.path().join("owner.key");
        let sk_hex: String = owner
            .secret_bytes()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();
        std::fs::write(&key_path, sk_hex).unwrap();
        let token = Token::mint(&owner, TokenTypeId::new("grain-lot"), None).unwrap();
        let token_path = dir.path().join("token.tst");
        crate::save_token(&token, &token_path).unwrap();

        let args = SendArgs {
            key: key_path,
            token: token_path,
            to: "bogus:address".into(),
            bind_data: None,
            message: None,
            output: dir.path().join("transfer.tsp"),
        };
        assert!(run_send(&args).is_err());
    }
}
