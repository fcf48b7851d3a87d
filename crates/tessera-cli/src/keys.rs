//! # Keygen Subcommand
//!
//! Generates an Ed25519 keypair, writes the hex-encoded secret and public
//! key files, and prints the address other parties send tokens to.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use tessera_crypto::Ed25519KeyPair;
use tessera_token::OwnerPredicate;

/// Arguments for `tessera keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Output directory for the keypair files.
    #[arg(long, short, default_value = ".")]
    pub output: PathBuf,
    /// Prefix for the key filenames.
    #[arg(long, default_value = "tessera")]
    pub prefix: String,
}

/// Execute `tessera keygen`.
pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    cmd_keygen(&args.output, &args.prefix)
}

fn cmd_keygen(output_dir: &Path, prefix: &str) -> Result<u8> {
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "failed to create output directory: {}",
            output_dir.display()
        )
    })?;

    let keys = Ed25519KeyPair::generate();
    let predicate = OwnerPredicate::new(keys.public_key());

    let sk_hex: String = keys
        .secret_bytes()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect();
    let pk_hex = keys.public_key().to_hex();

    let sk_path = output_dir.join(format!("{prefix}.key"));
    let pk_path = output_dir.join(format!("{prefix}.pub"));

    std::fs::write(&sk_path, &sk_hex)
        .with_context(|| format!("failed to write secret key: {}", sk_path.display()))?;
    std::fs::write(&pk_path, &pk_hex)
        .with_context(|| format!("failed to write public key: {}", pk_path.display()))?;

    println!("OK: generated Ed25519 keypair");
    println!("  Secret key: {}", sk_path.display());
    println!("  Public key: {}", pk_path.display());
    println!("  Address:    {}", predicate.address());

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keygen_creates_loadable_keys() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cmd_keygen(dir.path(), "test").unwrap(), 0);

        let keys = crate::load_keypair(&dir.path().join("test.key")).unwrap();
        let pk_hex = std::fs::read_to_string(dir.path().join("test.pub")).unwrap();
        assert_eq!(keys.public_key().to_hex(), pk_hex);
    }
}
