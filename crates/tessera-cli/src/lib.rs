//! # tessera CLI library
//!
//! Subcommand handlers for the `tessera` binary, one module per command.
//! Each handler returns an exit code: 0 for success, 1 for a negative
//! verdict (invalid token, failed verification), with `anyhow` errors for
//! operational failures.
//!
//! ## File Conventions
//!
//! - `<name>.key` / `<name>.pub` — hex-encoded Ed25519 secret/public key
//! - `<name>.tst` — a token (JSON)
//! - `<name>.tsp` — an offline transfer package (JSON)

use std::path::Path;

use anyhow::{bail, Context, Result};

use tessera_crypto::Ed25519KeyPair;
use tessera_ledger::{HttpLedgerClient, LedgerConfig};
use tessera_token::Token;

pub mod keys;
pub mod mint;
pub mod receive;
pub mod send;
pub mod status;
pub mod verify;

/// Load an Ed25519 key pair from a hex-encoded secret key file.
pub fn load_keypair(path: &Path) -> Result<Ed25519KeyPair> {
    if !path.exists() {
        bail!("key file not found: {}", path.display());
    }
    let hex = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read key file: {}", path.display()))?;
    Ed25519KeyPair::from_secret_hex(hex.trim())
        .map_err(|e| anyhow::anyhow!("invalid key in {}: {e}", path.display()))
}

/// Load a token from a `.tst` file.
pub fn load_token(path: &Path) -> Result<Token> {
    if !path.exists() {
        bail!("token file not found: {}", path.display());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read token: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse token: {}", path.display()))
}

/// Write a token to a `.tst` file.
pub fn save_token(token: &Token, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(token).context("failed to serialize token")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write token: {}", path.display()))
}

/// Read a JSON document from a file.
pub fn load_json(path: &Path) -> Result<serde_json::Value> {
    if !path.exists() {
        bail!("file not found: {}", path.display());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse JSON: {}", path.display()))
}

/// Build the ledger client from an explicit URL or the environment.
pub fn ledger_client(url: Option<&str>) -> Result<HttpLedgerClient> {
    let config = match url {
        Some(url) => LedgerConfig::for_base_url(
            url.parse()
                .map_err(|e| anyhow::anyhow!("invalid ledger URL {url}: {e}"))?,
        ),
        None => LedgerConfig::from_env().context("failed to load ledger configuration")?,
    };
    HttpLedgerClient::new(config).map_err(|e| anyhow::anyhow!("failed to build ledger client: {e}"))
}
