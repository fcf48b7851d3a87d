//! # Status Subcommand
//!
//! Resolves the ownership status of a held token (`.tst`) or package
//! (`.tsp`) against the ledger. A package is queried with its pending
//! commitment in hand; a bare token without one.
//!
//! `indeterminate` is not a failure of the token — it means the ledger gave
//! no verifiable answer and the query should be retried later.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use tessera_token::{OwnershipStatus, Token, TransferCommitment};
use tessera_transfer::{query_ownership, OfflinePackage};

/// Arguments for `tessera status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Path to a token (.tst) or package (.tsp) file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Execute `tessera status`.
pub async fn run_status(args: &StatusArgs, ledger_url: Option<&str>) -> Result<u8> {
    let (token, pending) = load_holding(&args.file)?;
    let gateway = crate::ledger_client(ledger_url)?;

    let status = query_ownership(&gateway, &token, pending.as_ref())
        .await
        .map_err(|e| anyhow::anyhow!("status query failed: {e}"))?;

    println!("Status: {status}");
    match status {
        OwnershipStatus::Current => println!("You own this token; transfer is permitted."),
        OwnershipStatus::PendingTransfer => {
            println!("A transfer is signed but not yet redeemed; building a replacement is permitted.")
        }
        OwnershipStatus::Confirmed => {
            println!("The ledger confirms this copy's latest transfer.")
        }
        OwnershipStatus::Outdated => {
            println!("This copy's state has been spent; obtain the current copy from its holder.")
        }
        OwnershipStatus::Indeterminate => {
            println!("No verifiable ledger answer; retry later.")
        }
    }
    Ok(0)
}

/// Interpret the file as a package first, falling back to a bare token.
fn load_holding(path: &std::path::Path) -> Result<(Token, Option<TransferCommitment>)> {
    if let Ok(package) = OfflinePackage::load(path) {
        return Ok((package.token, Some(package.pending)));
    }
    let token = crate::load_token(path)?;
    Ok((token, None))
}
