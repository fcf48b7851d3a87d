//! # Receive Subcommand
//!
//! Redeems an offline package: validates it locally, submits the pending
//! commitment to the ledger, polls for the inclusion proof, and writes the
//! completed token.
//!
//! Exit code 1 distinguishes final negative verdicts (defective package,
//! source state already spent, ledger rejection) from operational errors;
//! a timeout prints a retry hint, since resubmission is idempotent.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use tessera_transfer::{OfflinePackage, SubmitError, Submitter};

/// Arguments for `tessera receive`.
#[derive(Args, Debug)]
pub struct ReceiveArgs {
    /// Path to the recipient's secret key file.
    #[arg(long)]
    pub key: PathBuf,
    /// Path to the offline package file.
    #[arg(long)]
    pub package: PathBuf,
    /// Optional JSON file with the new state's data (required when the
    /// commitment binds a data hash).
    #[arg(long)]
    pub data: Option<PathBuf>,
    /// Output path for the received token file.
    #[arg(long, short, default_value = "received.tst")]
    pub output: PathBuf,
}

/// Execute `tessera receive`.
pub async fn run_receive(args: &ReceiveArgs, ledger_url: Option<&str>) -> Result<u8> {
    let keys = crate::load_keypair(&args.key)?;
    let data = args.data.as_deref().map(crate::load_json).transpose()?;

    let package = match OfflinePackage::load(&args.package) {
        Ok(package) => package,
        Err(defect) => {
            println!("FAIL: package is defective: {defect}");
            println!("Ask the sender to re-issue it; retrying will not help.");
            return Ok(1);
        }
    };

    let submitter = Submitter::new(crate::ledger_client(ledger_url)?);
    match submitter.submit(package, &keys, data).await {
        Ok(token) => {
            crate::save_token(&token, &args.output)?;
            println!("OK: transfer complete");
            println!("  Token id: {}", token.id());
            println!("  File:     {}", args.output.display());
            Ok(0)
        }
        Err(SubmitError::AlreadySpent { reason }) => {
            println!("FAIL: the token was already transferred elsewhere: {reason}");
            Ok(1)
        }
        Err(SubmitError::Rejected { status, body }) => {
            println!("FAIL: ledger rejected the commitment ({status}): {body}");
            Ok(1)
        }
        Err(e @ SubmitError::Timeout { .. }) => {
            println!("PENDING: {e}");
            println!("Run receive again with the same package; resubmission is safe.");
            Ok(1)
        }
        Err(e) => Err(e.into()),
    }
}
