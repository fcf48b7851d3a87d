//! # tessera CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Offline commands (`keygen`, `mint`, `send`, `verify`) never touch the
//! network; `receive` and `status` talk to the ledger aggregator.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tessera_cli::keys::{run_keygen, KeygenArgs};
use tessera_cli::mint::{run_mint, MintArgs};
use tessera_cli::receive::{run_receive, ReceiveArgs};
use tessera_cli::send::{run_send, SendArgs};
use tessera_cli::status::{run_status, StatusArgs};
use tessera_cli::verify::{run_verify, VerifyArgs};

/// Tessera — offline-capable token transfer over an append-only ledger.
#[derive(Parser, Debug)]
#[command(name = "tessera", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Ledger aggregator base URL (default: $TESSERA_LEDGER_URL or a local
    /// node).
    #[arg(long, global = true)]
    ledger_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a new Ed25519 keypair and print its address.
    Keygen(KeygenArgs),

    /// Mint a new token owned by a local key. Fully offline.
    Mint(MintArgs),

    /// Build an offline transfer package for a recipient address. Fully
    /// offline.
    Send(SendArgs),

    /// Redeem an offline package: submit its commitment and complete the
    /// transfer.
    Receive(ReceiveArgs),

    /// Resolve the ownership status of a held token or package.
    Status(StatusArgs),

    /// Verify a token or package locally, without the ledger.
    Verify(VerifyArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let ledger_url = cli.ledger_url.as_deref();
    let result = match cli.command {
        Commands::Keygen(args) => run_keygen(&args),
        Commands::Mint(args) => run_mint(&args),
        Commands::Send(args) => run_send(&args),
        Commands::Receive(args) => run_receive(&args, ledger_url).await,
        Commands::Status(args) => run_status(&args, ledger_url).await,
        Commands::Verify(args) => run_verify(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
