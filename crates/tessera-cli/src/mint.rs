//! # Mint Subcommand
//!
//! Mints a new token owned by a local key. Minting is entirely local — the
//! token gains its first ledger footprint only when its genesis state is
//! spent by a transfer.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use tessera_core::TokenTypeId;
use tessera_token::Token;

/// Arguments for `tessera mint`.
#[derive(Args, Debug)]
pub struct MintArgs {
    /// Path to the minter's secret key file.
    #[arg(long)]
    pub key: PathBuf,
    /// Token type descriptor (e.g. "grain-lot").
    #[arg(long)]
    pub token_type: String,
    /// Optional JSON file with data to bind into the initial state.
    #[arg(long)]
    pub data: Option<PathBuf>,
    /// Output path for the token file.
    #[arg(long, short, default_value = "token.tst")]
    pub output: PathBuf,
}

/// Execute `tessera mint`.
pub fn run_mint(args: &MintArgs) -> Result<u8> {
    let keys = crate::load_keypair(&args.key)?;
    let data = args.data.as_deref().map(crate::load_json).transpose()?;

    let token = Token::mint(&keys, TokenTypeId::new(&args.token_type), data)
        .context("failed to mint token")?;
    crate::save_token(&token, &args.output)?;

    println!("OK: minted token");
    println!("  Token id: {}", token.id());
    println!("  Type:     {}", token.genesis.token_type);
    println!("  Owner:    {}", token.state.predicate.address());
    println!("  File:     {}", args.output.display());
    Ok(0)
}
