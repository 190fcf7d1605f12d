//! ChainVerify CLI: describe what signing a raw transaction would do.
//!
//! # Commands
//! ```text
//! chainverify verify    <input>
//! chainverify evm-data  <chain-id> <to> <data>
//! chainverify registry  --out <path.json> [--chain-id <id>...]
//! chainverify networks
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use chainverify::tracing_setup::init_tracing;
use chainverify::{Verifier, VerifierConfig};

mod cmd_registry;
mod cmd_verify;

#[derive(Parser)]
#[command(
    name = "chainverify",
    about = "Inspect a raw transaction before signing it",
    long_about = "
ChainVerify CLI: decode a raw EVM or Avalanche-family (P/C chain) transaction
and report its network, type, recipients, amounts, fee, decoded contract call
and warnings. Input may be hex, base64 or gzip-compressed hex.

An empty result means the transaction could not be verified. Do not trust
any inferred meaning of such a transaction.
",
    version
)]
struct Cli {
    /// YAML configuration file (defaults to the built-in Flare networks)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a raw transaction
    Verify {
        /// Transaction bytes: hex (0x optional), base64 or gzip-compressed hex
        input: String,
        /// Print the result on one line
        #[arg(long)]
        compact: bool,
    },

    /// Verify a contract call given only its chain, target and calldata
    #[command(name = "evm-data")]
    EvmData {
        /// EVM chain id, e.g. 14 for Flare Mainnet
        chain_id: u64,
        /// Contract address
        to: String,
        /// Calldata (0x-prefixed hex)
        data: String,
    },

    /// Build the contract registry from the platform deployment lists
    Registry {
        /// Output JSON file
        #[arg(long, default_value = "contracts.json")]
        out: PathBuf,
        /// Only these chain ids (default: every configured network)
        #[arg(long = "chain-id")]
        chain_ids: Vec<u64>,
    },

    /// List the configured networks
    Networks,
}

fn load_config(path: Option<&PathBuf>) -> Result<VerifierConfig> {
    match path {
        Some(p) => VerifierConfig::from_file(p).with_context(|| format!("load config '{}'", p.display())),
        None => Ok(VerifierConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_ref())?;
    if cli.verbose {
        config.log.level = "debug".into();
    }
    init_tracing(&config.log);

    match cli.command {
        Commands::Verify { input, compact } => {
            let verifier = Verifier::from_config(&config).context("build verifier")?;
            cmd_verify::run(&verifier, &input, compact).await
        }

        Commands::EvmData { chain_id, to, data } => {
            let verifier = Verifier::from_config(&config).context("build verifier")?;
            cmd_verify::run_evm_data(&verifier, chain_id, &to, &data).await
        }

        Commands::Registry { out, chain_ids } => cmd_registry::run(&config, &out, &chain_ids).await,

        Commands::Networks => cmd_networks(&config),
    }
}

fn cmd_networks(config: &VerifierConfig) -> Result<()> {
    println!("EVM networks:");
    for n in &config.evm_networks {
        println!(
            "  {:>6}  {:28} {}  explorer={}  contracts={}",
            n.chain_id,
            n.name,
            n.rpc_url,
            n.explorer_api_url.as_deref().unwrap_or("-"),
            n.repository_code.as_deref().unwrap_or("-"),
        );
    }
    println!();
    println!("Ledger networks:");
    for n in &config.ledger_networks {
        let context = if n.context.is_some() { "static" } else { "rpc" };
        println!("  {:>6}  {:28} {}  hrp={}  context={}", n.network_id, n.name, n.api_url, n.hrp, context);
    }
    Ok(())
}
