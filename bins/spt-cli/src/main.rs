//! spt-cli — Command-line interface for the SPT asset index.
//!
//! Applies JSON-encoded blocks to a RocksDB balance store (connect or
//! disconnect) and queries stored balances.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use spt_core::address::{self, witness_script};
use spt_core::traits::{AddressResolver, BalanceStore};
use spt_core::types::{AddressDescriptor, BalanceDetail, BlockData, Direction};
use spt_ledger::Reconciler;
use spt_store::config::init_logging;
use spt_store::{IndexerConfig, RocksBalanceStore};
use tracing::info;

/// SPT asset index command-line interface.
#[derive(Parser, Debug)]
#[command(name = "spt-cli", version, about = "Asset balance reconciliation for the SPT index")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory for the balance database
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format ("text" or "json")
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Human-readable part for rendered addresses
    #[arg(long, global = true)]
    hrp: Option<String>,
}

impl GlobalArgs {
    /// Load the layered config, then apply command-line overrides.
    fn into_config(self) -> Result<IndexerConfig> {
        let mut config = IndexerConfig::load(self.config.as_deref())?;
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if let Some(hrp) = self.hrp {
            config.address_hrp = hrp;
        }
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply a block's asset payloads and commit the balances.
    Connect(BlockArgs),
    /// Reverse a block's asset payloads and commit the balances.
    Disconnect(BlockArgs),
    /// Print the stored balance of an address as JSON.
    Balance(BalanceArgs),
}

#[derive(Args, Debug)]
struct BlockArgs {
    /// Path to a JSON-encoded block
    block: PathBuf,

    /// Run the pass and print its summary without committing
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct BalanceArgs {
    /// Hex output script or Bech32 witness address
    address: String,

    /// Only print the tx counter
    #[arg(long)]
    summary: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.global.into_config()?;
    init_logging(&config.log_level, &config.log_format);

    let reconciler = Reconciler::with_hrp(&config.address_hrp);
    let db_path = config.db_path();
    let mut store = RocksBalanceStore::open(&db_path)
        .with_context(|| format!("opening balance store at {}", db_path.display()))?;

    match cli.command {
        Commands::Connect(args) => run_pass(&reconciler, &mut store, Direction::Connect, &args),
        Commands::Disconnect(args) => run_pass(&reconciler, &mut store, Direction::Disconnect, &args),
        Commands::Balance(args) => show_balance(&reconciler, &store, &args),
    }
}

fn read_block(path: &Path) -> Result<BlockData> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing block JSON in {}", path.display()))
}

fn run_pass(
    reconciler: &Reconciler,
    store: &mut RocksBalanceStore,
    direction: Direction,
    args: &BlockArgs,
) -> Result<()> {
    let block = read_block(&args.block)?;
    let outcome = match direction {
        Direction::Connect => reconciler.connect_block(&*store, &block)?,
        Direction::Disconnect => reconciler.disconnect_block(&*store, &block)?,
    };
    println!("{}", serde_json::to_string_pretty(&outcome.summary)?);

    if args.dry_run {
        info!(height = block.height, "dry run, nothing committed");
        return Ok(());
    }
    store.commit(outcome.balances)?;
    store.flush()?;
    info!(height = block.height, %direction, "pass committed");
    Ok(())
}

/// Accept a hex output script or a Bech32/Bech32m witness address.
fn parse_descriptor(input: &str) -> Result<AddressDescriptor> {
    if let Ok(descriptor) = AddressDescriptor::from_hex(input) {
        if !descriptor.is_empty() {
            return Ok(descriptor);
        }
    }
    match address::decode(input) {
        Ok((_, witness)) => Ok(AddressDescriptor::from(witness_script(&witness))),
        Err(e) => bail!("not a hex script or witness address: {input} ({e})"),
    }
}

fn show_balance(reconciler: &Reconciler, store: &RocksBalanceStore, args: &BalanceArgs) -> Result<()> {
    let descriptor = parse_descriptor(&args.address)?;
    let detail = if args.summary { BalanceDetail::Summary } else { BalanceDetail::AssetsIndexed };
    let balance = store.get_balance(&descriptor, detail)?;
    let report = serde_json::json!({
        "address": reconciler.resolver().describe(&descriptor),
        "descriptor": descriptor,
        "balance": balance,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
