//! Credtrail CLI — issue, verify, revoke, and audit credentials.
//!
//! Every command except `init` opens the RocksDB ledger under the configured
//! data directory, runs one contract operation, and prints the result as JSON
//! on stdout. Logs go to stderr.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use config::CredtrailConfig;
use credtrail_contract::CredentialContract;
use credtrail_ledger::Ledger;

/// Credtrail — credential lifecycle with an append-only audit trail.
#[derive(Parser, Debug)]
#[command(name = "credtrail", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, global = true, default_value = "credtrail.toml")]
    config: PathBuf,

    /// Override the ledger data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file.
    Init(commands::init::InitArgs),
    /// Issue a credential to a holder.
    Issue(commands::issue::IssueArgs),
    /// Verify a credential.
    Verify(commands::verify::VerifyArgs),
    /// Revoke a credential.
    Revoke(commands::revoke::RevokeArgs),
    /// Page through a holder's audit trail.
    Audit(commands::audit::AuditArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = CredtrailConfig::load(&cli.config)?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(data_dir) = &cli.data_dir {
        config.storage.data_dir = data_dir.clone();
    }

    init_tracing(&config);

    if let Commands::Init(args) = &cli.command {
        return commands::init::run(args, &cli.config);
    }

    let ledger = Ledger::open(&config.storage.data_dir)?;
    tracing::debug!(
        data_dir = %config.storage.data_dir.display(),
        height = ledger.height()?,
        "ledger opened"
    );
    let contract = CredentialContract::new(Arc::new(ledger)).with_config(config.contract);

    match &cli.command {
        Commands::Init(_) => Ok(()),
        Commands::Issue(args) => print_json(&commands::issue::run(args, &contract)?),
        Commands::Verify(args) => print_json(&commands::verify::run(args, &contract)?),
        Commands::Revoke(args) => print_json(&commands::revoke::run(args, &contract)?),
        Commands::Audit(args) => print_json(&commands::audit::run(args, &contract)?),
    }
}

fn init_tracing(config: &CredtrailConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if config.logging.is_json() {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
