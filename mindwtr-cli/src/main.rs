//! Mindwtr snapshot merge and sync
//!
//! Usage:
//!   mindwtr-sync merge local.json incoming.json -o merged.json --stats
//!   mindwtr-sync sync --config sync.json

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use mindwtr_cli::{
    describe_outcome, merge_files, resolve_config, run_sync, write_merged, SyncOverrides,
};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "mindwtr-sync")]
#[command(about = "Merge and sync Mindwtr snapshots")]
struct Args {
    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Merge two snapshot files
    Merge {
        /// Snapshot that wins timestamp ties
        local: PathBuf,

        /// Snapshot to merge in
        incoming: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print merge stats as JSON to stderr
        #[arg(long)]
        stats: bool,

        /// Write compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Run one sync cycle
    Sync {
        /// Path to the sync config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Local data file, overriding the config
        #[arg(long)]
        local: Option<PathBuf>,

        /// Shared target file, overriding the config
        #[arg(long)]
        target: Option<PathBuf>,

        /// Do not upload to an empty target
        #[arg(long)]
        no_seed: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match args.command {
        Command::Merge {
            local,
            incoming,
            output,
            stats,
            compact,
        } => {
            let result = merge_files(&local, &incoming).await?;
            info!("Merged: {}", result.stats);

            if let Some(bytes) = write_merged(&result.data, output.as_deref(), !compact).await? {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&bytes)?;
                writeln!(stdout)?;
            }
            if stats {
                eprintln!("{}", serde_json::to_string_pretty(&result.stats)?);
            }
        }
        Command::Sync {
            config,
            local,
            target,
            no_seed,
        } => {
            let overrides = SyncOverrides {
                local,
                target,
                no_seed,
            };
            let config = resolve_config(config.as_deref(), overrides).await?;
            let outcome = run_sync(&config).await?;

            let summary = describe_outcome(&outcome);
            if !outcome.is_success() {
                bail!(summary);
            }
            info!("{summary}");
        }
    }

    Ok(())
}
