//! `mnemo` command-line entry point.

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;
use mnemo_rs::Settings;
use mnemo_rs::commands::{analytics, check, cleanup, init, selftest, sync};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

/// Command-line options for the memory maintenance tool.
#[derive(Parser)]
#[command(name = "mnemo", version, about = "Maintain a shared agent memory store")]
struct Cli {
    /// Optional path to a mnemo.json5 file applied over the layered config
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the memory layout, schema, initial records and agent profiles
    Init,
    /// Verify the layout and initial records
    Check,
    /// Delete expired session records and low-value records
    Cleanup,
    /// Print record counts by category, type, priority and agent
    Analytics,
    /// Run the end-to-end self-test and write test_results.json
    Selftest,
    /// Push records to the configured vector-memory service
    Sync,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    mnemo_rs::init_logging();

    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("failed to resolve current working directory")?;
    let settings = Settings::load(&cwd, cli.config.as_deref())?;
    info!(
        "running command (memory_root={}, config_set={})",
        settings.memory_root().display(),
        cli.config.is_some()
    );

    let mut stdout = io::stdout();
    let out: &mut dyn io::Write = &mut stdout;
    let succeeded = match cli.command {
        Command::Init => init::run(&settings, out)?,
        Command::Check => check::run(&settings, out)?,
        Command::Cleanup => cleanup::run(&settings, out)?,
        Command::Analytics => analytics::run(&settings, out)?,
        Command::Selftest => selftest::run(&settings, out)?.failed == 0,
        Command::Sync => sync::run(&settings, out).await?,
    };
    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
