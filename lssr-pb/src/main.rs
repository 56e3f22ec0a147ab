//! lssr-pb - Personal Best restoration for LiveSplit splits files
//!
//! Opens a `.lss` file, lets the user pick a finished run from the attempt
//! history and rewrites the Personal Best splits from it.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use lssr_common::config::{load_config, ConfigSource, TomlConfig};
use lssr_pb::cli::{self, Console, RestoreOptions};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for lssr-pb
#[derive(Parser, Debug)]
#[command(name = "lssr-pb")]
#[command(about = "Restore LiveSplit Personal Best splits from a recorded run")]
#[command(version)]
struct Args {
    /// Splits file to restore
    input: PathBuf,

    /// Attempt id to restore (prompted for when omitted)
    #[arg(short, long)]
    attempt: Option<String>,

    /// Output file (prompted for when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Save without asking for confirmation
    #[arg(short, long)]
    yes: bool,

    /// Show the proposed changes but never save
    #[arg(long)]
    dry_run: bool,

    /// List restorable runs and exit
    #[arg(short, long)]
    list: bool,

    /// Also write the proposed changes as JSON
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long, env = "LSSR_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match startup(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let options = RestoreOptions {
        input: args.input,
        attempt: args.attempt,
        output: args.output,
        assume_yes: args.yes,
        dry_run: args.dry_run,
        list_only: args.list,
        export: args.export,
        restore: config.restore,
    };

    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout());
    match cli::run_session(&options, &mut console) {
        Ok(outcome) => {
            debug!("Session ended: {:?}", outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("ERROR: {} [Code {}]", e, e.exit_code());
            ExitCode::from(e.exit_code())
        }
    }
}

/// Load configuration and install the log subscriber
fn startup(args: &Args) -> Result<TomlConfig> {
    let (config, source) =
        load_config(args.config.as_deref()).context("Failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .context("Invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialize logging")?;

    info!(
        "lssr-pb v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &source {
        ConfigSource::File(path) => info!("Loaded configuration from {}", path.display()),
        ConfigSource::Missing(path) => warn!(
            "Configuration file {} not found, using defaults",
            path.display()
        ),
        ConfigSource::Defaults => debug!("No configuration file found, using defaults"),
    }
    Ok(config)
}
