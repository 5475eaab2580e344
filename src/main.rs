//! Brewup CLI
//!
//! Runs the `homebrew_update` resource from the command line, the way a
//! configuration-management run would converge it.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use config::{Action, ConfigLoader, ResourceConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use update::{HomebrewUpdate, Outcome, StampStatus, UpdateActions};

/// Exit code when brew succeeded but the stamp could not be touched
const EXIT_STAMP_WARNING: u8 = 2;

/// Exit code for any other failure
const EXIT_FAILURE: u8 = 1;

#[derive(Parser, Debug)]
#[command(
    name = "brewup",
    about = "Brewup - keep Homebrew repository metadata fresh",
    version,
    author
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "BREWUP_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Report what would change without changing anything
    #[arg(long = "why-run", global = true)]
    why_run: bool,

    /// Override the refresh frequency in seconds
    #[arg(long, global = true, allow_negative_numbers = true)]
    frequency: Option<i64>,

    /// Override the stamp directory
    #[arg(long = "stamp-dir", global = true)]
    stamp_dir: Option<PathBuf>,

    /// Subcommand to execute (defaults to periodic)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Update the repository if the last update is older than the frequency
    Periodic,
    /// Update the repository unconditionally
    Update,
    /// Run the action named in the configuration
    Run,
    /// Show the update stamp and whether a periodic run would update
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let handler = HomebrewUpdate::new().why_run(cli.why_run);
    let result = match cli.command.as_ref().unwrap_or(&Commands::Periodic) {
        Commands::Periodic => converge(&handler, &config, Action::Periodic, cli.quiet),
        Commands::Update => converge(&handler, &config, Action::Update, cli.quiet),
        Commands::Run => converge(&handler, &config, config.action, cli.quiet),
        Commands::Status { json } => cmd_status(&config, *json).map_err(CliError::Fatal),
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(*shell, &mut command, "brewup", &mut std::io::stdout());
            Ok(())
        }
    };

    match &result {
        Ok(()) => {}
        Err(CliError::Warning(e)) => warn!("{}", e),
        Err(CliError::Fatal(e)) => error!("{:#}", e),
    }
    ExitCode::from(exit_status(&result))
}

#[derive(Debug)]
enum CliError {
    /// The refresh happened, only its bookkeeping failed
    Warning(update::Error),
    Fatal(anyhow::Error),
}

fn load_config(cli: &Cli) -> Result<ResourceConfig> {
    let mut config = match &cli.config {
        Some(path) => ResourceConfig::load_from(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => ConfigLoader::system().validate(false).load()?,
    };

    if let Some(frequency) = cli.frequency {
        config.frequency = frequency;
    }
    if let Some(dir) = &cli.stamp_dir {
        config.stamp_dir = dir.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Process exit status for the result of a command
fn exit_status(result: &Result<(), CliError>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(CliError::Warning(_)) => EXIT_STAMP_WARNING,
        Err(CliError::Fatal(_)) => EXIT_FAILURE,
    }
}

fn converge<H: UpdateActions>(
    handler: &H,
    config: &ResourceConfig,
    action: Action,
    quiet: bool,
) -> Result<(), CliError> {
    match handler.run_action(action, config) {
        Ok(outcome) => {
            report(config, action, &outcome, quiet);
            Ok(())
        }
        Err(e) if e.is_warning() => Err(CliError::Warning(e)),
        Err(e) => Err(CliError::Fatal(
            anyhow::Error::new(e).context(format!("{} action failed", action)),
        )),
    }
}

fn report(config: &ResourceConfig, action: Action, outcome: &Outcome, quiet: bool) {
    info!(
        resource = %update::resource_id(config),
        action = %action,
        updated = outcome.is_updated(),
        "Action complete"
    );
    if !quiet {
        println!("{} ({}): {}", update::resource_id(config), action, outcome);
    }
}

fn cmd_status(config: &ResourceConfig, json: bool) -> Result<()> {
    let status = StampStatus::inspect(config);

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("Homebrew Update Stamp");
    println!("=====================");
    println!("Resource:   {}", update::resource_id(config));
    println!("Stamp:      {}", status.path.display());
    println!("Frequency:  {}s", status.frequency);
    match (status.modified, status.age_secs) {
        (Some(modified), Some(age)) => {
            println!("Last update: {} ({}s ago)", modified.to_rfc3339(), age);
        }
        _ => println!("Last update: never"),
    }
    if let Some(due) = status.next_due {
        println!("Next due:   {}", due.to_rfc3339());
    }
    println!(
        "State:      {}",
        if status.up_to_date { "up to date" } else { "stale" }
    );

    Ok(())
}
