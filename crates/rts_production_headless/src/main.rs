//! Headless production scenario runner.
//!
//! Runs a production scenario without graphics and prints a JSON report.
//! Designed for CI checks and balance iteration.
//!
//! # Usage
//!
//! ```bash
//! # Run a scenario for its default length
//! cargo run -p rts_production_headless -- run --scenario scenarios/skirmish.ron
//!
//! # Override length, write the report and a snapshot
//! cargo run -p rts_production_headless -- run --scenario scenarios/skirmish.ron \
//!     --ticks 3000 --output report.json --snapshot world.bin
//!
//! # Validate a rules file
//! cargo run -p rts_production_headless -- validate --rules data/rules.ron
//! ```
//!
//! Reports go to stdout unless `--output` is given. Logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rts_production::rules::Rules;
use rts_production_headless::{ScenarioError, ScenarioRunner};

#[derive(Parser)]
#[command(name = "rts_production_headless")]
#[command(about = "Headless production scenario runner for CI and balance checks")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario and report the outcome
    Run {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: PathBuf,

        /// Number of ticks to run (defaults to the scenario's own length)
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a bincode world snapshot here
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Parse and validate a rules file
    Validate {
        /// Rules file to check
        #[arg(short, long)]
        rules: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for reports)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    let result = match cli.command {
        Commands::Run {
            scenario,
            ticks,
            output,
            snapshot,
        } => cmd_run(scenario, ticks, output, snapshot),
        Commands::Validate { rules } => cmd_validate(rules),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "Command failed");
            ExitCode::FAILURE
        }
    }
}

/// Run a scenario
fn cmd_run(
    scenario: PathBuf,
    ticks: Option<u64>,
    output: Option<PathBuf>,
    snapshot: Option<PathBuf>,
) -> Result<(), ScenarioError> {
    let mut runner = ScenarioRunner::from_file(&scenario)?;
    let ticks = ticks.unwrap_or_else(|| runner.default_ticks());
    tracing::info!(scenario = %scenario.display(), ticks, "Running scenario");

    let report = runner.run(ticks);

    match output {
        Some(path) => {
            report.write(&path)?;
            tracing::info!(path = %path.display(), "Report written");
        }
        None => println!("{}", report.to_json()?),
    }

    if let Some(path) = snapshot {
        let bytes = runner.world().snapshot().to_bytes()?;
        std::fs::write(&path, bytes)?;
        tracing::info!(path = %path.display(), "Snapshot written");
    }

    Ok(())
}

/// Validate a rules file
fn cmd_validate(rules: PathBuf) -> Result<(), ScenarioError> {
    let loaded = Rules::load(&rules)?;
    let items = loaded.items().count();
    tracing::info!(path = %rules.display(), items, "Rules valid");
    println!("{}: {items} items OK", rules.display());
    Ok(())
}
