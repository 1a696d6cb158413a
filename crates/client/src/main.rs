//! `partysim` command line entry point.
//!
//! Loads a scenario file, runs a batch of independent trials and prints the
//! aggregated report.
//!
//! # Examples
//!
//! ```bash
//! # 500 trials on 8 workers, JSON report
//! partysim run scenarios/electro.toml -n 500 -w 8 --format json
//!
//! # Check a scenario without running it
//! partysim validate scenarios/electro.ron
//! ```

mod logging;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use runtime::{BatchRunner, RuntimeConfig};
use sim_content::{KitRegistry, ScenarioFactory, ScenarioLoader};

use output::OutputFormat;

/// Frame-accurate party combat simulator
#[derive(Parser)]
#[command(name = "partysim")]
#[command(about = "Runs combat scenarios and reports damage statistics", long_about = None)]
#[command(version)]
struct Cli {
    /// Also write logs to this directory
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Run a batch of trials and print the report
    Run(RunArgs),

    /// Parse and validate a scenario without running it
    Validate {
        /// Scenario file (.toml or .ron)
        #[arg(value_name = "SCENARIO")]
        scenario: PathBuf,
    },

    /// List the registered character kits
    Kits,
}

#[derive(Parser)]
struct RunArgs {
    /// Scenario file (.toml or .ron)
    #[arg(value_name = "SCENARIO")]
    scenario: PathBuf,

    /// Number of trials (overrides the scenario and PARTYSIM_ITERATIONS)
    #[arg(short = 'n', long)]
    iterations: Option<u32>,

    /// Concurrent trials (overrides PARTYSIM_WORKERS)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Base seed (overrides the scenario and PARTYSIM_SEED)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = logging::setup_logging(cli.log_dir.as_deref())?;

    let registry = KitRegistry::with_defaults();
    match cli.command {
        Command::Run(args) => run(args, registry).await,
        Command::Validate { scenario } => {
            let validated = ScenarioLoader::load_validated(&scenario, &registry)?;
            println!(
                "{}: {} characters, {} targets, {} steps, {} frames",
                validated.name,
                validated.characters.len(),
                validated.targets.len(),
                validated.steps.len(),
                validated.limits.duration_frames
            );
            Ok(())
        }
        Command::Kits => {
            for key in registry.keys() {
                println!("{key}");
            }
            Ok(())
        }
    }
}

async fn run(args: RunArgs, registry: KitRegistry) -> Result<()> {
    let scenario = ScenarioLoader::load_validated(&args.scenario, &registry)?;

    // Scenario file, then environment, then flags.
    let mut config = RuntimeConfig::default()
        .with_iterations(scenario.iterations)
        .with_base_seed(scenario.seed)
        .apply_env();
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(seed) = args.seed {
        config.base_seed = seed;
    }

    tracing::info!(
        scenario = %scenario.name,
        iterations = config.iterations,
        workers = config.workers,
        seed = config.base_seed,
        "Starting batch"
    );

    let source = Arc::new(ScenarioFactory::new(scenario, registry));
    let report = BatchRunner::new(config)
        .run(source)
        .await
        .context("batch run failed")?;

    println!("{}", output::render(&report, args.format)?);
    Ok(())
}
