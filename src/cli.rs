//! The command line interface for the simulation.
use crate::input::read_house_records;
use crate::log;
use crate::output::{create_output_directory, get_output_dir};
use crate::parameters::SimulationParameters;
use crate::settings::Settings;
use crate::simulation;
use ::log::info;
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// The command line interface for the simulation.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Commands,
}

/// Options for the run command
#[derive(Args)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run a simulation model.
    Run {
        /// Path to the model directory.
        model_dir: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { model_dir, opts } => handle_run_command(&model_dir, &opts),
        }
    }
}

/// Parse CLI arguments and dispatch to the appropriate command handler
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    cli.command.execute()
}

/// Handle the `run` command.
pub fn handle_run_command(model_dir: &Path, opts: &RunOpts) -> Result<()> {
    let settings = Settings::from_path(model_dir)?;
    log::init(settings.log_level.as_deref()).context("Failed to initialise logging")?;

    let parameters = SimulationParameters::from_path(model_dir)?;
    let records = read_house_records(model_dir)?;
    info!("Model loaded successfully");

    let output_dir = match &opts.output_dir {
        Some(output_dir) => output_dir.clone(),
        None => get_output_dir(model_dir)?,
    };
    if output_dir.is_dir() && !opts.overwrite {
        bail!(
            "Output directory {} already exists (pass --overwrite to replace its contents)",
            output_dir.display()
        );
    }
    create_output_directory(&output_dir).context("Failed to create output directory")?;

    simulation::run(parameters, records, &output_dir)?;
    info!("Results written to {}", output_dir.display());

    Ok(())
}
