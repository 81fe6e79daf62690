//! Command-line driver for the firmsim labor market simulation.
//!
//! Loads configuration (YAML file plus flag overrides), generates the
//! synthetic candidate pool, staffs the firm and runs the step loop, then
//! prints the collected metrics and the final training tables.
//!
//! # Startup Sequence
//!
//! 1. Parse flags and initialize structured logging (tracing, to stderr)
//! 2. Load and validate configuration
//! 3. Generate the candidate pool and staff the firm
//! 4. Run the simulation loop
//! 5. Assemble the final tables and print the report to stdout

mod cli;
mod error;
mod report;

use clap::Parser;
use firmsim_core::company::CompanyModel;
use firmsim_core::runner::{self, NoOpCallback};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, LogLevel};
use crate::error::EngineError;
use crate::report::Report;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, model construction, a halting step,
/// or report output fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.log_level);
    run(&cli)?;
    Ok(())
}

fn init_tracing(level: Option<LogLevel>) {
    let filter = level.map_or_else(
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        |level| EnvFilter::new(level.as_directive()),
    );
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn run(cli: &Cli) -> Result<(), EngineError> {
    info!("firmsim starting");

    let config = cli.load_config()?;
    config.validate()?;
    info!(
        workers = config.generator.num_workers,
        employees = config.company.n_employees,
        managers = config.company.n_managers,
        gap = config.company.gap,
        steps = config.simulation.steps,
        seed = config.company.seed,
        "Configuration loaded"
    );

    let mut source = config.data_source()?;
    let mut model = CompanyModel::from_config(&config, &mut source)?;

    let result = runner::run_simulation(
        &mut model,
        config.simulation.steps,
        config.simulation.halt_on_error,
        &mut NoOpCallback,
    )?;
    runner::log_simulation_end(&result);

    let training_data = model.training_data(&config.dataset)?;
    let report = Report::new(&model, &result, training_data);
    let stdout = std::io::stdout();
    report.write(cli.format, &mut stdout.lock())?;
    Ok(())
}
