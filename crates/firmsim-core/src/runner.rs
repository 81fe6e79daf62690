//! Bounded simulation loop.
//!
//! [`run_simulation`] drives [`CompanyModel::step`] a fixed number of times.
//! A failed step either ends the run or is logged and skipped, depending on
//! `halt_on_error`; it is never retried, since the randomness it consumed
//! cannot be replayed.

use tracing::{error, info, warn};

use crate::company::{CompanyModel, StepError, StepSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A step failed and the run was configured to halt.
    #[error("simulation halted: {source}")]
    Step {
        /// The underlying step error.
        #[from]
        source: StepError,
    },
}

/// Outcome of a completed run.
#[derive(Debug)]
pub struct SimulationResult {
    /// Steps attempted, including failed ones.
    pub steps_run: u64,
    /// Steps that failed and were skipped.
    pub failures: Vec<StepError>,
    /// Aggregate productivity after the last step.
    pub final_productivity: f64,
}

/// Callback invoked after each step completes.
pub trait StepCallback {
    /// Called after a step completes successfully.
    fn on_step(&mut self, summary: &StepSummary, model: &CompanyModel);
}

/// A no-op step callback.
pub struct NoOpCallback;

impl StepCallback for NoOpCallback {
    fn on_step(&mut self, _summary: &StepSummary, _model: &CompanyModel) {}
}

/// Run `steps` steps of `model`.
///
/// # Errors
///
/// Returns [`RunnerError::Step`] on the first failed step when
/// `halt_on_error` is set. Otherwise failures are logged, collected in
/// [`SimulationResult::failures`], and the run continues.
pub fn run_simulation(
    model: &mut CompanyModel,
    steps: u64,
    halt_on_error: bool,
    callback: &mut dyn StepCallback,
) -> Result<SimulationResult, RunnerError> {
    info!(
        steps,
        halt_on_error,
        start_step = model.current_step(),
        "Simulation starting"
    );

    let mut failures = Vec::new();
    let mut steps_run: u64 = 0;

    for _ in 0..steps {
        let outcome = model.step();
        steps_run = steps_run.saturating_add(1);
        match outcome {
            Ok(summary) => callback.on_step(&summary, model),
            Err(err) if halt_on_error => return Err(err.into()),
            Err(err) => {
                error!(step = err.step, phase = %err.phase, %err, "Step failed, continuing");
                failures.push(err);
            }
        }
    }

    Ok(SimulationResult {
        steps_run,
        failures,
        final_productivity: model.current_productivity(),
    })
}

/// Log the end-of-run summary.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        steps_run = result.steps_run,
        failures = result.failures.len(),
        final_productivity = result.final_productivity,
        "Simulation ended"
    );
    if result.steps_run == 0 {
        warn!("Simulation ended with no steps executed");
    }
}
