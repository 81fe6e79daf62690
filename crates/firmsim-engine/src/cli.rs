//! Command-line interface of the firmsim binary.
//!
//! Every flag is optional and overrides the matching field of the YAML
//! configuration (or of the defaults when no file is given).

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use firmsim_core::config::SimulationConfig;

use crate::error::EngineError;

/// Simulate hiring, promotion and attrition in a firm with biased perception
/// of productivity, then print metrics and the resulting training tables.
#[derive(Debug, Parser)]
#[command(name = "firmsim", version, about)]
pub struct Cli {
    /// YAML configuration file; flags override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Size of the synthetic candidate pool.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Start-of-run employee headcount.
    #[arg(long)]
    pub employees: Option<usize>,

    /// Start-of-run manager headcount.
    #[arg(long)]
    pub managers: Option<usize>,

    /// Per-step leaving probability of employees.
    #[arg(long)]
    pub employee_leave_prob: Option<f64>,

    /// Per-step leaving probability of managers.
    #[arg(long)]
    pub manager_leave_prob: Option<f64>,

    /// Number of steps to simulate.
    #[arg(long)]
    pub steps: Option<u64>,

    /// Deficit at which hiring and promotion trigger.
    #[arg(long)]
    pub gap: Option<usize>,

    /// Log failed steps and keep running instead of halting.
    #[arg(long, default_value_t = false)]
    pub continue_on_error: bool,

    /// Fraction of the historical population appended to the final tables.
    #[arg(long)]
    pub past_fraction: Option<f64>,

    /// Label the final tables with perceived instead of true productivity.
    #[arg(long, default_value_t = false)]
    pub use_perceived: bool,

    /// Restrict the sensitive table to one attribute.
    #[arg(long)]
    pub sensitive_attribute: Option<String>,

    /// Gender share as `name=proportion`; repeat for each value.
    #[arg(long = "gender", value_parser = parse_proportion)]
    pub gender: Vec<(String, f64)>,

    /// Ethnicity share as `name=proportion`; repeat for each value.
    #[arg(long = "ethnicity", value_parser = parse_proportion)]
    pub ethnicity: Vec<(String, f64)>,

    /// Lower productivity bound of the generator.
    #[arg(long)]
    pub productivity_min: Option<f64>,

    /// Upper productivity bound of the generator.
    #[arg(long)]
    pub productivity_max: Option<f64>,

    /// Seed of the simulation's random stream.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log verbosity; overrides `RUST_LOG`.
    #[arg(long)]
    pub log_level: Option<LogLevel>,

    /// Report format written to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Log verbosity accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Everything, including per-draw detail.
    Trace,
    /// Per-worker transitions.
    Debug,
    /// Per-step progress.
    Info,
    /// Degenerate conditions only.
    Warn,
    /// Failures only.
    Error,
}

impl LogLevel {
    /// Filter directive understood by `EnvFilter`.
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON document.
    Json,
    /// Plain-text tables.
    Text,
}

impl Cli {
    /// Load the configuration file (if any) and apply flag overrides.
    pub fn load_config(&self) -> Result<SimulationConfig, EngineError> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_file(path)?,
            None => SimulationConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    /// Overwrite every field of `config` for which a flag was given.
    pub fn apply(&self, config: &mut SimulationConfig) {
        let company = &mut config.company;
        override_with(&mut company.n_employees, self.employees);
        override_with(&mut company.n_managers, self.managers);
        override_with(&mut company.gap, self.gap);
        override_with(&mut company.employee_leave_probability, self.employee_leave_prob);
        override_with(&mut company.manager_leave_probability, self.manager_leave_prob);
        override_with(&mut company.seed, self.seed);

        override_with(&mut config.simulation.steps, self.steps);
        if self.continue_on_error {
            config.simulation.halt_on_error = false;
        }

        let generator = &mut config.generator;
        override_with(&mut generator.num_workers, self.workers);
        override_with(&mut generator.productivity_min, self.productivity_min);
        override_with(&mut generator.productivity_max, self.productivity_max);
        if !self.gender.is_empty() {
            generator.gender_proportions = to_map(&self.gender);
        }
        if !self.ethnicity.is_empty() {
            generator.ethnicity_proportions = to_map(&self.ethnicity);
        }

        let dataset = &mut config.dataset;
        override_with(&mut dataset.past_fraction, self.past_fraction);
        if self.use_perceived {
            dataset.use_perceived = true;
        }
        if let Some(name) = &self.sensitive_attribute {
            dataset.sensitive_attribute = Some(name.clone());
        }
    }
}

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn to_map(pairs: &[(String, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().cloned().collect()
}

/// Parse `name=proportion`.
fn parse_proportion(raw: &str) -> Result<(String, f64), String> {
    let (name, share) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=proportion, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing name in `{raw}`"));
    }
    let share: f64 = share
        .trim()
        .parse()
        .map_err(|err| format!("invalid proportion in `{raw}`: {err}"))?;
    if !share.is_finite() || share < 0.0 {
        return Err(format!("proportion must be a non-negative number, got {share}"));
    }
    Ok((name.to_owned(), share))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_flags_keep_defaults() {
        let cli = Cli::parse_from(["firmsim"]);
        let config = cli.load_config().unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "firmsim",
            "--workers",
            "250",
            "--employees",
            "20",
            "--managers",
            "4",
            "--employee-leave-prob",
            "0.3",
            "--manager-leave-prob",
            "0",
            "--steps",
            "50",
            "--gap",
            "2",
            "--past-fraction",
            "0.5",
            "--use-perceived",
            "--sensitive-attribute",
            "gender",
            "--seed",
            "7",
            "--format",
            "json",
            "--log-level",
            "debug",
        ]);
        let config = cli.load_config().unwrap();
        assert_eq!(config.generator.num_workers, 250);
        assert_eq!(config.company.n_employees, 20);
        assert_eq!(config.company.n_managers, 4);
        assert_eq!(config.company.gap, 2);
        assert_eq!(config.company.seed, 7);
        assert_eq!(config.simulation.steps, 50);
        assert!(config.dataset.use_perceived);
        assert_eq!(config.dataset.sensitive_attribute.as_deref(), Some("gender"));
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn continue_on_error_clears_halting() {
        let config = Cli::parse_from(["firmsim"]).load_config().unwrap();
        assert!(config.simulation.halt_on_error);

        let config = Cli::parse_from(["firmsim", "--continue-on-error"])
            .load_config()
            .unwrap();
        assert!(!config.simulation.halt_on_error);
    }

    #[test]
    fn repeated_proportions_replace_defaults() {
        let cli = Cli::parse_from([
            "firmsim",
            "--gender",
            "female=0.7",
            "--gender",
            "male=0.3",
            "--ethnicity",
            "asian=1",
        ]);
        let config = cli.load_config().unwrap();
        assert_eq!(config.generator.gender_proportions.len(), 2);
        assert_eq!(
            config.generator.gender_proportions.get("female").copied(),
            Some(0.7)
        );
        assert_eq!(config.generator.ethnicity_proportions.len(), 1);
    }

    #[test]
    fn malformed_proportion_is_rejected() {
        assert!(Cli::try_parse_from(["firmsim", "--gender", "female"]).is_err());
        assert!(Cli::try_parse_from(["firmsim", "--gender", "=0.5"]).is_err());
        assert!(Cli::try_parse_from(["firmsim", "--gender", "female=-1"]).is_err());
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["firmsim", "--format", "csv"]).is_err());
    }
}
