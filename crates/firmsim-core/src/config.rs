//! Configuration loading and typed config structures for the firmsim
//! simulation.
//!
//! A run is described by a YAML document mirrored by [`SimulationConfig`].
//! Every field has a default, so an empty document is a valid configuration;
//! command-line flags are applied on top of the parsed file by the binary.
//! [`SimulationConfig::validate`] checks cross-field constraints before a
//! model is built.

use std::collections::BTreeMap;
use std::path::Path;

use firmsim_agents::config::{
    DEFAULT_EMPLOYEE_LEAVE_PROBABILITY, DEFAULT_MANAGER_LEAVE_PROBABILITY,
};
use firmsim_agents::perception::DEFAULT_PERCEPTION_OFFSET;
use firmsim_agents::{AttritionConfig, FixedOffset, GroupPenalty, PerceptionPolicy};
use firmsim_data::{DataError, GeneratorDataSource, GeneratorParams};
use serde::{Deserialize, Serialize};

use crate::company::CompanyParams;
use crate::dataset::DatasetOptions;
use crate::ranker::{FeatureWeights, PerceivedProductivity, Ranker};

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value is out of range or inconsistent with another value.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Description of the violated constraint.
        reason: String,
    },

    /// The synthetic generator rejected its parameters.
    #[error("generator error: {source}")]
    Generator {
        /// The underlying data error.
        #[from]
        source: DataError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Headcount targets, hysteresis and attrition.
    #[serde(default)]
    pub company: CompanyConfig,

    /// Driver loop settings.
    #[serde(default)]
    pub simulation: RunConfig,

    /// Synthetic population parameters.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// How true productivity is perceived.
    #[serde(default)]
    pub perception: PerceptionConfig,

    /// How candidates are scored for hiring.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Shape of the final training tables.
    #[serde(default)]
    pub dataset: DatasetOptions,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let company = &self.company;
        check_probability("employee_leave_probability", company.employee_leave_probability)?;
        check_probability("manager_leave_probability", company.manager_leave_probability)?;
        check_probability("past_fraction", self.dataset.past_fraction)?;

        if company.gap == 0 {
            return Err(invalid("gap must be at least 1".to_owned()));
        }

        let generator = &self.generator;
        if generator.gender_proportions.is_empty() {
            return Err(invalid("gender proportions must not be empty".to_owned()));
        }
        if generator.ethnicity_proportions.is_empty() {
            return Err(invalid("ethnicity proportions must not be empty".to_owned()));
        }
        if generator.productivity_min > generator.productivity_max {
            return Err(invalid(format!(
                "productivity_min {} exceeds productivity_max {}",
                generator.productivity_min, generator.productivity_max
            )));
        }

        let headcount = company.n_employees.saturating_add(company.n_managers);
        if generator.num_workers < headcount {
            return Err(invalid(format!(
                "num_workers {} is smaller than the initial headcount {headcount}",
                generator.num_workers
            )));
        }
        Ok(())
    }

    /// Build the synthetic data source described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Generator`] if the generator rejects its
    /// parameters.
    pub fn data_source(&self) -> Result<GeneratorDataSource, ConfigError> {
        let seed = self.generator.seed.unwrap_or(self.company.seed);
        Ok(GeneratorDataSource::new(self.generator.params(), seed)?)
    }
}

/// Headcount targets, hysteresis threshold and leaving probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyConfig {
    /// Target number of employees.
    #[serde(default = "default_n_employees")]
    pub n_employees: usize,

    /// Target number of managers.
    #[serde(default = "default_n_managers")]
    pub n_managers: usize,

    /// Deficit at which hiring and promotion trigger.
    #[serde(default = "default_gap")]
    pub gap: usize,

    /// Per-step leaving probability of employees.
    #[serde(default = "default_employee_leave_probability")]
    pub employee_leave_probability: f64,

    /// Per-step leaving probability of managers.
    #[serde(default = "default_manager_leave_probability")]
    pub manager_leave_probability: f64,

    /// Seed of the model's random stream.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for CompanyConfig {
    fn default() -> Self {
        Self {
            n_employees: default_n_employees(),
            n_managers: default_n_managers(),
            gap: default_gap(),
            employee_leave_probability: default_employee_leave_probability(),
            manager_leave_probability: default_manager_leave_probability(),
            seed: default_seed(),
        }
    }
}

impl CompanyConfig {
    /// Convert into model parameters.
    pub const fn params(&self) -> CompanyParams {
        CompanyParams {
            n_employees: self.n_employees,
            n_managers: self.n_managers,
            gap: self.gap,
            attrition: AttritionConfig {
                employee_leave_probability: self.employee_leave_probability,
                manager_leave_probability: self.manager_leave_probability,
            },
            seed: self.seed,
        }
    }
}

/// Driver loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of steps to run.
    #[serde(default = "default_steps")]
    pub steps: u64,

    /// Stop at the first failed step instead of logging and continuing.
    #[serde(default = "default_true")]
    pub halt_on_error: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            halt_on_error: true,
        }
    }
}

/// Synthetic population parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Size of the candidate pool.
    #[serde(default = "default_num_workers")]
    pub num_workers: usize,

    /// Share of each gender value.
    #[serde(default = "default_gender_proportions")]
    pub gender_proportions: BTreeMap<String, f64>,

    /// Share of each ethnicity value.
    #[serde(default = "default_ethnicity_proportions")]
    pub ethnicity_proportions: BTreeMap<String, f64>,

    /// Lower productivity bound.
    #[serde(default = "default_productivity_min")]
    pub productivity_min: f64,

    /// Upper productivity bound.
    #[serde(default = "default_productivity_max")]
    pub productivity_max: f64,

    /// Generator seed; falls back to `company.seed`.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_workers: default_num_workers(),
            gender_proportions: default_gender_proportions(),
            ethnicity_proportions: default_ethnicity_proportions(),
            productivity_min: default_productivity_min(),
            productivity_max: default_productivity_max(),
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Convert into generator parameters.
    pub fn params(&self) -> GeneratorParams {
        GeneratorParams {
            num_workers: self.num_workers,
            gender_proportions: self.gender_proportions.clone(),
            ethnicity_proportions: self.ethnicity_proportions.clone(),
            productivity_min: self.productivity_min,
            productivity_max: self.productivity_max,
        }
    }
}

/// Perception policy selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum PerceptionConfig {
    /// Subtract the same offset for everyone.
    Offset {
        /// Amount subtracted from true productivity.
        #[serde(default = "default_perception_offset")]
        offset: f64,
    },
    /// Subtract an extra penalty for one demographic group.
    GroupPenalty {
        /// Sensitive column to inspect.
        attribute: String,
        /// Category that receives the penalty.
        value: String,
        /// Extra amount subtracted for the group.
        penalty: f64,
        /// Amount subtracted from everyone.
        #[serde(default = "default_perception_offset")]
        offset: f64,
    },
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self::Offset {
            offset: DEFAULT_PERCEPTION_OFFSET,
        }
    }
}

impl PerceptionConfig {
    /// Instantiate the configured policy.
    pub fn build(&self) -> Box<dyn PerceptionPolicy> {
        match self {
            Self::Offset { offset } => Box::new(FixedOffset { offset: *offset }),
            Self::GroupPenalty {
                attribute,
                value,
                penalty,
                offset,
            } => Box::new(GroupPenalty {
                attribute: attribute.clone(),
                value: value.clone(),
                penalty: *penalty,
                offset: *offset,
            }),
        }
    }
}

/// Hiring score selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ScoringConfig {
    /// Rank by perceived productivity.
    #[default]
    Perceived,
    /// Rank by a weighted sum of numeric features.
    FeatureWeights {
        /// One weight per feature column.
        weights: Vec<f64>,
    },
}

impl ScoringConfig {
    /// Instantiate a ranker around the configured scoring model.
    pub fn build(&self) -> Ranker {
        match self {
            Self::Perceived => Ranker::new(Box::new(PerceivedProductivity)),
            Self::FeatureWeights { weights } => Ranker::new(Box::new(FeatureWeights {
                weights: weights.clone(),
            })),
        }
    }
}

fn check_probability(name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be within [0, 1], got {value}")))
    }
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid { reason }
}

const fn default_n_employees() -> usize {
    10
}

const fn default_n_managers() -> usize {
    5
}

const fn default_gap() -> usize {
    1
}

const fn default_employee_leave_probability() -> f64 {
    DEFAULT_EMPLOYEE_LEAVE_PROBABILITY
}

const fn default_manager_leave_probability() -> f64 {
    DEFAULT_MANAGER_LEAVE_PROBABILITY
}

const fn default_seed() -> u64 {
    42
}

const fn default_steps() -> u64 {
    10
}

const fn default_true() -> bool {
    true
}

const fn default_num_workers() -> usize {
    100
}

fn default_gender_proportions() -> BTreeMap<String, f64> {
    BTreeMap::from([("male".to_owned(), 0.5), ("female".to_owned(), 0.5)])
}

fn default_ethnicity_proportions() -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("white".to_owned(), 0.5),
        ("black".to_owned(), 0.25),
        ("asian".to_owned(), 0.25),
    ])
}

const fn default_productivity_min() -> f64 {
    1.0
}

const fn default_productivity_max() -> f64 {
    10.0
}

const fn default_perception_offset() -> f64 {
    DEFAULT_PERCEPTION_OFFSET
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.company.n_employees, 10);
        assert_eq!(config.company.n_managers, 5);
        assert_eq!(config.company.gap, 1);
        assert_eq!(config.company.seed, 42);
        assert_eq!(config.simulation.steps, 10);
        assert_eq!(config.generator.num_workers, 100);
        assert_eq!(config.generator.ethnicity_proportions.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
company:
  n_employees: 20
  n_managers: 4
  gap: 2
  employee_leave_probability: 0.2
  manager_leave_probability: 0.0
  seed: 7

simulation:
  steps: 25
  halt_on_error: false

generator:
  num_workers: 200
  gender_proportions:
    male: 0.7
    female: 0.3
  ethnicity_proportions:
    white: 1.0
  productivity_min: 0.0
  productivity_max: 20.0

perception:
  policy: group_penalty
  attribute: gender
  value: female
  penalty: 0.5

scoring:
  model: feature_weights
  weights: [1.0, 0.5]

dataset:
  past_fraction: 0.5
  use_perceived: true
  sensitive_attribute: gender
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.company.n_employees, 20);
        assert_eq!(config.company.gap, 2);
        assert_eq!(config.company.seed, 7);
        assert_eq!(config.simulation.steps, 25);
        assert!(!config.simulation.halt_on_error);
        assert_eq!(config.generator.num_workers, 200);
        assert_eq!(
            config.perception,
            PerceptionConfig::GroupPenalty {
                attribute: "gender".to_owned(),
                value: "female".to_owned(),
                penalty: 0.5,
                offset: DEFAULT_PERCEPTION_OFFSET,
            }
        );
        assert_eq!(
            config.scoring,
            ScoringConfig::FeatureWeights {
                weights: vec![1.0, 0.5]
            }
        );
        assert_eq!(config.dataset.sensitive_attribute.as_deref(), Some("gender"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("company:\n  seed: 9\n").unwrap();
        assert_eq!(config.company.seed, 9);
        assert_eq!(config.company.n_employees, 10);
        assert_eq!(config.perception, PerceptionConfig::default());
        assert_eq!(config.scoring, ScoringConfig::Perceived);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = SimulationConfig::parse("").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn rejects_out_of_range_probability() {
        let mut config = SimulationConfig::default();
        config.company.employee_leave_probability = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn rejects_zero_gap() {
        let mut config = SimulationConfig::default();
        config.company.gap = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn rejects_pool_smaller_than_headcount() {
        let mut config = SimulationConfig::default();
        config.generator.num_workers = 14;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("initial headcount 15"));
    }

    #[test]
    fn rejects_inverted_productivity_bounds() {
        let mut config = SimulationConfig::default();
        config.generator.productivity_min = 11.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn data_source_uses_company_seed_by_default() {
        let config = SimulationConfig::default();
        let source = config.data_source().unwrap();
        assert_eq!(source.params().num_workers, 100);
    }

    #[test]
    fn invalid_yaml_is_reported() {
        let err = SimulationConfig::parse("company: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }
}
