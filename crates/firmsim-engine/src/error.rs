//! Error types for the firmsim binary.

use firmsim_agents::LaborError;
use firmsim_core::config::ConfigError;
use firmsim_core::runner::RunnerError;

/// Top-level error for the firmsim binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// Building the company or its final dataset failed.
    #[error("model error: {source}")]
    Model {
        /// The underlying labor-market error.
        #[from]
        source: LaborError,
    },

    /// The simulation run halted on a failed step.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: RunnerError,
    },

    /// Writing the report failed.
    #[error("output error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Serializing the JSON report failed.
    #[error("serialization error: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
