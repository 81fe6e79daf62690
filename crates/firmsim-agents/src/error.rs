//! Error types shared by the agent layer and the company model.
//!
//! All operations that can fail return typed errors rather than panicking.
//! Every variant is non-recoverable for the step in which it occurs; the
//! driver decides whether to halt or continue.

use firmsim_data::DataError;
use firmsim_types::WorkerId;

/// Errors that can occur while operating on the worker population.
#[derive(Debug, thiserror::Error)]
pub enum LaborError {
    /// The data source output is empty or misses expected columns, or a
    /// requested column does not exist.
    #[error("schema error: {reason}")]
    Schema {
        /// Description of the schema violation.
        reason: String,
    },

    /// An id was not present in the collection it was looked up in.
    #[error("worker {id} not found in {collection}")]
    NotFound {
        /// The missing id.
        id: WorkerId,
        /// Name of the collection that was searched.
        collection: &'static str,
    },

    /// An id was inserted into a collection that already holds it.
    #[error("worker {id} already present in {collection}")]
    Duplicate {
        /// The repeated id.
        id: WorkerId,
        /// Name of the collection.
        collection: &'static str,
    },

    /// A hire request exceeds the remaining candidate pool.
    #[error("insufficient candidates: requested {requested}, only {available} remaining")]
    InsufficientCandidates {
        /// Number of candidates requested.
        requested: usize,
        /// Number of candidates left in the pool.
        available: usize,
    },

    /// A promotion was requested from a manager with nobody to nominate.
    #[error("no eligible candidate for promotion (manager: {manager:?})")]
    NoEligibleCandidate {
        /// The nominating manager, if one was chosen.
        manager: Option<WorkerId>,
    },

    /// Row counts of an assembled dataset disagree. Internal invariant
    /// violation.
    #[error("shape mismatch: {features} feature rows, {sensitive} sensitive rows, {labels} labels")]
    Shape {
        /// Rows in the feature matrix.
        features: usize,
        /// Rows in the sensitive-attribute matrix.
        sensitive: usize,
        /// Entries in the label vector.
        labels: usize,
    },

    /// A status change that the lifecycle does not allow.
    #[error("invalid transition for worker {id}: {from} -> {to}")]
    InvalidTransition {
        /// The worker being transitioned.
        id: WorkerId,
        /// Current status name.
        from: String,
        /// Requested status name.
        to: &'static str,
    },
}

impl From<DataError> for LaborError {
    fn from(source: DataError) -> Self {
        Self::Schema {
            reason: source.to_string(),
        }
    }
}
