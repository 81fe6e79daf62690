//! Core entity structs for the firmsim simulation.
//!
//! A [`Worker`] carries the attributes fixed at materialization (features,
//! sensitive attributes, true and perceived productivity) plus a [`Status`]
//! tagged union describing where it sits in the hire -> employee -> manager
//! -> departed lifecycle. Role transitions replace the status; the shared
//! attributes are never mutated after creation.

use serde::{Deserialize, Serialize};

use crate::enums::{DepartureReason, Role};
use crate::ids::WorkerId;

// ---------------------------------------------------------------------------
// Cell values
// ---------------------------------------------------------------------------

/// A single cell of a tabular dataset: numeric or categorical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A real-valued measurement.
    Number(f64),
    /// A category label (e.g. a gender or ethnicity value).
    Category(String),
}

impl Value {
    /// Return the numeric payload, if this is a number.
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Category(_) => None,
        }
    }

    /// Return the category label, if this is a category.
    pub fn as_category(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Category(c) => Some(c),
        }
    }
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n:.4}"),
            Self::Category(c) => write!(f, "{c}"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Value {
    fn from(c: &str) -> Self {
        Self::Category(c.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Lifecycle status
// ---------------------------------------------------------------------------

/// Where a worker sits in its lifecycle, with the role-specific step stamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Status {
    /// Unhired, waiting in the candidate pool.
    Candidate,
    /// Active individual contributor.
    Employee {
        /// Step at which the worker was hired.
        step_hired: u64,
    },
    /// Active manager.
    Manager {
        /// Step at which the worker was hired.
        step_hired: u64,
        /// Step of the promotion; `None` for managers staffed at start.
        step_promoted: Option<u64>,
    },
    /// Historical record of a role that is no longer held.
    Departed {
        /// The role the record held when it left.
        role: Role,
        /// Step at which the worker was hired.
        step_hired: u64,
        /// Step of the promotion, if the worker was ever promoted.
        step_promoted: Option<u64>,
        /// Step at which the record left the active roster.
        step_left: u64,
        /// Why the record left.
        reason: DepartureReason,
    },
}

impl core::fmt::Display for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Candidate => write!(f, "candidate"),
            Self::Employee { .. } => write!(f, "employee"),
            Self::Manager { .. } => write!(f, "manager"),
            Self::Departed { .. } => write!(f, "departed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

/// A member of the simulated labor market.
///
/// Features and sensitive attributes follow the column order of the data
/// source schema, which is fixed for the lifetime of a run.
/// `true_productivity` is hidden from all selection logic; ranking only
/// ever sees `perceived_productivity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    id: WorkerId,
    features: Vec<Value>,
    sensitive_attributes: Vec<Value>,
    true_productivity: f64,
    perceived_productivity: f64,
    status: Status,
}

impl Worker {
    /// Create a fresh candidate record.
    pub const fn candidate(
        id: WorkerId,
        features: Vec<Value>,
        sensitive_attributes: Vec<Value>,
        true_productivity: f64,
        perceived_productivity: f64,
    ) -> Self {
        Self {
            id,
            features,
            sensitive_attributes,
            true_productivity,
            perceived_productivity,
            status: Status::Candidate,
        }
    }

    /// Return the worker's lifetime identifier.
    pub const fn id(&self) -> WorkerId {
        self.id
    }

    /// Return the feature vector in schema order.
    pub fn features(&self) -> &[Value] {
        &self.features
    }

    /// Return the sensitive attributes in schema order.
    pub fn sensitive_attributes(&self) -> &[Value] {
        &self.sensitive_attributes
    }

    /// Return the hidden ground-truth productivity.
    pub const fn true_productivity(&self) -> f64 {
        self.true_productivity
    }

    /// Return the productivity as seen by hiring and promotion logic.
    pub const fn perceived_productivity(&self) -> f64 {
        self.perceived_productivity
    }

    /// Return the current lifecycle status.
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Return a copy of this record carrying a new status.
    ///
    /// Legality of the transition is checked by the caller; this only
    /// swaps the tag and keeps every shared attribute.
    #[must_use]
    pub fn with_status(&self, status: Status) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Return the active role, or `None` for candidates and departed records.
    pub const fn role(&self) -> Option<Role> {
        match self.status {
            Status::Employee { .. } => Some(Role::Employee),
            Status::Manager { .. } => Some(Role::Manager),
            Status::Candidate | Status::Departed { .. } => None,
        }
    }

    /// Return the hiring step, if the worker was ever hired.
    pub const fn step_hired(&self) -> Option<u64> {
        match self.status {
            Status::Candidate => None,
            Status::Employee { step_hired }
            | Status::Manager { step_hired, .. }
            | Status::Departed { step_hired, .. } => Some(step_hired),
        }
    }

    /// Return the promotion step, if the worker was ever promoted.
    pub const fn step_promoted(&self) -> Option<u64> {
        match self.status {
            Status::Candidate | Status::Employee { .. } => None,
            Status::Manager { step_promoted, .. } | Status::Departed { step_promoted, .. } => {
                step_promoted
            }
        }
    }

    /// Whether the worker currently holds an active role.
    pub const fn is_active(&self) -> bool {
        self.role().is_some()
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// What happened to a worker during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// Taken from the candidate pool into the employee roster.
    Hired,
    /// Moved from the employee roster to the manager roster.
    Promoted {
        /// The manager that nominated the worker, if any manager was active.
        nominated_by: Option<WorkerId>,
    },
    /// Left the firm through attrition.
    Departed {
        /// The role held when leaving.
        role: Role,
    },
}

/// A single lifecycle transition, stamped with the step it happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    /// Step index of the transition.
    pub step: u64,
    /// The worker that transitioned.
    pub worker_id: WorkerId,
    /// The transition.
    #[serde(flatten)]
    pub kind: EventKind,
}
