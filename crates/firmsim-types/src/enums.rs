//! Enumeration types for the firmsim simulation.

use serde::{Deserialize, Serialize};

/// An active role inside the firm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Individual contributor.
    Employee,
    /// Supervises employees and nominates them for promotion.
    Manager,
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Employee => write!(f, "employee"),
            Self::Manager => write!(f, "manager"),
        }
    }
}

/// Why a record left an active roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepartureReason {
    /// Voluntary attrition; the worker is gone from the firm.
    Attrition,
    /// The employee record was retired because the worker became a manager.
    /// The worker itself is still active under the same id.
    Promoted,
}

impl core::fmt::Display for DepartureReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Attrition => write!(f, "attrition"),
            Self::Promoted => write!(f, "promoted"),
        }
    }
}

/// The sub-phases of a single simulation step, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Aggregate productivity is recorded before any mutation.
    Metrics,
    /// Every active worker draws once against its leaving probability.
    Attrition,
    /// Headcount deficit is refilled from the candidate pool.
    Hiring,
    /// Manager deficit is refilled by promoting nominated employees.
    Promotion,
}

impl core::fmt::Display for Phase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Metrics => write!(f, "metrics"),
            Self::Attrition => write!(f, "attrition"),
            Self::Hiring => write!(f, "hiring"),
            Self::Promotion => write!(f, "promotion"),
        }
    }
}
