//! Leaving probabilities applied by the per-step attrition check.

use firmsim_types::Role;

/// Default per-step leaving probability for employees.
pub const DEFAULT_EMPLOYEE_LEAVE_PROBABILITY: f64 = 0.1;

/// Default per-step leaving probability for managers.
pub const DEFAULT_MANAGER_LEAVE_PROBABILITY: f64 = 0.05;

/// Per-role leaving probabilities, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttritionConfig {
    /// Probability that an employee leaves in a given step.
    pub employee_leave_probability: f64,
    /// Probability that a manager leaves in a given step.
    pub manager_leave_probability: f64,
}

impl Default for AttritionConfig {
    fn default() -> Self {
        Self {
            employee_leave_probability: DEFAULT_EMPLOYEE_LEAVE_PROBABILITY,
            manager_leave_probability: DEFAULT_MANAGER_LEAVE_PROBABILITY,
        }
    }
}

impl AttritionConfig {
    /// Return the leaving probability for the given role.
    pub const fn probability_for(&self, role: Role) -> f64 {
        match role {
            Role::Employee => self.employee_leave_probability,
            Role::Manager => self.manager_leave_probability,
        }
    }
}
