//! Status transitions and the per-step attrition check.
//!
//! Transitions consume a record and return the replacement, so a role change
//! is a single state replacement rather than an in-place mutation:
//!
//! ```text
//! Candidate --hire--> Employee --promote--> Manager
//!                        |                     |
//!                        +------depart---------+--> Departed(Attrition)
//! ```
//!
//! Promotion also yields a `Departed(Promoted)` snapshot of the employee
//! role, kept for dataset continuity. Departed records are final.

use firmsim_types::{DepartureReason, Role, Status, Worker};
use rand::Rng;

use crate::error::LaborError;

/// The two records produced by a promotion.
#[derive(Debug, Clone, PartialEq)]
pub struct Promotion {
    /// Historical copy of the employee role (`Departed`, reason `Promoted`).
    pub snapshot: Worker,
    /// The same worker as an active manager.
    pub manager: Worker,
}

/// Hire a candidate as an employee at `step`.
///
/// # Errors
///
/// Returns [`LaborError::InvalidTransition`] unless the worker is a candidate.
pub fn hire(worker: &Worker, step: u64) -> Result<Worker, LaborError> {
    match worker.status() {
        Status::Candidate => Ok(worker.with_status(Status::Employee { step_hired: step })),
        _ => Err(invalid(worker, "employee")),
    }
}

/// Hire a candidate straight into a manager role at `step`.
///
/// Used for initial staffing; the record carries no promotion step.
///
/// # Errors
///
/// Returns [`LaborError::InvalidTransition`] unless the worker is a candidate.
pub fn hire_as_manager(worker: &Worker, step: u64) -> Result<Worker, LaborError> {
    match worker.status() {
        Status::Candidate => Ok(worker.with_status(Status::Manager {
            step_hired: step,
            step_promoted: None,
        })),
        _ => Err(invalid(worker, "manager")),
    }
}

/// Promote an employee to manager at `step`.
///
/// # Errors
///
/// Returns [`LaborError::InvalidTransition`] unless the worker is an
/// employee hired no later than `step`.
pub fn promote(worker: &Worker, step: u64) -> Result<Promotion, LaborError> {
    match worker.status() {
        Status::Employee { step_hired } if step_hired <= step => Ok(Promotion {
            snapshot: worker.with_status(Status::Departed {
                role: Role::Employee,
                step_hired,
                step_promoted: None,
                step_left: step,
                reason: DepartureReason::Promoted,
            }),
            manager: worker.with_status(Status::Manager {
                step_hired,
                step_promoted: Some(step),
            }),
        }),
        _ => Err(invalid(worker, "manager")),
    }
}

/// Record the voluntary departure of an active worker at `step`.
///
/// # Errors
///
/// Returns [`LaborError::InvalidTransition`] for candidates and records that
/// already departed.
pub fn depart(worker: &Worker, step: u64) -> Result<Worker, LaborError> {
    let (role, step_hired, step_promoted) = match worker.status() {
        Status::Employee { step_hired } => (Role::Employee, step_hired, None),
        Status::Manager {
            step_hired,
            step_promoted,
        } => (Role::Manager, step_hired, step_promoted),
        Status::Candidate | Status::Departed { .. } => return Err(invalid(worker, "departed")),
    };
    Ok(worker.with_status(Status::Departed {
        role,
        step_hired,
        step_promoted,
        step_left: step,
        reason: DepartureReason::Attrition,
    }))
}

/// Draw once against `probability` and report whether the worker leaves.
///
/// Exactly one uniform draw in `[0, 1)` is consumed per call regardless of
/// the outcome, keeping the random stream aligned across runs. A
/// probability of zero never triggers a departure.
pub fn check_attrition<R: Rng>(rng: &mut R, probability: f64) -> bool {
    let draw: f64 = rng.random();
    probability > 0.0 && draw <= probability
}

fn invalid(worker: &Worker, to: &'static str) -> LaborError {
    LaborError::InvalidTransition {
        id: worker.id(),
        from: worker.status().to_string(),
        to,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use firmsim_types::{Value, WorkerId};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn candidate() -> Worker {
        Worker::candidate(WorkerId::new(1), vec![Value::Number(3.0)], Vec::new(), 5.0, 4.0)
    }

    #[test]
    fn hire_sets_step_hired() {
        let employee = hire(&candidate(), 2).unwrap();
        assert_eq!(employee.status(), Status::Employee { step_hired: 2 });
        assert_eq!(employee.id(), WorkerId::new(1));
    }

    #[test]
    fn hiring_twice_is_rejected() {
        let employee = hire(&candidate(), 0).unwrap();
        assert!(matches!(
            hire(&employee, 1),
            Err(LaborError::InvalidTransition { to: "employee", .. })
        ));
    }

    #[test]
    fn promotion_yields_snapshot_and_manager() {
        let employee = hire(&candidate(), 1).unwrap();
        let promotion = promote(&employee, 4).unwrap();
        assert_eq!(
            promotion.snapshot.status(),
            Status::Departed {
                role: Role::Employee,
                step_hired: 1,
                step_promoted: None,
                step_left: 4,
                reason: DepartureReason::Promoted,
            }
        );
        assert_eq!(
            promotion.manager.status(),
            Status::Manager {
                step_hired: 1,
                step_promoted: Some(4),
            }
        );
        assert_eq!(promotion.manager.id(), employee.id());
        assert_eq!(promotion.manager.features(), employee.features());
    }

    #[test]
    fn promotion_before_hire_is_rejected() {
        let employee = hire(&candidate(), 5).unwrap();
        assert!(promote(&employee, 3).is_err());
    }

    #[test]
    fn candidates_cannot_be_promoted() {
        assert!(promote(&candidate(), 0).is_err());
    }

    #[test]
    fn depart_keeps_role_history() {
        let manager = promote(&hire(&candidate(), 0).unwrap(), 2).unwrap().manager;
        let departed = depart(&manager, 6).unwrap();
        assert_eq!(
            departed.status(),
            Status::Departed {
                role: Role::Manager,
                step_hired: 0,
                step_promoted: Some(2),
                step_left: 6,
                reason: DepartureReason::Attrition,
            }
        );
        assert!(depart(&departed, 7).is_err());
        assert!(depart(&candidate(), 7).is_err());
    }

    #[test]
    fn initial_manager_has_no_promotion_step() {
        let manager = hire_as_manager(&candidate(), 0).unwrap();
        assert_eq!(manager.role(), Some(Role::Manager));
        assert_eq!(manager.step_promoted(), None);
    }

    #[test]
    fn attrition_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        assert!((0..1000).all(|_| !check_attrition(&mut rng, 0.0)));
        assert!((0..1000).all(|_| check_attrition(&mut rng, 1.0)));
    }

    #[test]
    fn attrition_consumes_one_draw_per_check() {
        let mut a = ChaCha8Rng::seed_from_u64(7);
        let mut b = ChaCha8Rng::seed_from_u64(7);
        let _ = check_attrition(&mut a, 0.0);
        let _: f64 = b.random();
        let next_a: f64 = a.random();
        let next_b: f64 = b.random();
        assert!((next_a - next_b).abs() < f64::EPSILON);
    }
}
