//! Candidate selection, promotion nomination, and dataset assembly.
//!
//! The [`Ranker`] is the only component that decides *who*: which
//! candidates get hired and which employee a manager nominates. It sees
//! perceived productivity (through its [`ScoringModel`]) and never the true
//! value.
//!
//! # Supervision
//!
//! Managers supervise employees by roster position: with `m` active
//! managers, the employee at position `i` of the employee roster reports to
//! the manager at position `i mod m` of the manager roster. The mapping is
//! recomputed from the rosters on every call, so departures and hires
//! redistribute reports without extra bookkeeping.

use std::cmp::Ordering;

use firmsim_agents::{CandidatePool, LaborError, Roster};
use firmsim_data::Schema;
use firmsim_types::{Worker, WorkerId};
use tracing::debug;

use crate::dataset::{self, DatasetOptions, TrainingData};

/// Scores a worker for hiring. Higher is better.
///
/// Implementations must only read perceived signals (features, perceived
/// productivity); a trained ranking model plugs in here.
pub trait ScoringModel {
    /// Score one worker.
    fn score(&self, worker: &Worker) -> f64;
}

/// Scores by perceived productivity.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerceivedProductivity;

impl ScoringModel for PerceivedProductivity {
    fn score(&self, worker: &Worker) -> f64 {
        worker.perceived_productivity()
    }
}

/// Scores by a weighted sum of numeric features.
///
/// Weights align with the schema's feature columns; categorical features
/// and features without a weight contribute nothing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureWeights {
    /// One weight per feature column.
    pub weights: Vec<f64>,
}

impl ScoringModel for FeatureWeights {
    fn score(&self, worker: &Worker) -> f64 {
        worker
            .features()
            .iter()
            .zip(&self.weights)
            .filter_map(|(value, weight)| value.as_number().map(|n| n * weight))
            .sum()
    }
}

/// Selects candidates and promotees and assembles training tables.
pub struct Ranker {
    scorer: Box<dyn ScoringModel>,
}

impl core::fmt::Debug for Ranker {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Ranker").finish_non_exhaustive()
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(Box::new(PerceivedProductivity))
    }
}

impl Ranker {
    /// Create a ranker around a scoring model.
    pub fn new(scorer: Box<dyn ScoringModel>) -> Self {
        Self { scorer }
    }

    /// Return the top `count` candidates, best first.
    ///
    /// Candidates are ordered by score descending; ties go to the lower id.
    ///
    /// # Errors
    ///
    /// Returns [`LaborError::InsufficientCandidates`] if `count` exceeds the
    /// number of remaining candidates. Nothing is removed from the pool.
    pub fn select_candidates(
        &self,
        pool: &CandidatePool,
        count: usize,
    ) -> Result<Vec<WorkerId>, LaborError> {
        let available = pool.remaining();
        if count > available {
            return Err(LaborError::InsufficientCandidates {
                requested: count,
                available,
            });
        }

        let mut scored: Vec<(f64, WorkerId)> = pool
            .iter()
            .map(|w| (self.scorer.score(w), w.id()))
            .collect();
        scored.sort_by(|a, b| by_score_then_id(a.0, a.1, b.0, b.1));
        scored.truncate(count);

        debug!(count, available, "Candidates selected");
        Ok(scored.into_iter().map(|(_, id)| id).collect())
    }

    /// Return the employees supervised by `manager`, in roster order.
    ///
    /// Empty if the manager is not in `managers`.
    pub fn supervised_by<'a>(
        manager: WorkerId,
        employees: &'a Roster,
        managers: &Roster,
    ) -> Vec<&'a Worker> {
        let Some(slot) = managers.position(manager) else {
            return Vec::new();
        };
        let span = managers.len();
        employees
            .iter()
            .enumerate()
            .filter(|(i, _)| i.checked_rem(span) == Some(slot))
            .map(|(_, w)| w)
            .collect()
    }

    /// Return the employee `manager` nominates for promotion.
    ///
    /// The nominee is the supervised employee with the highest perceived
    /// productivity (ties to the lower id). With no manager (`None`, the
    /// manager roster is empty) every employee is eligible.
    ///
    /// # Errors
    ///
    /// Returns [`LaborError::NoEligibleCandidate`] if nobody is eligible.
    pub fn select_promotee(
        manager: Option<WorkerId>,
        employees: &Roster,
        managers: &Roster,
    ) -> Result<WorkerId, LaborError> {
        let eligible: Vec<&Worker> = match manager {
            Some(id) => Self::supervised_by(id, employees, managers),
            None => employees.iter().collect(),
        };

        eligible
            .into_iter()
            .map(|w| (w.perceived_productivity(), w.id()))
            .min_by(|a, b| by_score_then_id(a.0, a.1, b.0, b.1))
            .map(|(_, id)| id)
            .ok_or(LaborError::NoEligibleCandidate { manager })
    }

    /// Assemble `X`, `S`, `y`; see [`dataset::build_dataset`].
    ///
    /// # Errors
    ///
    /// Propagates [`LaborError::Schema`] and [`LaborError::Shape`].
    pub fn build_dataset(
        population: &[&Roster],
        past_population: &[&Roster],
        schema: &Schema,
        options: &DatasetOptions,
    ) -> Result<TrainingData, LaborError> {
        dataset::build_dataset(population, past_population, schema, options)
    }
}

/// Descending score, then ascending id.
fn by_score_then_id(score_a: f64, id_a: WorkerId, score_b: f64, id_b: WorkerId) -> Ordering {
    score_b.total_cmp(&score_a).then(id_a.cmp(&id_b))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use firmsim_agents::{FixedOffset, lifecycle};
    use firmsim_data::{Column, Table, TableDataSource};
    use firmsim_types::Value;

    use super::*;

    fn pool(productivity: Vec<f64>) -> CandidatePool {
        let skill = productivity.iter().map(|p| p * 2.0).collect();
        let table = Table::new(
            vec![
                Column::numeric("skill", skill),
                Column::numeric("productivity", productivity),
            ],
            "productivity",
        )
        .unwrap();
        CandidatePool::generate(&mut TableDataSource::new(table), &FixedOffset::default()).unwrap()
    }

    fn employee(id: u64, perceived: f64) -> Worker {
        let candidate = Worker::candidate(WorkerId::new(id), Vec::new(), Vec::new(), 0.0, perceived);
        lifecycle::hire(&candidate, 0).unwrap()
    }

    fn manager(id: u64) -> Worker {
        let candidate = Worker::candidate(WorkerId::new(id), Vec::new(), Vec::new(), 0.0, 0.0);
        lifecycle::hire_as_manager(&candidate, 0).unwrap()
    }

    fn ids(raw: &[u64]) -> Vec<WorkerId> {
        raw.iter().copied().map(WorkerId::new).collect()
    }

    #[test]
    fn selects_top_by_perceived_productivity() {
        let pool = pool(vec![3.0, 9.0, 1.0, 7.0]);
        let chosen = Ranker::default().select_candidates(&pool, 2).unwrap();
        assert_eq!(chosen, ids(&[1, 3]));
        assert_eq!(pool.remaining(), 4);
    }

    #[test]
    fn ties_break_by_ascending_id() {
        let pool = pool(vec![5.0, 5.0, 5.0]);
        let chosen = Ranker::default().select_candidates(&pool, 2).unwrap();
        assert_eq!(chosen, ids(&[0, 1]));
    }

    #[test]
    fn too_many_requested_fails() {
        let pool = pool(vec![1.0, 2.0]);
        let err = Ranker::default().select_candidates(&pool, 3).unwrap_err();
        assert!(matches!(
            err,
            LaborError::InsufficientCandidates {
                requested: 3,
                available: 2
            }
        ));
    }

    #[test]
    fn feature_weights_change_the_ranking() {
        let pool = pool(vec![3.0, 9.0, 1.0]);
        let ranker = Ranker::new(Box::new(FeatureWeights {
            weights: vec![-1.0],
        }));
        let chosen = ranker.select_candidates(&pool, 1).unwrap();
        assert_eq!(chosen, ids(&[2]));
    }

    #[test]
    fn feature_weights_skip_categorical_values() {
        let candidate = Worker::candidate(
            WorkerId::new(0),
            vec![Value::Number(2.0), Value::from("x")],
            Vec::new(),
            0.0,
            0.0,
        );
        let scorer = FeatureWeights {
            weights: vec![3.0, 100.0],
        };
        assert!((scorer.score(&candidate) - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn supervision_is_round_robin_by_position() {
        let mut employees = Roster::new("employees");
        for (id, p) in [(10, 1.0), (11, 2.0), (12, 3.0), (13, 4.0), (14, 5.0)] {
            employees.insert(employee(id, p)).unwrap();
        }
        let mut managers = Roster::new("managers");
        managers.insert(manager(1)).unwrap();
        managers.insert(manager(2)).unwrap();

        let first: Vec<WorkerId> = Ranker::supervised_by(WorkerId::new(1), &employees, &managers)
            .iter()
            .map(|w| w.id())
            .collect();
        let second: Vec<WorkerId> = Ranker::supervised_by(WorkerId::new(2), &employees, &managers)
            .iter()
            .map(|w| w.id())
            .collect();
        assert_eq!(first, ids(&[10, 12, 14]));
        assert_eq!(second, ids(&[11, 13]));
    }

    #[test]
    fn manager_nominates_best_report() {
        let mut employees = Roster::new("employees");
        for (id, p) in [(10, 1.0), (11, 8.0), (12, 3.0), (13, 4.0)] {
            employees.insert(employee(id, p)).unwrap();
        }
        let mut managers = Roster::new("managers");
        managers.insert(manager(1)).unwrap();
        managers.insert(manager(2)).unwrap();

        let nominee =
            Ranker::select_promotee(Some(WorkerId::new(1)), &employees, &managers).unwrap();
        assert_eq!(nominee, WorkerId::new(12));
        let nominee =
            Ranker::select_promotee(Some(WorkerId::new(2)), &employees, &managers).unwrap();
        assert_eq!(nominee, WorkerId::new(11));
    }

    #[test]
    fn manager_without_reports_cannot_nominate() {
        let mut employees = Roster::new("employees");
        employees.insert(employee(10, 1.0)).unwrap();
        let mut managers = Roster::new("managers");
        managers.insert(manager(1)).unwrap();
        managers.insert(manager(2)).unwrap();

        let err = Ranker::select_promotee(Some(WorkerId::new(2)), &employees, &managers)
            .unwrap_err();
        assert!(matches!(err, LaborError::NoEligibleCandidate { .. }));
    }

    #[test]
    fn no_manager_means_company_wide_nomination() {
        let mut employees = Roster::new("employees");
        for (id, p) in [(10, 1.0), (11, 6.0), (12, 6.0)] {
            employees.insert(employee(id, p)).unwrap();
        }
        let managers = Roster::new("managers");
        let nominee = Ranker::select_promotee(None, &employees, &managers).unwrap();
        assert_eq!(nominee, WorkerId::new(11));
    }
}
