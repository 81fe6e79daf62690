//! The company model: four rosters, a candidate pool, and the step cycle.
//!
//! Each call to [`CompanyModel::step`] runs these phases in order over one
//! seeded random stream:
//!
//! 1. **Metrics** -- snapshot aggregate productivity and headcounts before
//!    anything changes.
//! 2. **Attrition** -- one draw per active employee, then per active
//!    manager, over rosters frozen at the start of the pass. Leavers move to
//!    the matching past roster.
//! 3. **Hiring** -- once the employee deficit reaches `gap`, hire the top
//!    candidates until the start-of-run headcount is restored.
//! 4. **Promotion** -- once the manager deficit reaches `gap`, draw a
//!    manager per missing seat and promote its nominee.
//!
//! Every individual transition is computed before any roster is touched, so
//! a failure leaves each worker in exactly one roster. A failed step is not
//! retried: the randomness it consumed stays consumed.
//!
//! # Rosters
//!
//! | Roster | Holds | Status |
//! |---|---|---|
//! | pool | unhired candidates | `Candidate` |
//! | `employees` | active individual contributors | `Employee` |
//! | `managers` | active managers | `Manager` |
//! | `past_employees` | leavers and promotion snapshots | `Departed` |
//! | `past_managers` | leavers | `Departed` |

use firmsim_agents::{
    AttritionConfig, CandidatePool, LaborError, PerceptionPolicy, Roster, lifecycle,
};
use firmsim_data::DataSource;
use firmsim_types::{EventKind, LifecycleEvent, Phase, Role, Worker, WorkerId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::collector::{DataCollector, StepMetrics, total_productivity};
use crate::config::SimulationConfig;
use crate::dataset::{DatasetOptions, TrainingData};
use crate::ranker::Ranker;

/// A step failed; carries where it failed and why.
#[derive(Debug, thiserror::Error)]
#[error("step {step} failed during {phase}: {source}")]
pub struct StepError {
    /// Index of the failed step.
    pub step: u64,
    /// Phase in which the failure occurred.
    pub phase: Phase,
    /// The underlying error.
    pub source: LaborError,
}

/// Fixed parameters of a company run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompanyParams {
    /// Start-of-run employee headcount; hiring always restores it.
    pub n_employees: usize,
    /// Start-of-run manager headcount; promotion always restores it.
    pub n_managers: usize,
    /// Deficit that must be reached before hiring or promotion triggers.
    pub gap: usize,
    /// Per-role leaving probabilities.
    pub attrition: AttritionConfig,
    /// Seed of the model's random stream.
    pub seed: u64,
}

impl Default for CompanyParams {
    fn default() -> Self {
        Self {
            n_employees: 10,
            n_managers: 5,
            gap: 1,
            attrition: AttritionConfig::default(),
            seed: 42,
        }
    }
}

/// What happened during one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSummary {
    /// Index of the step.
    pub step: u64,
    /// Aggregate productivity recorded before the step mutated anything.
    pub productivity: f64,
    /// Workers that left, in draw order.
    pub departed: Vec<WorkerId>,
    /// Workers hired, best first.
    pub hired: Vec<WorkerId>,
    /// Workers promoted, in promotion order.
    pub promoted: Vec<WorkerId>,
    /// Every transition of the step, in order.
    pub events: Vec<LifecycleEvent>,
}

impl StepSummary {
    const fn new(step: u64, productivity: f64) -> Self {
        Self {
            step,
            productivity,
            departed: Vec::new(),
            hired: Vec::new(),
            promoted: Vec::new(),
            events: Vec::new(),
        }
    }
}

/// The firm: rosters, candidate pool, ranker and random stream.
#[derive(Debug)]
pub struct CompanyModel {
    params: CompanyParams,
    step: u64,
    rng: ChaCha8Rng,
    pool: CandidatePool,
    ranker: Ranker,
    employees: Roster,
    managers: Roster,
    past_employees: Roster,
    past_managers: Roster,
    collector: DataCollector,
    events: Vec<LifecycleEvent>,
}

impl CompanyModel {
    /// Build the candidate pool from `source` and staff the firm at step 0.
    ///
    /// The first `n_employees` candidates by id become employees and the
    /// next `n_managers` become managers.
    ///
    /// # Errors
    ///
    /// Returns [`LaborError::Schema`] if the dataset is unusable, or
    /// [`LaborError::InsufficientCandidates`] if the pool cannot cover the
    /// initial headcount.
    pub fn new(
        params: CompanyParams,
        source: &mut dyn DataSource,
        perception: &dyn PerceptionPolicy,
        ranker: Ranker,
    ) -> Result<Self, LaborError> {
        let pool = CandidatePool::generate(source, perception)?;
        let headcount = params.n_employees.saturating_add(params.n_managers);
        if headcount > pool.remaining() {
            return Err(LaborError::InsufficientCandidates {
                requested: headcount,
                available: pool.remaining(),
            });
        }

        let mut model = Self {
            params,
            step: 0,
            rng: ChaCha8Rng::seed_from_u64(params.seed),
            pool,
            ranker,
            employees: Roster::new("employees"),
            managers: Roster::new("managers"),
            past_employees: Roster::new("past_employees"),
            past_managers: Roster::new("past_managers"),
            collector: DataCollector::new(),
            events: Vec::new(),
        };
        model.staff()?;

        info!(
            employees = model.employees.len(),
            managers = model.managers.len(),
            candidates = model.pool.remaining(),
            seed = params.seed,
            productivity = model.current_productivity(),
            "Company staffed"
        );
        Ok(model)
    }

    /// Build a model from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Same as [`CompanyModel::new`].
    pub fn from_config(
        config: &SimulationConfig,
        source: &mut dyn DataSource,
    ) -> Result<Self, LaborError> {
        let perception = config.perception.build();
        Self::new(
            config.company.params(),
            source,
            perception.as_ref(),
            config.scoring.build(),
        )
    }

    /// Initial staffing: lowest ids first, employees then managers.
    fn staff(&mut self) -> Result<(), LaborError> {
        let headcount = self.params.n_employees.saturating_add(self.params.n_managers);
        let ids: Vec<WorkerId> = self.pool.iter().take(headcount).map(Worker::id).collect();
        for (slot, id) in ids.into_iter().enumerate() {
            let candidate = self.pool.take(id)?;
            if slot < self.params.n_employees {
                self.employees.insert(lifecycle::hire(&candidate, 0)?)?;
            } else {
                self.managers.insert(lifecycle::hire_as_manager(&candidate, 0)?)?;
            }
            self.events.push(LifecycleEvent {
                step: 0,
                worker_id: id,
                kind: EventKind::Hired,
            });
        }
        Ok(())
    }

    /// Advance the firm by one step.
    ///
    /// The step counter advances even when the step fails, and the metrics
    /// snapshot of a failed step is still recorded.
    ///
    /// # Errors
    ///
    /// Returns [`StepError`] with the step index and phase of the first
    /// failure. Transitions completed before the failure stay applied.
    pub fn step(&mut self) -> Result<StepSummary, StepError> {
        let step = self.step;
        self.step = self.step.saturating_add(1);

        let mut metrics = StepMetrics::snapshot(
            step,
            &self.employees,
            &self.managers,
            self.pool.remaining(),
            self.pool.schema(),
        );
        info!(
            step,
            productivity = metrics.productivity,
            employees = metrics.employees,
            managers = metrics.managers,
            candidates = metrics.candidates_remaining,
            "Step started"
        );

        let mut summary = StepSummary::new(step, metrics.productivity);
        let outcome = self.run_phases(step, &mut summary);

        metrics.hired = summary.hired.len();
        metrics.promoted = summary.promoted.len();
        metrics.departed = summary.departed.len();
        self.collector.record(metrics);

        outcome.map(|()| summary)
    }

    fn run_phases(&mut self, step: u64, summary: &mut StepSummary) -> Result<(), StepError> {
        let fail = |phase: Phase| move |source: LaborError| StepError { step, phase, source };

        self.attrition(step, summary).map_err(fail(Phase::Attrition))?;

        let productivity = self.current_productivity();
        #[allow(clippy::float_cmp)]
        let degenerate = productivity == 0.0;
        if degenerate {
            warn!(
                step,
                employees = self.employees.len(),
                managers = self.managers.len(),
                "Total productivity is zero after attrition"
            );
        }

        self.hiring(step, summary).map_err(fail(Phase::Hiring))?;
        self.promotion(step, summary).map_err(fail(Phase::Promotion))?;

        debug!(
            step,
            departed = summary.departed.len(),
            hired = summary.hired.len(),
            promoted = summary.promoted.len(),
            "Step finished"
        );
        Ok(())
    }

    fn attrition(&mut self, step: u64, summary: &mut StepSummary) -> Result<(), LaborError> {
        let visits = [
            (Role::Employee, self.employees.snapshot_ids()),
            (Role::Manager, self.managers.snapshot_ids()),
        ];
        for (role, ids) in visits {
            let probability = self.params.attrition.probability_for(role);
            for id in ids {
                if !lifecycle::check_attrition(&mut self.rng, probability) {
                    debug!(step, worker_id = %id, %role, "Worker stays");
                    continue;
                }

                let (active, past) = match role {
                    Role::Employee => (&mut self.employees, &mut self.past_employees),
                    Role::Manager => (&mut self.managers, &mut self.past_managers),
                };
                let worker = active.get(id).ok_or(LaborError::NotFound {
                    id,
                    collection: active.name(),
                })?;
                let departed = lifecycle::depart(worker, step)?;
                ensure_absent(past, id)?;
                active.remove(id)?;
                past.insert(departed)?;

                debug!(step, worker_id = %id, %role, "Worker departed");
                summary.departed.push(id);
                self.emit(
                    summary,
                    LifecycleEvent {
                        step,
                        worker_id: id,
                        kind: EventKind::Departed { role },
                    },
                );
            }
        }
        Ok(())
    }

    fn hiring(&mut self, step: u64, summary: &mut StepSummary) -> Result<(), LaborError> {
        let target = self.params.n_employees;
        if self.employees.len().saturating_add(self.params.gap) > target {
            return Ok(());
        }
        let deficit = target.saturating_sub(self.employees.len());
        if deficit == 0 {
            return Ok(());
        }

        let chosen = self.ranker.select_candidates(&self.pool, deficit)?;
        info!(step, deficit, candidates = self.pool.remaining(), "Hiring");

        for id in chosen {
            ensure_absent(&self.employees, id)?;
            let candidate = self.pool.take(id)?;
            self.employees.insert(lifecycle::hire(&candidate, step)?)?;

            debug!(step, worker_id = %id, "Worker hired");
            summary.hired.push(id);
            self.emit(
                summary,
                LifecycleEvent {
                    step,
                    worker_id: id,
                    kind: EventKind::Hired,
                },
            );
        }
        Ok(())
    }

    fn promotion(&mut self, step: u64, summary: &mut StepSummary) -> Result<(), LaborError> {
        let target = self.params.n_managers;
        if self.managers.len().saturating_add(self.params.gap) > target {
            return Ok(());
        }
        let deficit = target.saturating_sub(self.managers.len());
        if deficit > 0 {
            info!(step, deficit, employees = self.employees.len(), "Promoting");
        }

        for _ in 0..deficit {
            let manager = if self.managers.is_empty() {
                None
            } else {
                let index = self.rng.random_range(0..self.managers.len());
                self.managers.get_index(index).map(Worker::id)
            };

            let nominee = Ranker::select_promotee(manager, &self.employees, &self.managers)?;
            let employee = self.employees.get(nominee).ok_or(LaborError::NotFound {
                id: nominee,
                collection: self.employees.name(),
            })?;
            let promotion = lifecycle::promote(employee, step)?;
            ensure_absent(&self.past_employees, nominee)?;
            ensure_absent(&self.managers, nominee)?;

            self.employees.remove(nominee)?;
            self.past_employees.insert(promotion.snapshot)?;
            self.managers.insert(promotion.manager)?;

            debug!(
                step,
                worker_id = %nominee,
                nominated_by = ?manager.map(WorkerId::into_inner),
                "Worker promoted"
            );
            summary.promoted.push(nominee);
            self.emit(
                summary,
                LifecycleEvent {
                    step,
                    worker_id: nominee,
                    kind: EventKind::Promoted {
                        nominated_by: manager,
                    },
                },
            );
        }
        Ok(())
    }

    fn emit(&mut self, summary: &mut StepSummary, event: LifecycleEvent) {
        summary.events.push(event);
        self.events.push(event);
    }

    /// Sum of true productivity over active employees and managers.
    pub fn current_productivity(&self) -> f64 {
        total_productivity(&[&self.employees, &self.managers])
    }

    /// Assemble training tables from the active and historical rosters.
    ///
    /// Active rows are employees then managers; historical rows are past
    /// employees then past managers.
    ///
    /// # Errors
    ///
    /// See [`crate::dataset::build_dataset`].
    pub fn training_data(&self, options: &DatasetOptions) -> Result<TrainingData, LaborError> {
        Ranker::build_dataset(
            &[&self.employees, &self.managers],
            &[&self.past_employees, &self.past_managers],
            self.pool.schema(),
            options,
        )
    }

    /// Index of the next step to run.
    pub const fn current_step(&self) -> u64 {
        self.step
    }

    /// The fixed run parameters.
    pub const fn params(&self) -> &CompanyParams {
        &self.params
    }

    /// Active employees.
    pub const fn employees(&self) -> &Roster {
        &self.employees
    }

    /// Active managers.
    pub const fn managers(&self) -> &Roster {
        &self.managers
    }

    /// Departed employees and promotion snapshots.
    pub const fn past_employees(&self) -> &Roster {
        &self.past_employees
    }

    /// Departed managers.
    pub const fn past_managers(&self) -> &Roster {
        &self.past_managers
    }

    /// Unhired candidates.
    pub const fn pool(&self) -> &CandidatePool {
        &self.pool
    }

    /// Per-step metrics recorded so far.
    pub const fn collector(&self) -> &DataCollector {
        &self.collector
    }

    /// Every transition since construction, including initial staffing.
    pub fn events(&self) -> &[LifecycleEvent] {
        &self.events
    }
}

fn ensure_absent(roster: &Roster, id: WorkerId) -> Result<(), LaborError> {
    if roster.contains(id) {
        Err(LaborError::Duplicate {
            id,
            collection: roster.name(),
        })
    } else {
        Ok(())
    }
}
