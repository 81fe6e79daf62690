//! Per-step metrics collection.
//!
//! The model snapshots its aggregates at the start of every step, before
//! any mutation, and completes the record with that step's transition
//! counts once the step ends. The series is append-only.

use std::collections::BTreeMap;

use firmsim_agents::Roster;
use firmsim_data::Schema;
use serde::Serialize;

/// Managers per sensitive attribute value, keyed by attribute name.
pub type Composition = BTreeMap<String, BTreeMap<String, usize>>;

/// Aggregates recorded for one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepMetrics {
    /// Step index.
    pub step: u64,
    /// Sum of true productivity over active employees and managers, before
    /// the step mutated anything.
    pub productivity: f64,
    /// Active employees at the start of the step.
    pub employees: usize,
    /// Active managers at the start of the step.
    pub managers: usize,
    /// Unhired candidates at the start of the step.
    pub candidates_remaining: usize,
    /// Workers hired during the step.
    pub hired: usize,
    /// Workers promoted during the step.
    pub promoted: usize,
    /// Workers that left during the step.
    pub departed: usize,
    /// Manager headcount per sensitive attribute value at the start of the
    /// step.
    pub manager_composition: Composition,
}

impl StepMetrics {
    /// Snapshot the population at the start of `step`.
    pub fn snapshot(
        step: u64,
        employees: &Roster,
        managers: &Roster,
        candidates_remaining: usize,
        schema: &Schema,
    ) -> Self {
        Self {
            step,
            productivity: total_productivity(&[employees, managers]),
            employees: employees.len(),
            managers: managers.len(),
            candidates_remaining,
            hired: 0,
            promoted: 0,
            departed: 0,
            manager_composition: composition(managers, schema),
        }
    }
}

/// Sum of true productivity over the given rosters.
pub fn total_productivity(rosters: &[&Roster]) -> f64 {
    rosters
        .iter()
        .flat_map(|r| r.iter())
        .map(firmsim_types::Worker::true_productivity)
        .sum()
}

/// Count members of `roster` per sensitive attribute value.
fn composition(roster: &Roster, schema: &Schema) -> Composition {
    let mut counts = Composition::new();
    for (index, column) in schema.sensitive_columns.iter().enumerate() {
        let per_value = counts.entry(column.clone()).or_default();
        for worker in roster.iter() {
            if let Some(value) = worker.sensitive_attributes().get(index) {
                let slot = per_value.entry(value.to_string()).or_insert(0);
                *slot = slot.saturating_add(1);
            }
        }
    }
    counts
}

/// Append-only store of [`StepMetrics`].
#[derive(Debug, Clone, Default)]
pub struct DataCollector {
    records: Vec<StepMetrics>,
}

impl DataCollector {
    /// Create an empty collector.
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append one step's record.
    pub fn record(&mut self, metrics: StepMetrics) {
        self.records.push(metrics);
    }

    /// All records in step order.
    pub fn records(&self) -> &[StepMetrics] {
        &self.records
    }

    /// The most recent record.
    pub fn latest(&self) -> Option<&StepMetrics> {
        self.records.last()
    }

    /// Productivity of every recorded step, in step order.
    pub fn productivity_series(&self) -> Vec<f64> {
        self.records.iter().map(|m| m.productivity).collect()
    }
}
