//! The unhired population.
//!
//! [`CandidatePool::generate`] pulls one dataset from a
//! [`DataSource`], splits it by sensitive-attribute detection, and
//! materializes one candidate per row. The row index becomes the worker id,
//! so ids are unique for the whole run and never reused.

use firmsim_data::{DataSource, Schema};
use firmsim_types::{Worker, WorkerId};
use tracing::{debug, info};

use crate::error::LaborError;
use crate::perception::PerceptionPolicy;
use crate::roster::Roster;

/// Candidates available for hiring, keyed by id in ascending order.
#[derive(Debug, Clone)]
pub struct CandidatePool {
    candidates: Roster,
    schema: Schema,
    generated: usize,
}

impl CandidatePool {
    /// Materialize a pool from one dataset of `source`.
    ///
    /// Perceived productivity of every candidate is derived once here, via
    /// `perception`.
    ///
    /// # Errors
    ///
    /// Returns [`LaborError::Schema`] if the dataset is empty, lacks its
    /// label column, or the feature and sensitive splits disagree in row
    /// count.
    pub fn generate(
        source: &mut dyn DataSource,
        perception: &dyn PerceptionPolicy,
    ) -> Result<Self, LaborError> {
        let table = source.generate_dataset()?;
        let split = table.split()?;

        let mut candidates = Roster::new("candidates");
        let rows = split
            .features
            .into_iter()
            .zip(split.sensitive)
            .zip(split.labels);
        for (row, ((features, sensitive), true_productivity)) in rows.enumerate() {
            let raw = u64::try_from(row).map_err(|_err| LaborError::Schema {
                reason: format!("row index {row} exceeds id range"),
            })?;
            let perceived = perception.perceive(true_productivity, &sensitive, &split.schema);
            candidates.insert(Worker::candidate(
                WorkerId::new(raw),
                features,
                sensitive,
                true_productivity,
                perceived,
            ))?;
        }

        let generated = candidates.len();
        info!(
            candidates = generated,
            features = ?split.schema.feature_columns,
            sensitive = ?split.schema.sensitive_columns,
            "Candidate pool generated"
        );

        Ok(Self {
            candidates,
            schema: split.schema,
            generated,
        })
    }

    /// Remove and return a specific candidate.
    ///
    /// # Errors
    ///
    /// Returns [`LaborError::NotFound`] if the id is not in the pool, e.g.
    /// because it was already hired.
    pub fn take(&mut self, id: WorkerId) -> Result<Worker, LaborError> {
        let worker = self.candidates.remove(id)?;
        debug!(worker_id = %id, remaining = self.candidates.len(), "Candidate taken");
        Ok(worker)
    }

    /// Number of unhired candidates.
    pub fn remaining(&self) -> usize {
        self.candidates.len()
    }

    /// Number of candidates originally materialized.
    pub const fn generated(&self) -> usize {
        self.generated
    }

    /// Whether the id is still in the pool.
    pub fn contains(&self, id: WorkerId) -> bool {
        self.candidates.contains(id)
    }

    /// Iterate over remaining candidates in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Worker> {
        self.candidates.iter()
    }

    /// Column layout shared by every worker of this run.
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }
}
