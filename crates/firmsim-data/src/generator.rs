//! Seeded synthetic population generator.
//!
//! Produces the five-column dataset used by the command-line driver:
//!
//! | Column         | Kind        | Distribution                                  |
//! |----------------|-------------|-----------------------------------------------|
//! | `experience`   | numeric     | Normal(5, 2)                                  |
//! | `skill`        | numeric     | Uniform(1, 10)                                |
//! | `gender`       | categorical | exact shares from `gender_proportions`        |
//! | `ethnicity`    | categorical | exact shares from `ethnicity_proportions`     |
//! | `productivity` | numeric     | 0.5 experience + 0.5 skill + Normal(0, 1)     |
//!
//! Productivity is clamped into `[productivity_min, productivity_max]`.
//! Each category gets `floor(share * n)` rows; leftover rows are handed out
//! round-robin over the categories in key order.
//!
//! # Determinism
//!
//! All draws come from a `ChaCha8Rng` seeded at construction and happen in a
//! fixed order (genders, ethnicities, experience, skill, noise), so the same
//! seed and parameters always yield the same table.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

use crate::error::DataError;
use crate::source::DataSource;
use crate::table::{Column, Table};

/// Weight of experience in the productivity formula.
const EXPERIENCE_WEIGHT: f64 = 0.5;

/// Weight of skill in the productivity formula.
const SKILL_WEIGHT: f64 = 0.5;

/// Name of the generated label column.
pub const PRODUCTIVITY_COLUMN: &str = "productivity";

/// Parameters for the synthetic generator.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorParams {
    /// Number of individuals (rows) to produce.
    pub num_workers: usize,
    /// Share of each gender value; shares need not sum to one.
    pub gender_proportions: BTreeMap<String, f64>,
    /// Share of each ethnicity value; shares need not sum to one.
    pub ethnicity_proportions: BTreeMap<String, f64>,
    /// Lower productivity bound.
    pub productivity_min: f64,
    /// Upper productivity bound.
    pub productivity_max: f64,
}

/// Data source producing a fresh synthetic population on each call.
#[derive(Debug, Clone)]
pub struct GeneratorDataSource {
    params: GeneratorParams,
    rng: ChaCha8Rng,
}

impl GeneratorDataSource {
    /// Create a generator seeded with `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidParameter`] if the worker count is zero,
    /// a proportion map is empty or holds a negative or non-finite share, or
    /// the productivity bounds are inverted.
    pub fn new(params: GeneratorParams, seed: u64) -> Result<Self, DataError> {
        if params.num_workers == 0 {
            return Err(DataError::InvalidParameter {
                reason: "num_workers must be at least 1".to_owned(),
            });
        }
        validate_proportions("gender", &params.gender_proportions)?;
        validate_proportions("ethnicity", &params.ethnicity_proportions)?;
        if params.productivity_min > params.productivity_max {
            return Err(DataError::InvalidParameter {
                reason: format!(
                    "productivity_min {} exceeds productivity_max {}",
                    params.productivity_min, params.productivity_max
                ),
            });
        }
        Ok(Self {
            params,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Return the generator parameters.
    pub const fn params(&self) -> &GeneratorParams {
        &self.params
    }

    /// Produce `num_workers` category labels with exact shares, shuffled.
    fn categorical(&mut self, proportions: &BTreeMap<String, f64>) -> Vec<String> {
        let n = self.params.num_workers;
        let mut values = Vec::with_capacity(n);
        for (label, &share) in proportions {
            let count = share_of(share, n);
            values.extend(std::iter::repeat_n(label.clone(), count));
        }
        // Shares that round down leave a remainder; fill it round-robin in
        // key order so every row gets a value.
        let labels: Vec<&String> = proportions.keys().collect();
        let mut next = 0_usize;
        while values.len() < n && !labels.is_empty() {
            if let Some(label) = labels.get(next.checked_rem(labels.len()).unwrap_or(0)) {
                values.push((*label).clone());
            }
            next = next.saturating_add(1);
        }
        values.shuffle(&mut self.rng);
        values.truncate(n);
        values
    }

    /// Weighted productivity with Gaussian noise, clamped to the bounds.
    fn productivity(&mut self, experience: &[f64], skill: &[f64]) -> Result<Vec<f64>, DataError> {
        let noise = Normal::new(0.0, 1.0).map_err(|e| DataError::InvalidParameter {
            reason: format!("noise distribution: {e}"),
        })?;
        Ok(experience
            .iter()
            .zip(skill)
            .map(|(e, s)| {
                let base = e.mul_add(EXPERIENCE_WEIGHT, s * SKILL_WEIGHT);
                (base + noise.sample(&mut self.rng))
                    .clamp(self.params.productivity_min, self.params.productivity_max)
            })
            .collect())
    }
}

impl DataSource for GeneratorDataSource {
    fn generate_dataset(&mut self) -> Result<Table, DataError> {
        let n = self.params.num_workers;
        let genders_share = self.params.gender_proportions.clone();
        let ethnicity_share = self.params.ethnicity_proportions.clone();

        let genders = self.categorical(&genders_share);
        let ethnicities = self.categorical(&ethnicity_share);

        let experience_dist = Normal::new(5.0, 2.0).map_err(|e| DataError::InvalidParameter {
            reason: format!("experience distribution: {e}"),
        })?;
        let experience: Vec<f64> = (0..n).map(|_| experience_dist.sample(&mut self.rng)).collect();
        let skill: Vec<f64> = (0..n).map(|_| self.rng.random_range(1.0..10.0)).collect();
        let productivity = self.productivity(&experience, &skill)?;

        debug!(rows = n, "Synthetic population generated");

        Table::new(
            vec![
                Column::numeric("experience", experience),
                Column::numeric("skill", skill),
                Column::categorical("gender", genders),
                Column::categorical("ethnicity", ethnicities),
                Column::numeric(PRODUCTIVITY_COLUMN, productivity),
            ],
            PRODUCTIVITY_COLUMN,
        )
    }
}

/// Reject empty maps and negative or non-finite shares.
fn validate_proportions(name: &str, proportions: &BTreeMap<String, f64>) -> Result<(), DataError> {
    if proportions.is_empty() {
        return Err(DataError::InvalidParameter {
            reason: format!("{name} proportions must not be empty"),
        });
    }
    if let Some((label, share)) = proportions
        .iter()
        .find(|(_, share)| !share.is_finite() || **share < 0.0)
    {
        return Err(DataError::InvalidParameter {
            reason: format!("{name} proportion for {label} is {share}"),
        });
    }
    Ok(())
}

/// `floor(share * n)`, capped at `n`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn share_of(share: f64, n: usize) -> usize {
    let raw = (share * n as f64).floor();
    if raw <= 0.0 { 0 } else { (raw as usize).min(n) }
}
