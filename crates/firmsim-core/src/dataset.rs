//! Assembly of training-format tables from the worker population.
//!
//! [`build_dataset`] turns rosters into three row-aligned tables: a feature
//! matrix `X`, a sensitive-attribute matrix `S`, and a label vector `y`.
//! Active workers come first (rosters in the order given, each in insertion
//! order), followed by an optional prefix of the historical population.
//!
//! Row-count law: `rows = |active| + floor(past_fraction * |past|)`, or
//! `|active| + |past|` when `past_fraction == 1`.

use firmsim_agents::{LaborError, Roster};
use firmsim_data::Schema;
use firmsim_types::{Value, Worker};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Options controlling dataset assembly.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DatasetOptions {
    /// Fraction of the historical population appended after the active one,
    /// in `[0, 1]`.
    #[serde(default)]
    pub past_fraction: f64,
    /// Label with perceived instead of true productivity.
    #[serde(default)]
    pub use_perceived: bool,
    /// Restrict `S` to this single sensitive attribute.
    #[serde(default)]
    pub sensitive_attribute: Option<String>,
}

/// Three row-aligned tables plus their column names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingData {
    /// Column names of `features`.
    pub feature_columns: Vec<String>,
    /// Column names of `sensitive`.
    pub sensitive_columns: Vec<String>,
    /// Name of the label.
    pub label_column: String,
    /// Feature matrix `X`.
    pub features: Vec<Vec<Value>>,
    /// Sensitive-attribute matrix `S`.
    pub sensitive: Vec<Vec<Value>>,
    /// Label vector `y`.
    pub labels: Vec<f64>,
}

impl TrainingData {
    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.labels.len()
    }
}

/// Assemble `X`, `S`, `y` from active and historical rosters.
///
/// Pure and deterministic: the same rosters and options always yield the
/// same tables.
///
/// # Errors
///
/// - [`LaborError::Schema`] if `sensitive_attribute` names an unknown column.
/// - [`LaborError::Shape`] if the assembled tables disagree in row count.
pub fn build_dataset(
    population: &[&Roster],
    past_population: &[&Roster],
    schema: &Schema,
    options: &DatasetOptions,
) -> Result<TrainingData, LaborError> {
    let filter = match options.sensitive_attribute.as_deref() {
        Some(name) => Some(schema.sensitive_index(name).ok_or_else(|| LaborError::Schema {
            reason: format!("unknown sensitive attribute: {name}"),
        })?),
        None => None,
    };

    let past_total: usize = past_population.iter().map(|r| r.len()).sum();
    let past_taken = past_rows(options.past_fraction, past_total);

    let active = population.iter().flat_map(|r| r.iter());
    let past = past_population
        .iter()
        .flat_map(|r| r.iter())
        .take(past_taken);

    let mut data = TrainingData {
        feature_columns: schema.feature_columns.clone(),
        sensitive_columns: filter.map_or_else(
            || schema.sensitive_columns.clone(),
            |idx| schema.sensitive_columns.get(idx).cloned().into_iter().collect(),
        ),
        label_column: schema.label_column.clone(),
        features: Vec::new(),
        sensitive: Vec::new(),
        labels: Vec::new(),
    };

    for worker in active.chain(past) {
        data.features.push(worker.features().to_vec());
        data.sensitive.push(sensitive_row(worker, filter));
        data.labels.push(if options.use_perceived {
            worker.perceived_productivity()
        } else {
            worker.true_productivity()
        });
    }

    if data.features.len() != data.labels.len() || data.sensitive.len() != data.labels.len() {
        return Err(LaborError::Shape {
            features: data.features.len(),
            sensitive: data.sensitive.len(),
            labels: data.labels.len(),
        });
    }

    debug!(
        rows = data.rows(),
        past_rows = past_taken,
        past_total,
        use_perceived = options.use_perceived,
        "Training data assembled"
    );

    Ok(data)
}

/// Number of historical rows to include.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn past_rows(fraction: f64, total: usize) -> usize {
    if fraction >= 1.0 {
        total
    } else if fraction <= 0.0 || fraction.is_nan() {
        0
    } else {
        ((fraction * total as f64).floor() as usize).min(total)
    }
}

fn sensitive_row(worker: &Worker, filter: Option<usize>) -> Vec<Value> {
    match filter {
        Some(idx) => worker
            .sensitive_attributes()
            .get(idx)
            .cloned()
            .into_iter()
            .collect(),
        None => worker.sensitive_attributes().to_vec(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use firmsim_agents::lifecycle;
    use firmsim_types::WorkerId;

    use super::*;

    fn schema() -> Schema {
        Schema {
            feature_columns: vec!["skill".to_owned()],
            sensitive_columns: vec!["gender".to_owned(), "ethnicity".to_owned()],
            label_column: "productivity".to_owned(),
        }
    }

    fn employee(id: u64) -> Worker {
        let raw = u32::try_from(id).unwrap();
        let candidate = Worker::candidate(
            WorkerId::new(id),
            vec![Value::Number(f64::from(raw))],
            vec![Value::from("female"), Value::from("black")],
            f64::from(raw) + 10.0,
            f64::from(raw),
        );
        lifecycle::hire(&candidate, 0).unwrap()
    }

    fn roster(name: &'static str, ids: &[u64]) -> Roster {
        let mut r = Roster::new(name);
        for &id in ids {
            r.insert(employee(id)).unwrap();
        }
        r
    }

    #[test]
    fn active_population_in_roster_order() {
        let employees = roster("employees", &[3, 1]);
        let managers = roster("managers", &[7]);
        let data = build_dataset(
            &[&employees, &managers],
            &[],
            &schema(),
            &DatasetOptions::default(),
        )
        .unwrap();
        assert_eq!(data.rows(), 3);
        assert_eq!(data.labels, vec![13.0, 11.0, 17.0]);
        assert_eq!(data.features[2], vec![Value::Number(7.0)]);
        assert_eq!(data.sensitive_columns, vec!["gender", "ethnicity"]);
    }

    #[test]
    fn perceived_labels_on_request() {
        let employees = roster("employees", &[2]);
        let options = DatasetOptions {
            use_perceived: true,
            ..DatasetOptions::default()
        };
        let data = build_dataset(&[&employees], &[], &schema(), &options).unwrap();
        assert_eq!(data.labels, vec![2.0]);
    }

    #[test]
    fn past_fraction_takes_floor_prefix() {
        let employees = roster("employees", &[1]);
        let past = roster("past_employees", &[10, 11, 12, 13, 14]);
        let options = DatasetOptions {
            past_fraction: 0.5,
            ..DatasetOptions::default()
        };
        let data = build_dataset(&[&employees], &[&past], &schema(), &options).unwrap();
        // 1 active + floor(0.5 * 5) = 3
        assert_eq!(data.rows(), 3);
        assert_eq!(data.labels, vec![11.0, 20.0, 21.0]);
    }

    #[test]
    fn full_past_fraction_takes_everything_across_rosters() {
        let employees = roster("employees", &[1]);
        let past_employees = roster("past_employees", &[10, 11]);
        let past_managers = roster("past_managers", &[20]);
        let options = DatasetOptions {
            past_fraction: 1.0,
            ..DatasetOptions::default()
        };
        let data = build_dataset(
            &[&employees],
            &[&past_employees, &past_managers],
            &schema(),
            &options,
        )
        .unwrap();
        assert_eq!(data.rows(), 4);
        assert!((data.labels[3] - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_past_fraction_ignores_history() {
        let employees = roster("employees", &[1, 2]);
        let past = roster("past_employees", &[10]);
        let data = build_dataset(
            &[&employees],
            &[&past],
            &schema(),
            &DatasetOptions::default(),
        )
        .unwrap();
        assert_eq!(data.rows(), 2);
    }

    #[test]
    fn sensitive_filter_selects_one_column() {
        let employees = roster("employees", &[1]);
        let options = DatasetOptions {
            sensitive_attribute: Some("ethnicity".to_owned()),
            ..DatasetOptions::default()
        };
        let data = build_dataset(&[&employees], &[], &schema(), &options).unwrap();
        assert_eq!(data.sensitive_columns, vec!["ethnicity"]);
        assert_eq!(data.sensitive[0], vec![Value::from("black")]);
    }

    #[test]
    fn unknown_sensitive_filter_is_schema_error() {
        let employees = roster("employees", &[1]);
        let options = DatasetOptions {
            sensitive_attribute: Some("age".to_owned()),
            ..DatasetOptions::default()
        };
        let result = build_dataset(&[&employees], &[], &schema(), &options);
        assert!(matches!(result, Err(LaborError::Schema { .. })));
    }

    #[test]
    fn past_rows_rounds_down() {
        assert_eq!(past_rows(0.3, 10), 3);
        assert_eq!(past_rows(0.39, 10), 3);
        assert_eq!(past_rows(1.0, 7), 7);
        assert_eq!(past_rows(0.0, 7), 0);
        assert_eq!(past_rows(0.5, 0), 0);
    }
}
