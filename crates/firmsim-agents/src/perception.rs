//! Perceived-productivity transforms.
//!
//! Hiring and promotion only ever see perceived productivity. How it is
//! derived from the hidden true value is a replaceable policy: the default
//! subtracts a fixed offset for everyone, [`GroupPenalty`] additionally
//! penalises one demographic group.

use firmsim_data::Schema;
use firmsim_types::Value;

/// Default offset subtracted by [`FixedOffset`].
pub const DEFAULT_PERCEPTION_OFFSET: f64 = 1.0;

/// Maps a worker's true productivity to what decision makers perceive.
pub trait PerceptionPolicy {
    /// Compute perceived productivity.
    ///
    /// `sensitive` is laid out according to `schema.sensitive_columns`.
    fn perceive(&self, true_productivity: f64, sensitive: &[Value], schema: &Schema) -> f64;
}

/// Perceived = true - `offset`, identical for every worker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedOffset {
    /// Amount subtracted from true productivity.
    pub offset: f64,
}

impl Default for FixedOffset {
    fn default() -> Self {
        Self {
            offset: DEFAULT_PERCEPTION_OFFSET,
        }
    }
}

impl PerceptionPolicy for FixedOffset {
    fn perceive(&self, true_productivity: f64, _sensitive: &[Value], _schema: &Schema) -> f64 {
        true_productivity - self.offset
    }
}

/// Perceived = true - `offset`, minus `penalty` for members of one group.
///
/// A worker belongs to the group when its `attribute` column equals
/// `value`. If the schema lacks the attribute nobody is penalised.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupPenalty {
    /// Sensitive column to inspect (e.g. `gender`).
    pub attribute: String,
    /// Category that receives the penalty (e.g. `female`).
    pub value: String,
    /// Extra amount subtracted for the group.
    pub penalty: f64,
    /// Amount subtracted from everyone.
    pub offset: f64,
}

impl PerceptionPolicy for GroupPenalty {
    fn perceive(&self, true_productivity: f64, sensitive: &[Value], schema: &Schema) -> f64 {
        let in_group = schema
            .sensitive_index(&self.attribute)
            .and_then(|idx| sensitive.get(idx))
            .and_then(Value::as_category)
            .is_some_and(|category| category == self.value);
        let base = true_productivity - self.offset;
        if in_group { base - self.penalty } else { base }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema {
            feature_columns: vec!["skill".to_owned()],
            sensitive_columns: vec!["gender".to_owned(), "ethnicity".to_owned()],
            label_column: "productivity".to_owned(),
        }
    }

    #[test]
    fn fixed_offset_subtracts_constant() {
        let policy = FixedOffset { offset: 0.5 };
        let perceived = policy.perceive(4.0, &[], &schema());
        assert!((perceived - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn default_offset_is_one() {
        let perceived = FixedOffset::default().perceive(4.0, &[], &schema());
        assert!((perceived - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn group_penalty_hits_only_the_group() {
        let policy = GroupPenalty {
            attribute: "gender".to_owned(),
            value: "female".to_owned(),
            penalty: 2.0,
            offset: 0.0,
        };
        let female = [Value::from("female"), Value::from("white")];
        let male = [Value::from("male"), Value::from("white")];
        assert!((policy.perceive(5.0, &female, &schema()) - 3.0).abs() < f64::EPSILON);
        assert!((policy.perceive(5.0, &male, &schema()) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn group_penalty_ignores_unknown_attribute() {
        let policy = GroupPenalty {
            attribute: "age_band".to_owned(),
            value: "senior".to_owned(),
            penalty: 2.0,
            offset: 1.0,
        };
        let row = [Value::from("female"), Value::from("white")];
        assert!((policy.perceive(5.0, &row, &schema()) - 4.0).abs() < f64::EPSILON);
    }
}
