//! Columnar dataset and its split into features, sensitive attributes and labels.
//!
//! A [`Table`] is what a [`DataSource`](crate::DataSource) produces. It
//! declares its label column explicitly; the label must exist and be numeric.
//! [`Table::split`] detects the reserved sensitive-attribute columns by name,
//! removes them and the label from the feature set, and returns a row-wise
//! [`SplitTable`]. Column order is preserved, so the feature and sensitive
//! orderings are fixed for the lifetime of a run.

use std::collections::BTreeSet;

use firmsim_types::Value;

use crate::error::DataError;

/// Reserved column names treated as sensitive attributes, in detection order.
pub const SENSITIVE_COLUMNS: &[&str] = &["gender", "ethnicity"];

/// The values held by one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Real-valued column.
    Numeric(Vec<f64>),
    /// Categorical column.
    Categorical(Vec<String>),
}

impl ColumnData {
    /// Number of rows in the column.
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Categorical(v) => v.len(),
        }
    }

    /// Whether the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the cell at `row` as a [`Value`].
    pub fn value(&self, row: usize) -> Option<Value> {
        match self {
            Self::Numeric(v) => v.get(row).copied().map(Value::Number),
            Self::Categorical(v) => v.get(row).cloned().map(Value::Category),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Column values.
    pub data: ColumnData,
}

impl Column {
    /// Build a numeric column.
    pub fn numeric(name: &str, values: Vec<f64>) -> Self {
        Self {
            name: name.to_owned(),
            data: ColumnData::Numeric(values),
        }
    }

    /// Build a categorical column.
    pub fn categorical(name: &str, values: Vec<String>) -> Self {
        Self {
            name: name.to_owned(),
            data: ColumnData::Categorical(values),
        }
    }
}

/// Column names of a split dataset, in the order rows are laid out.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    /// Feature column names (sensitive and label columns excluded).
    pub feature_columns: Vec<String>,
    /// Detected sensitive-attribute column names.
    pub sensitive_columns: Vec<String>,
    /// The productivity column.
    pub label_column: String,
}

impl Schema {
    /// Position of a sensitive attribute within the sensitive vector.
    pub fn sensitive_index(&self, name: &str) -> Option<usize> {
        self.sensitive_columns.iter().position(|c| c == name)
    }
}

/// A validated column-oriented dataset with a declared label column.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    label: String,
    rows: usize,
}

impl Table {
    /// Validate and build a table.
    ///
    /// # Errors
    ///
    /// - [`DataError::DuplicateColumn`] if two columns share a name.
    /// - [`DataError::RaggedColumns`] if columns differ in length.
    /// - [`DataError::MissingColumn`] if `label` names no column.
    /// - [`DataError::NonNumericLabel`] if the label column is categorical.
    pub fn new(columns: Vec<Column>, label: &str) -> Result<Self, DataError> {
        let mut seen = BTreeSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(DataError::DuplicateColumn {
                    name: column.name.clone(),
                });
            }
        }

        let rows = columns.first().map_or(0, |c| c.data.len());
        for column in &columns {
            if column.data.len() != rows {
                return Err(DataError::RaggedColumns {
                    column: column.name.clone(),
                    expected: rows,
                    found: column.data.len(),
                });
            }
        }

        let label_column = columns
            .iter()
            .find(|c| c.name == label)
            .ok_or_else(|| DataError::MissingColumn {
                name: label.to_owned(),
            })?;
        if !matches!(label_column.data, ColumnData::Numeric(_)) {
            return Err(DataError::NonNumericLabel {
                name: label.to_owned(),
            });
        }

        Ok(Self {
            columns,
            label: label.to_owned(),
            rows,
        })
    }

    /// Number of rows.
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Name of the declared label column.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// All column names in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Split into feature, sensitive-attribute and label rows.
    ///
    /// Sensitive columns are the subset of [`SENSITIVE_COLUMNS`] present in
    /// the table, in that list's order. A table without any of them yields
    /// an empty sensitive split (every row gets an empty vector).
    ///
    /// # Errors
    ///
    /// - [`DataError::EmptyDataset`] if the table has zero rows.
    /// - [`DataError::RowMismatch`] if the splits disagree in row count.
    pub fn split(&self) -> Result<SplitTable, DataError> {
        if self.rows == 0 {
            return Err(DataError::EmptyDataset);
        }

        let sensitive: Vec<&Column> = SENSITIVE_COLUMNS
            .iter()
            .filter_map(|name| self.column(name))
            .collect();
        let features: Vec<&Column> = self
            .columns
            .iter()
            .filter(|c| c.name != self.label && !SENSITIVE_COLUMNS.contains(&c.name.as_str()))
            .collect();

        let feature_rows = rows_of(&features, self.rows);
        let sensitive_rows = rows_of(&sensitive, self.rows);
        if feature_rows.len() != sensitive_rows.len() {
            return Err(DataError::RowMismatch {
                features: feature_rows.len(),
                sensitive: sensitive_rows.len(),
            });
        }

        let labels = match self.column(&self.label).map(|c| &c.data) {
            Some(ColumnData::Numeric(values)) => values.clone(),
            Some(ColumnData::Categorical(_)) => {
                return Err(DataError::NonNumericLabel {
                    name: self.label.clone(),
                });
            }
            None => {
                return Err(DataError::MissingColumn {
                    name: self.label.clone(),
                });
            }
        };

        Ok(SplitTable {
            schema: Schema {
                feature_columns: features.iter().map(|c| c.name.clone()).collect(),
                sensitive_columns: sensitive.iter().map(|c| c.name.clone()).collect(),
                label_column: self.label.clone(),
            },
            features: feature_rows,
            sensitive: sensitive_rows,
            labels,
        })
    }
}

/// Transpose the selected columns into rows.
fn rows_of(columns: &[&Column], rows: usize) -> Vec<Vec<Value>> {
    (0..rows)
        .map(|row| {
            columns
                .iter()
                .filter_map(|c| c.data.value(row))
                .collect()
        })
        .collect()
}

/// Row-wise view of a table after sensitive-attribute detection.
///
/// `features`, `sensitive` and `labels` are row-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitTable {
    /// Column names for the three splits.
    pub schema: Schema,
    /// Feature rows.
    pub features: Vec<Vec<Value>>,
    /// Sensitive-attribute rows.
    pub sensitive: Vec<Vec<Value>>,
    /// Productivity per row.
    pub labels: Vec<f64>,
}

impl SplitTable {
    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.labels.len()
    }
}
