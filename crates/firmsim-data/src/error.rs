//! Error types for the firmsim-data crate.
//!
//! Every variant describes a dataset that does not satisfy the data source
//! contract. Callers in the agent layer report all of them as schema errors.

/// Errors raised while building, validating, or generating a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The dataset contains no rows.
    #[error("dataset has zero rows")]
    EmptyDataset,

    /// A required column is absent.
    #[error("missing column: {name}")]
    MissingColumn {
        /// Name of the missing column.
        name: String,
    },

    /// The declared label column does not hold numbers.
    #[error("label column {name} is not numeric")]
    NonNumericLabel {
        /// Name of the label column.
        name: String,
    },

    /// Two columns share a name.
    #[error("duplicate column: {name}")]
    DuplicateColumn {
        /// The repeated name.
        name: String,
    },

    /// A column's length disagrees with the first column.
    #[error("column {column} has {found} rows, expected {expected}")]
    RaggedColumns {
        /// The offending column.
        column: String,
        /// Row count of the first column.
        expected: usize,
        /// Row count of the offending column.
        found: usize,
    },

    /// Feature and sensitive-attribute splits disagree in row count.
    #[error("feature split has {features} rows but sensitive split has {sensitive}")]
    RowMismatch {
        /// Rows in the feature split.
        features: usize,
        /// Rows in the sensitive-attribute split.
        sensitive: usize,
    },

    /// A generator parameter is out of range.
    #[error("invalid generator parameter: {reason}")]
    InvalidParameter {
        /// Explanation of what is wrong.
        reason: String,
    },
}
