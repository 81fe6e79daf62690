//! The data source contract consumed by the candidate pool.
//!
//! A [`DataSource`] produces one [`Table`] per call. The simulation pulls a
//! single dataset at construction time and materializes every row as a
//! candidate.

use crate::error::DataError;
use crate::table::Table;

/// A producer of fixed-schema synthetic populations.
///
/// Implementations may hold random state, hence `&mut self`.
pub trait DataSource {
    /// Produce one dataset.
    ///
    /// # Errors
    ///
    /// Returns [`DataError`] if the dataset cannot be built or violates the
    /// schema contract.
    fn generate_dataset(&mut self) -> Result<Table, DataError>;
}

/// A data source that always returns the same table.
///
/// Useful for replaying a recorded population and for tests that need
/// exact productivity values.
#[derive(Debug, Clone)]
pub struct TableDataSource {
    table: Table,
}

impl TableDataSource {
    /// Wrap an existing table.
    pub const fn new(table: Table) -> Self {
        Self { table }
    }
}

impl DataSource for TableDataSource {
    fn generate_dataset(&mut self) -> Result<Table, DataError> {
        Ok(self.table.clone())
    }
}
