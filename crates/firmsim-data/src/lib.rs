//! Data sources and tabular schema handling for the firmsim simulation.
//!
//! The simulation consumes synthetic individuals as a fixed-schema table:
//! feature columns, recognized sensitive-attribute columns, and one declared
//! productivity (label) column. This crate owns that contract.
//!
//! # Modules
//!
//! - [`error`] -- Schema and generation errors ([`DataError`])
//! - [`table`] -- Columnar [`Table`], sensitive-attribute detection, and the
//!   row-wise [`SplitTable`] used to materialize workers
//! - [`source`] -- The [`DataSource`] trait and a fixed-table implementation
//! - [`generator`] -- Seeded synthetic population generator

pub mod error;
pub mod generator;
pub mod source;
pub mod table;

pub use error::DataError;
pub use generator::{GeneratorDataSource, GeneratorParams};
pub use source::{DataSource, TableDataSource};
pub use table::{Column, ColumnData, SENSITIVE_COLUMNS, Schema, SplitTable, Table};
