//! Shared type definitions for the firmsim labor-market simulation.
//!
//! This crate is the single source of truth for the records that flow
//! between the data layer, the agent layer and the company model.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe worker identifier
//! - [`enums`] -- Roles, departure reasons, and step phases
//! - [`structs`] -- Worker records, lifecycle status, cell values, events

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{DepartureReason, Phase, Role};
pub use ids::WorkerId;
pub use structs::{EventKind, LifecycleEvent, Status, Value, Worker};
