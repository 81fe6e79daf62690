//! Worker records, candidate pool, and lifecycle transitions for firmsim.
//!
//! This crate is the logic layer for individual workers -- everything that
//! operates on worker records without knowing about the step loop. It sits
//! between `firmsim-types` (the records) and `firmsim-core` (orchestration).
//!
//! # Modules
//!
//! - [`config`] -- Leaving probabilities per role ([`AttritionConfig`])
//! - [`error`] -- The shared error taxonomy ([`LaborError`])
//! - [`lifecycle`] -- Status transitions and the per-step attrition check
//! - [`perception`] -- Pluggable perceived-productivity transforms
//! - [`pool`] -- The unhired population ([`CandidatePool`])
//! - [`roster`] -- Ordered id-to-record containers ([`Roster`])

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod perception;
pub mod pool;
pub mod roster;

// Re-export primary types at crate root for convenience.
pub use config::AttritionConfig;
pub use error::LaborError;
pub use perception::{FixedOffset, GroupPenalty, PerceptionPolicy};
pub use pool::CandidatePool;
pub use roster::Roster;
