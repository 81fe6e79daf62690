//! Company model, ranking, and step orchestration for the firmsim simulation.
//!
//! This crate owns the per-step state machine of the firm: metrics
//! collection, attrition, hiring and promotion, applied in a fixed order
//! over a seeded random stream.
//!
//! # Modules
//!
//! - [`collector`] -- Per-step metrics ([`DataCollector`])
//! - [`company`] -- The orchestrator ([`CompanyModel`]) and its step cycle
//! - [`config`] -- Configuration loading from YAML into typed structs
//! - [`dataset`] -- Assembly of feature / sensitive / label tables
//! - [`ranker`] -- Candidate selection, promotion nomination, and the
//!   [`ScoringModel`] trait
//! - [`runner`] -- Bounded driver loop over [`CompanyModel::step`]
//!
//! [`DataCollector`]: collector::DataCollector
//! [`CompanyModel`]: company::CompanyModel
//! [`CompanyModel::step`]: company::CompanyModel::step
//! [`ScoringModel`]: ranker::ScoringModel

pub mod collector;
pub mod company;
pub mod config;
pub mod dataset;
pub mod ranker;
pub mod runner;
