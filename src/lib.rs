//! Ensemble statistics and skill scores for ensemble data-assimilation studies.
//!
//! The numeric core ([`stats`], [`skill`], [`mask`]) works on borrowed
//! `member × time` arrays and never mutates them. The remaining modules
//! read and write study directories for the `enstat` binary.

pub mod config;
pub mod engine;
pub mod error;
pub mod manager;
pub mod mask;
pub mod model;
pub mod report;
pub mod skill;
pub mod stats;

pub use error::StatsError;
pub use skill::Comparison;
pub use stats::Reference;
