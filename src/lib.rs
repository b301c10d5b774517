//! Cohort Projection - Cohort-component population projection engine
//!
//! This library provides:
//! - Typed input tables (population, fertility, survival, sex ratio, migration) with CSV loading
//! - Three-period projection of male and female population by age group
//! - Long-format result rows with CSV/JSON output and per-period summaries
//! - Batch runs for coefficient sweeps and alternative year selections
//! - A linear economic effect score

pub mod error;
pub mod tables;
pub mod projection;
pub mod scenario;
pub mod economic;

// Re-export commonly used types
pub use error::{Error, Result};
pub use tables::{ProjectionInputs, PopulationTable, FertilityTable, SurvivalTable, SexRatioTable, MigrationTable};
pub use projection::{project, ProjectionEngine, ProjectionConfig, ProjectionResult, ResultRow};
pub use scenario::ScenarioRunner;
