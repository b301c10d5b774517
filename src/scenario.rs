//! Scenario runner for batch projections
//!
//! Loads the input tables once, then runs many projections with different
//! year selections or coefficients without re-reading CSV files.

use rayon::prelude::*;

use crate::error::Result;
use crate::projection::{project_with, ProjectionConfig, ProjectionResult};
use crate::tables::{ProjectionInputs, PERIOD_COUNT};

/// Pre-loaded scenario runner
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_csv()?;
///
/// // Sweep the migration coefficient over the slider range
/// let results = runner.run_coefficients(&[0.0, 0.5, 1.0, 1.5, 2.0], [2000, 2010, 2020])?;
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    /// Pre-loaded tables
    base_inputs: ProjectionInputs,
}

impl ScenarioRunner {
    /// Create runner by loading tables from CSV files
    pub fn from_csv() -> Result<Self> {
        Ok(Self {
            base_inputs: ProjectionInputs::from_csv()?,
        })
    }

    /// Create runner from a specific input directory
    pub fn from_csv_path(path: &std::path::Path) -> Result<Self> {
        Ok(Self {
            base_inputs: ProjectionInputs::from_csv_path(path)?,
        })
    }

    /// Create runner with pre-built tables
    pub fn with_inputs(inputs: ProjectionInputs) -> Self {
        Self {
            base_inputs: inputs,
        }
    }

    /// Run a single projection with the given config
    pub fn run(&self, config: &ProjectionConfig) -> Result<ProjectionResult> {
        project_with(&self.base_inputs, config)
    }

    /// Run one projection per coefficient, in parallel. Results keep the input order.
    pub fn run_coefficients(
        &self,
        coefficients: &[f64],
        years: [u32; PERIOD_COUNT],
    ) -> Result<Vec<ProjectionResult>> {
        let config = ProjectionConfig::new(years);
        coefficients
            .par_iter()
            .map(|&coefficient| {
                let mut inputs = self.base_inputs.clone();
                inputs.coefficient = coefficient;
                project_with(&inputs, &config)
            })
            .collect()
    }

    /// Run several year selections against the same tables
    pub fn run_year_sets(&self, year_sets: &[[u32; PERIOD_COUNT]]) -> Result<Vec<ProjectionResult>> {
        year_sets
            .iter()
            .map(|&years| project_with(&self.base_inputs, &ProjectionConfig::new(years)))
            .collect()
    }

    /// Get reference to the tables for inspection
    pub fn inputs(&self) -> &ProjectionInputs {
        &self.base_inputs
    }

    /// Get mutable reference to the tables for edits
    pub fn inputs_mut(&mut self) -> &mut ProjectionInputs {
        &mut self.base_inputs
    }
}
