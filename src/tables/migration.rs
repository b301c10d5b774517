//! Net migration counts by age group
//!
//! Not year-indexed: the same counts apply to every projection period.

use serde::{Deserialize, Serialize};

use super::{check_age_count, AGE_GROUP_COUNT};
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MigrationTable {
    pub male: Vec<f64>,
    pub female: Vec<f64>,
}

impl MigrationTable {
    pub const NAME: &'static str = "migration";

    pub fn new(male: Vec<f64>, female: Vec<f64>) -> Self {
        Self { male, female }
    }

    /// No migration for any cohort
    pub fn zero() -> Self {
        Self::new(vec![0.0; AGE_GROUP_COUNT], vec![0.0; AGE_GROUP_COUNT])
    }

    pub fn is_zero(&self) -> bool {
        self.male.iter().chain(self.female.iter()).all(|&m| m == 0.0)
    }

    pub fn validate(&self) -> Result<()> {
        check_age_count(Self::NAME, &self.male)?;
        check_age_count(Self::NAME, &self.female)
    }
}
