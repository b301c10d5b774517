//! Age-stratified population counts for the start and base reference years

use serde::{Deserialize, Serialize};

use super::{check_age_count, AGE_GROUP_COUNT};
use crate::error::{Error, Result, SchemaKey};

/// Ordinal age cohort; index 0 is the youngest, 20 the oldest tracked cohort.
/// The label is an opaque display string carried through to the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeGroup {
    pub index: usize,
    pub label: String,
}

impl AgeGroup {
    pub fn new(index: usize, label: impl Into<String>) -> Self {
        Self {
            index,
            label: label.into(),
        }
    }

    /// Default labels "0".."20" for tables that carry no age column
    pub fn default_groups() -> Vec<AgeGroup> {
        (0..AGE_GROUP_COUNT)
            .map(|index| AgeGroup::new(index, index.to_string()))
            .collect()
    }
}

/// Male and female counts for one year, indexed by age group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub male: Vec<i64>,
    pub female: Vec<i64>,
}

impl PopulationSnapshot {
    pub fn new(male: Vec<i64>, female: Vec<i64>) -> Self {
        Self { male, female }
    }

    pub fn total_male(&self) -> i64 {
        self.male.iter().sum()
    }

    pub fn total_female(&self) -> i64 {
        self.female.iter().sum()
    }

    fn validate(&self) -> Result<()> {
        check_age_count(PopulationTable::NAME, &self.male)?;
        check_age_count(PopulationTable::NAME, &self.female)
    }
}

/// Population input: start-year and base-year snapshots keyed by age group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationTable {
    pub age_groups: Vec<AgeGroup>,
    pub start: PopulationSnapshot,
    pub base: PopulationSnapshot,
}

impl PopulationTable {
    pub const NAME: &'static str = "population";

    pub fn new(age_groups: Vec<AgeGroup>, start: PopulationSnapshot, base: PopulationSnapshot) -> Self {
        Self {
            age_groups,
            start,
            base,
        }
    }

    /// Build with default "0".."20" age labels
    pub fn with_default_labels(start: PopulationSnapshot, base: PopulationSnapshot) -> Self {
        Self::new(AgeGroup::default_groups(), start, base)
    }

    /// Check that labels and both snapshots cover exactly the tracked age groups,
    /// with every group's index equal to its position
    pub fn validate(&self) -> Result<()> {
        check_age_count(Self::NAME, &self.age_groups)?;
        if let Some(position) = self
            .age_groups
            .iter()
            .enumerate()
            .position(|(position, group)| group.index != position)
        {
            return Err(Error::SchemaMismatch {
                table: Self::NAME,
                key: SchemaKey::AgeGroup(position),
            });
        }
        self.start.validate()?;
        self.base.validate()
    }
}
