//! Input tables for the projection: population, fertility, survival, sex ratio and migration

mod population;
mod rates;
mod sex_ratio;
mod migration;
pub mod loader;

pub use population::{AgeGroup, PopulationSnapshot, PopulationTable};
pub use rates::{FertilityTable, SurvivalTable, SurvivalRates};
pub use sex_ratio::SexRatioTable;
pub use migration::MigrationTable;

use std::cmp::Ordering;
use std::path::Path;

use crate::error::{Error, Result, SchemaKey};

/// Number of tracked age groups (0..=20)
pub const AGE_GROUP_COUNT: usize = 21;

/// Number of projection periods per run
pub const PERIOD_COUNT: usize = 3;

/// Valid range of the migration adjustment coefficient
pub const COEFFICIENT_MIN: f64 = 0.0;
pub const COEFFICIENT_MAX: f64 = 2.0;

/// Fail with SchemaMismatch unless `values` holds exactly one entry per age group
pub(crate) fn check_age_count<T>(table: &'static str, values: &[T]) -> Result<()> {
    match values.len().cmp(&AGE_GROUP_COUNT) {
        Ordering::Equal => Ok(()),
        Ordering::Less => Err(Error::SchemaMismatch {
            table,
            key: SchemaKey::AgeGroup(values.len()),
        }),
        Ordering::Greater => Err(Error::SchemaMismatch {
            table,
            key: SchemaKey::SurplusAgeGroups {
                actual: values.len(),
                expected: AGE_GROUP_COUNT,
            },
        }),
    }
}

/// Container for every table a projection consumes
#[derive(Debug, Clone)]
pub struct ProjectionInputs {
    pub population: PopulationTable,
    pub fertility: FertilityTable,
    pub survival: SurvivalTable,
    pub sex_ratio: SexRatioTable,
    pub migration: MigrationTable,
    /// Migration adjustment coefficient, nominally in [0.0, 2.0]
    pub coefficient: f64,
}

impl ProjectionInputs {
    /// Load every table from CSV files in the default location (data/inputs/)
    pub fn from_csv() -> Result<Self> {
        Self::from_csv_path(Path::new(loader::DEFAULT_INPUT_PATH))
    }

    /// Load every table from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        loader::LoadedTables::load_from(path).map(Self::from_loaded)
    }

    pub fn from_loaded(loaded: loader::LoadedTables) -> Self {
        Self {
            population: loaded.population,
            fertility: loaded.fertility,
            survival: loaded.survival,
            sex_ratio: loaded.sex_ratio,
            migration: loaded.migration,
            coefficient: loaded.coefficient,
        }
    }

    /// Years offered to the year selectors, in sex-ratio table order
    pub fn available_years(&self) -> &[u32] {
        self.sex_ratio.years()
    }

    /// First three available years as (start, base, target)
    pub fn default_years(&self) -> Option<[u32; PERIOD_COUNT]> {
        match self.available_years() {
            [start, base, target, ..] => Some([*start, *base, *target]),
            _ => None,
        }
    }

    /// Check every table against the requested years before any period runs
    pub fn validate(&self, years: &[u32; PERIOD_COUNT]) -> Result<()> {
        self.population.validate()?;
        self.migration.validate()?;
        for &year in years {
            self.fertility.rates_for(year)?;
            self.survival.rates_for(year)?;
            self.sex_ratio.ratio_for(year)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small synthetic tables shared by tests across the crate

    use super::*;

    pub const YEARS: [u32; PERIOD_COUNT] = [2000, 2010, 2020];

    /// Populations, rates and migration that vary by age so shifts are visible
    pub fn sample_inputs() -> ProjectionInputs {
        let start = PopulationSnapshot::new(
            (0..AGE_GROUP_COUNT as i64).map(|a| 1000 + 10 * a).collect(),
            (0..AGE_GROUP_COUNT as i64).map(|a| 1100 + 10 * a).collect(),
        );
        let base = PopulationSnapshot::new(
            (0..AGE_GROUP_COUNT as i64).map(|a| 1200 + 5 * a).collect(),
            (0..AGE_GROUP_COUNT as i64).map(|a| 1250 + 5 * a).collect(),
        );

        let fertility_rates: Vec<f64> = (0..AGE_GROUP_COUNT)
            .map(|a| if (3..=9).contains(&a) { 0.08 } else { 0.0 })
            .collect();

        let mut fertility = FertilityTable::new();
        let mut survival = SurvivalTable::new();
        let mut sex_ratio = SexRatioTable::new();
        for (i, &year) in YEARS.iter().enumerate() {
            fertility.insert_year(year, fertility_rates.clone());
            survival.insert_year(
                year,
                SurvivalRates::new(
                    vec![0.97 - 0.01 * i as f64; AGE_GROUP_COUNT],
                    vec![0.98 - 0.01 * i as f64; AGE_GROUP_COUNT],
                ),
            );
            sex_ratio.insert(year, 105.0 + i as f64);
        }

        let migration = MigrationTable::new(
            (0..AGE_GROUP_COUNT).map(|a| if a % 2 == 0 { 20.0 } else { -15.0 }).collect(),
            (0..AGE_GROUP_COUNT).map(|a| if a % 3 == 0 { 30.0 } else { 5.0 }).collect(),
        );

        ProjectionInputs {
            population: PopulationTable::with_default_labels(start, base),
            fertility,
            survival,
            sex_ratio,
            migration,
            coefficient: 1.0,
        }
    }
}
