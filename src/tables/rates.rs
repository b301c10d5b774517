//! Year-indexed fertility and survival rates by age group

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::check_age_count;
use crate::error::{Error, Result};

/// Expected births per female in each age cohort, one column per year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FertilityTable {
    rates: BTreeMap<u32, Vec<f64>>,
}

impl FertilityTable {
    pub const NAME: &'static str = "fertility";

    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the column for a year
    pub fn insert_year(&mut self, year: u32, rates: Vec<f64>) {
        self.rates.insert(year, rates);
    }

    pub fn with_year(mut self, year: u32, rates: Vec<f64>) -> Self {
        self.insert_year(year, rates);
        self
    }

    /// Remove a year's column, returning it if it was present
    pub fn remove_year(&mut self, year: u32) -> Option<Vec<f64>> {
        self.rates.remove(&year)
    }

    /// Rates for a year, checked for the full age range
    pub fn rates_for(&self, year: u32) -> Result<&[f64]> {
        let rates = self
            .rates
            .get(&year)
            .ok_or_else(|| Error::missing_year(Self::NAME, year))?;
        check_age_count(Self::NAME, rates)?;
        Ok(rates)
    }

    /// Mutable access for table edits
    pub fn rates_mut(&mut self, year: u32) -> Option<&mut Vec<f64>> {
        self.rates.get_mut(&year)
    }

    pub fn years(&self) -> impl Iterator<Item = u32> + '_ {
        self.rates.keys().copied()
    }
}

/// Male and female survival probabilities for one year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurvivalRates {
    pub male: Vec<f64>,
    pub female: Vec<f64>,
}

impl SurvivalRates {
    pub fn new(male: Vec<f64>, female: Vec<f64>) -> Self {
        Self { male, female }
    }

    /// Same rate for every age and both sexes
    pub fn flat(rate: f64) -> Self {
        Self::new(vec![rate; super::AGE_GROUP_COUNT], vec![rate; super::AGE_GROUP_COUNT])
    }
}

/// Probability of surviving one projection step, per year, sex and age group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurvivalTable {
    rates: BTreeMap<u32, SurvivalRates>,
}

impl SurvivalTable {
    pub const NAME: &'static str = "survival";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_year(&mut self, year: u32, rates: SurvivalRates) {
        self.rates.insert(year, rates);
    }

    pub fn with_year(mut self, year: u32, rates: SurvivalRates) -> Self {
        self.insert_year(year, rates);
        self
    }

    pub fn remove_year(&mut self, year: u32) -> Option<SurvivalRates> {
        self.rates.remove(&year)
    }

    /// Both sexes' rates for a year, checked for the full age range
    pub fn rates_for(&self, year: u32) -> Result<&SurvivalRates> {
        let rates = self
            .rates
            .get(&year)
            .ok_or_else(|| Error::missing_year(Self::NAME, year))?;
        check_age_count(Self::NAME, &rates.male)?;
        check_age_count(Self::NAME, &rates.female)?;
        Ok(rates)
    }

    pub fn rates_mut(&mut self, year: u32) -> Option<&mut SurvivalRates> {
        self.rates.get_mut(&year)
    }

    pub fn years(&self) -> impl Iterator<Item = u32> + '_ {
        self.rates.keys().copied()
    }
}
