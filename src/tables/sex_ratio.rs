//! Sex ratio at birth by year

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Males born per 100 females born, one value per year label.
/// Row order is kept because the year selectors list years as they appear.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SexRatioTable {
    ratios: BTreeMap<u32, f64>,
    order: Vec<u32>,
}

impl SexRatioTable {
    pub const NAME: &'static str = "sex ratio";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, year: u32, males_per_100_females: f64) {
        if self.ratios.insert(year, males_per_100_females).is_none() {
            self.order.push(year);
        }
    }

    pub fn with_ratio(mut self, year: u32, males_per_100_females: f64) -> Self {
        self.insert(year, males_per_100_females);
        self
    }

    pub fn remove(&mut self, year: u32) -> Option<f64> {
        self.order.retain(|&y| y != year);
        self.ratios.remove(&year)
    }

    pub fn ratio_for(&self, year: u32) -> Result<f64> {
        self.ratios
            .get(&year)
            .copied()
            .ok_or_else(|| Error::missing_year(Self::NAME, year))
    }

    /// Years in the order they were supplied
    pub fn years(&self) -> &[u32] {
        &self.order
    }

    /// Fraction of births that are male: R / (100 + R)
    pub fn male_share(males_per_100_females: f64) -> f64 {
        males_per_100_females / (100.0 + males_per_100_females)
    }

    /// Fraction of births that are female: 100 / (100 + R)
    pub fn female_share(males_per_100_females: f64) -> f64 {
        100.0 / (100.0 + males_per_100_females)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_years_keep_insertion_order() {
        let table = SexRatioTable::new()
            .with_ratio(2020, 104.0)
            .with_ratio(2000, 106.0)
            .with_ratio(2010, 105.0);
        assert_eq!(table.years(), &[2020, 2000, 2010]);
    }

    #[test]
    fn test_reinsert_does_not_duplicate_year() {
        let mut table = SexRatioTable::new().with_ratio(2000, 106.0);
        table.insert(2000, 103.0);
        assert_eq!(table.years(), &[2000]);
        assert_relative_eq!(table.ratio_for(2000).unwrap(), 103.0);
    }

    #[test]
    fn test_shares_sum_to_one() {
        let male = SexRatioTable::male_share(105.0);
        let female = SexRatioTable::female_share(105.0);
        assert_relative_eq!(male + female, 1.0, epsilon = 1e-12);
        assert_relative_eq!(female, 100.0 / 205.0);
    }

    #[test]
    fn test_missing_year() {
        let table = SexRatioTable::new().with_ratio(2000, 106.0);
        let err = table.ratio_for(2030).unwrap_err();
        assert_eq!(
            err.to_string(),
            "schema mismatch in sex ratio table: missing year 2030"
        );
    }
}
