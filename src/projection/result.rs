//! Result rows and per-period summaries

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One output row: an age group's projected counts under a year tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(skip)]
    pub age_index: usize,
    #[serde(rename = "Age Group")]
    pub age_group: String,
    #[serde(rename = "Year")]
    pub year: u32,
    #[serde(rename = "Male")]
    pub male: i64,
    #[serde(rename = "Female")]
    pub female: i64,
}

impl ResultRow {
    pub fn total(&self) -> i64 {
        self.male.saturating_add(self.female)
    }
}

/// Totals for one projection period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// Period index (0, 1, 2)
    pub period: usize,
    /// Year whose rates drove the period
    pub rate_year: u32,
    /// Year tag on the emitted rows
    pub output_year: u32,
    pub total_male: i64,
    pub total_female: i64,
    pub male_births: i64,
    pub female_births: i64,
    /// Survivors of the oldest cohort dropped from the tracked range
    pub aged_out_male: i64,
    pub aged_out_female: i64,
}

impl PeriodSummary {
    pub fn total(&self) -> i64 {
        self.total_male.saturating_add(self.total_female)
    }
}

/// Complete projection output: 21 rows per period, period-major then age-minor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Year selectors the run used (start, base, target)
    pub years: [u32; 3],

    /// Migration adjustment coefficient the run used
    pub coefficient: f64,

    pub rows: Vec<ResultRow>,

    pub periods: Vec<PeriodSummary>,
}

impl ProjectionResult {
    pub fn new(years: [u32; 3], coefficient: f64) -> Self {
        Self {
            years,
            coefficient,
            rows: Vec::new(),
            periods: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows emitted by one period
    pub fn period_rows(&self, period: usize) -> &[ResultRow] {
        let per_period = self.rows.len() / self.periods.len().max(1);
        let start = (period * per_period).min(self.rows.len());
        let end = (start + per_period).min(self.rows.len());
        &self.rows[start..end]
    }

    /// All rows carrying a year tag; a duplicated tag returns rows from both periods
    pub fn rows_for_year(&self, year: u32) -> Vec<&ResultRow> {
        self.rows.iter().filter(|r| r.year == year).collect()
    }

    /// Distinct year tags in ascending order (the chart year choices)
    pub fn years(&self) -> Vec<u32> {
        let mut years: Vec<u32> = self.rows.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Totals across every period
    pub fn summary(&self) -> ProjectionSummary {
        ProjectionSummary {
            total_rows: self.rows.len(),
            total_male: saturating_total(self.rows.iter().map(|r| r.male)),
            total_female: saturating_total(self.rows.iter().map(|r| r.female)),
            total_births: saturating_total(
                self.periods
                    .iter()
                    .map(|p| p.male_births.saturating_add(p.female_births)),
            ),
            total_aged_out: saturating_total(
                self.periods
                    .iter()
                    .map(|p| p.aged_out_male.saturating_add(p.aged_out_female)),
            ),
        }
    }

    /// Write rows as CSV with header `Age Group,Year,Male,Female`
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub total_rows: usize,
    pub total_male: i64,
    pub total_female: i64,
    pub total_births: i64,
    pub total_aged_out: i64,
}

fn saturating_total(counts: impl Iterator<Item = i64>) -> i64 {
    counts.fold(0, i64::saturating_add)
}
