//! Cohort-component projection engine
//!
//! Each of the three periods is projected independently:
//! births are accumulated from the female source cohorts, every cohort is
//! aged forward one slot, newborns are placed at age 0 and the relative
//! migration correction is applied last.

use log::{debug, info, warn};

use super::result::{PeriodSummary, ProjectionResult, ResultRow};
use super::state::PeriodBuffers;
use crate::error::{Error, Result};
use crate::tables::{
    PopulationSnapshot, ProjectionInputs, SexRatioTable, AGE_GROUP_COUNT, COEFFICIENT_MAX,
    COEFFICIENT_MIN, PERIOD_COUNT,
};

/// How the engine treats a coefficient outside [0.0, 2.0]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoefficientPolicy {
    /// Reject with a configuration error before any period runs
    #[default]
    Strict,
    /// Compute with the value as given and log a warning; never clamps
    Permissive,
}

/// Configuration for a projection run
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionConfig {
    /// Year selectors: start, base and target
    pub years: [u32; PERIOD_COUNT],

    pub coefficient_policy: CoefficientPolicy,
}

impl ProjectionConfig {
    pub fn new(years: [u32; PERIOD_COUNT]) -> Self {
        Self {
            years,
            coefficient_policy: CoefficientPolicy::Strict,
        }
    }

    pub fn permissive(mut self) -> Self {
        self.coefficient_policy = CoefficientPolicy::Permissive;
        self
    }
}

/// The three projection periods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Projects the start snapshot with start-year rates
    Start,
    /// Projects the base snapshot with base-year rates
    Base,
    /// Projects the base snapshot with target-year rates
    Target,
}

impl Period {
    pub const ALL: [Period; PERIOD_COUNT] = [Period::Start, Period::Base, Period::Target];

    pub fn index(self) -> usize {
        match self {
            Period::Start => 0,
            Period::Base => 1,
            Period::Target => 2,
        }
    }

    /// Year whose rates and sex ratio drive this period
    pub fn rate_year(self, years: &[u32; PERIOD_COUNT]) -> u32 {
        years[self.index()]
    }

    /// Tag on this period's rows: the next year label, or the last one for the
    /// final period. Base and Target therefore both emit the target year.
    pub fn output_year(self, years: &[u32; PERIOD_COUNT]) -> u32 {
        let next = self.index() + 1;
        if next < PERIOD_COUNT {
            years[next]
        } else {
            years[self.index()]
        }
    }

    /// Start projects from the start snapshot; Base and Target both read the
    /// base snapshot. Target does not chain off Base's projected output.
    pub fn source(self, inputs: &ProjectionInputs) -> &PopulationSnapshot {
        match self {
            Period::Start => &inputs.population.start,
            Period::Base | Period::Target => &inputs.population.base,
        }
    }
}

/// Output of a single period: its rows and totals
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodProjection {
    pub rows: Vec<ResultRow>,
    pub summary: PeriodSummary,
}

/// Main projection engine
pub struct ProjectionEngine {
    inputs: ProjectionInputs,
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine with given tables and config
    pub fn new(inputs: ProjectionInputs, config: ProjectionConfig) -> Self {
        Self { inputs, config }
    }

    pub fn inputs(&self) -> &ProjectionInputs {
        &self.inputs
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Run all three periods. Either every period completes or the call fails.
    pub fn project(&self) -> Result<ProjectionResult> {
        project_with(&self.inputs, &self.config)
    }

    /// Run a single period after the same validation as `project`
    pub fn project_period(&self, period: Period) -> Result<PeriodProjection> {
        check_coefficient(self.inputs.coefficient, self.config.coefficient_policy)?;
        self.inputs.validate(&self.config.years)?;
        run_period(&self.inputs, &self.config.years, period)
    }
}

/// Project with strict coefficient validation
pub fn project(inputs: &ProjectionInputs, years: [u32; PERIOD_COUNT]) -> Result<ProjectionResult> {
    project_with(inputs, &ProjectionConfig::new(years))
}

/// Project with an explicit configuration
pub fn project_with(inputs: &ProjectionInputs, config: &ProjectionConfig) -> Result<ProjectionResult> {
    check_coefficient(inputs.coefficient, config.coefficient_policy)?;
    inputs.validate(&config.years)?;

    let mut result = ProjectionResult::new(config.years, inputs.coefficient);
    for period in Period::ALL {
        let projection = run_period(inputs, &config.years, period)?;
        result.rows.extend(projection.rows);
        result.periods.push(projection.summary);
    }

    info!(
        "projected {} rows for years {:?} (coefficient {})",
        result.rows.len(),
        config.years,
        inputs.coefficient
    );
    Ok(result)
}

fn check_coefficient(coefficient: f64, policy: CoefficientPolicy) -> Result<()> {
    let in_range = (COEFFICIENT_MIN..=COEFFICIENT_MAX).contains(&coefficient);
    if in_range {
        return Ok(());
    }

    match policy {
        CoefficientPolicy::Strict => Err(Error::Configuration {
            parameter: "coefficient",
            value: coefficient,
            reason: format!("outside [{:.1}, {:.1}]", COEFFICIENT_MIN, COEFFICIENT_MAX),
        }),
        CoefficientPolicy::Permissive if coefficient.is_finite() => {
            warn!(
                "coefficient {} outside [{:.1}, {:.1}], computing without clamping",
                coefficient, COEFFICIENT_MIN, COEFFICIENT_MAX
            );
            Ok(())
        }
        CoefficientPolicy::Permissive => Err(Error::Configuration {
            parameter: "coefficient",
            value: coefficient,
            reason: "not a finite number".to_string(),
        }),
    }
}

/// One cohort-component step. Inputs must already be validated for `years`.
fn run_period(
    inputs: &ProjectionInputs,
    years: &[u32; PERIOD_COUNT],
    period: Period,
) -> Result<PeriodProjection> {
    let rate_year = period.rate_year(years);
    let output_year = period.output_year(years);
    let source = period.source(inputs);

    let fertility = inputs.fertility.rates_for(rate_year)?;
    let survival = inputs.survival.rates_for(rate_year)?;
    let ratio = inputs.sex_ratio.ratio_for(rate_year)?;
    let male_share = SexRatioTable::male_share(ratio);
    let female_share = SexRatioTable::female_share(ratio);

    let mut buffers = PeriodBuffers::new();

    for age in 0..AGE_GROUP_COUNT {
        buffers.accumulate_births(source.female[age], fertility[age], male_share, female_share);
        buffers.age_forward(
            age,
            source.male[age],
            source.female[age],
            survival.male[age],
            survival.female[age],
        );
    }

    buffers.place_newborns(survival.male[0], survival.female[0]);

    for age in 0..AGE_GROUP_COUNT {
        buffers.apply_migration(
            age,
            inputs.migration.male[age],
            inputs.migration.female[age],
            source.male[age],
            source.female[age],
            inputs.coefficient,
        );
    }

    debug!(
        "period {} (rates {}, tagged {}): births {}M/{}F, aged out {}M/{}F",
        period.index(),
        rate_year,
        output_year,
        buffers.male_births,
        buffers.female_births,
        buffers.aged_out_male,
        buffers.aged_out_female
    );

    let rows = inputs
        .population
        .age_groups
        .iter()
        .enumerate()
        .map(|(age, group)| ResultRow {
            age_index: age,
            age_group: group.label.clone(),
            year: output_year,
            male: buffers.male[age],
            female: buffers.female[age],
        })
        .collect();

    let summary = PeriodSummary {
        period: period.index(),
        rate_year,
        output_year,
        total_male: buffers.total_male(),
        total_female: buffers.total_female(),
        male_births: buffers.male_births,
        female_births: buffers.female_births,
        aged_out_male: buffers.aged_out_male,
        aged_out_female: buffers.aged_out_female,
    };

    Ok(PeriodProjection { rows, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaKey;
    use crate::tables::fixtures::{sample_inputs, YEARS};
    use crate::tables::{
        AgeGroup, FertilityTable, MigrationTable, PopulationSnapshot, PopulationTable, SexRatioTable,
        SurvivalRates, SurvivalTable,
    };

    /// Tables where only age group 0 carries population and fertility
    fn age_zero_inputs() -> ProjectionInputs {
        let mut start = PopulationSnapshot::new(vec![0; AGE_GROUP_COUNT], vec![0; AGE_GROUP_COUNT]);
        start.female[0] = 100;
        let base = start.clone();

        let mut fertility_rates = vec![0.0; AGE_GROUP_COUNT];
        fertility_rates[0] = 0.5;

        let mut fertility = FertilityTable::new();
        let mut survival = SurvivalTable::new();
        let mut sex_ratio = SexRatioTable::new();
        for year in YEARS {
            fertility.insert_year(year, fertility_rates.clone());
            survival.insert_year(year, SurvivalRates::flat(0.9));
            sex_ratio.insert(year, 105.0);
        }

        ProjectionInputs {
            population: PopulationTable::with_default_labels(start, base),
            fertility,
            survival,
            sex_ratio,
            migration: MigrationTable::zero(),
            coefficient: 0.0,
        }
    }

    #[test]
    fn test_row_count() {
        let result = project(&sample_inputs(), YEARS).unwrap();
        assert_eq!(result.len(), 63);
        assert_eq!(result.periods.len(), 3);
    }

    #[test]
    fn test_rows_period_major_then_age() {
        let result = project(&sample_inputs(), YEARS).unwrap();
        for (i, row) in result.rows.iter().enumerate() {
            assert_eq!(row.age_index, i % AGE_GROUP_COUNT);
            assert_eq!(row.age_group, (i % AGE_GROUP_COUNT).to_string());
        }
    }

    #[test]
    fn test_year_tagging() {
        let result = project(&sample_inputs(), [2000, 2010, 2020]).unwrap();
        assert!(result.period_rows(0).iter().all(|r| r.year == 2010));
        assert!(result.period_rows(1).iter().all(|r| r.year == 2020));
        // The final period reuses the last label rather than inventing a fourth year
        assert!(result.period_rows(2).iter().all(|r| r.year == 2020));
        assert_eq!(result.years(), vec![2010, 2020]);
        assert_eq!(result.rows_for_year(2020).len(), 42);
    }

    #[test]
    fn test_end_to_end_age_zero() {
        let result = project(&age_zero_inputs(), YEARS).unwrap();

        // 50 births -> 24 female, 25 male; newborns survive at 0.9
        let base_row = &result.period_rows(1)[0];
        assert_eq!(base_row.year, 2020);
        assert_eq!(base_row.female, 21);
        assert_eq!(base_row.male, 22);

        // Age 0 females survive into age 1
        assert_eq!(result.period_rows(1)[1].female, 90);
        assert_eq!(result.periods[1].female_births, 24);
        assert_eq!(result.periods[1].male_births, 25);
    }

    #[test]
    fn test_non_negative_counts() {
        let mut inputs = sample_inputs();
        inputs.migration = MigrationTable::new(
            vec![40.0; AGE_GROUP_COUNT],
            vec![25.0; AGE_GROUP_COUNT],
        );
        let result = project(&inputs, YEARS).unwrap();
        assert!(result.rows.iter().all(|r| r.male >= 0 && r.female >= 0));
    }

    #[test]
    fn test_deterministic() {
        let inputs = sample_inputs();
        let first = project(&inputs, YEARS).unwrap();
        let second = project(&inputs, YEARS).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_migration_ignores_coefficient() {
        let mut inputs = sample_inputs();
        inputs.migration = MigrationTable::zero();

        inputs.coefficient = 0.0;
        let baseline = project(&inputs, YEARS).unwrap();
        for coefficient in [0.25, 1.0, 2.0] {
            inputs.coefficient = coefficient;
            assert_eq!(project(&inputs, YEARS).unwrap().rows, baseline.rows);
        }
    }

    #[test]
    fn test_zero_coefficient_ignores_migration() {
        let mut inputs = sample_inputs();
        inputs.coefficient = 0.0;
        let with_migration = project(&inputs, YEARS).unwrap();

        inputs.migration = MigrationTable::zero();
        let without_migration = project(&inputs, YEARS).unwrap();
        assert_eq!(with_migration.rows, without_migration.rows);
    }

    #[test]
    fn test_zero_source_cohort_gets_no_migration() {
        let mut inputs = sample_inputs();
        inputs.population.start.male[6] = 0;
        inputs.population.start.male[5] = 0;
        inputs.migration.male[6] = 500.0;
        inputs.coefficient = 2.0;

        let result = project(&inputs, YEARS).unwrap();
        // Source 5 empty -> slot 6 is 0 before correction, so it stays 0
        assert_eq!(result.period_rows(0)[6].male, 0);
    }

    #[test]
    fn test_empty_source_with_survivors_uses_raw_migration() {
        let mut inputs = sample_inputs();
        // Source 5 is populated, source 6 is empty, so slot 6 holds survivors
        // of age 5 and the rate is the raw migration count over a divisor of 1
        inputs.population.start.male[6] = 0;
        inputs.migration.male[6] = 3.0;
        inputs.coefficient = 0.0;
        let uncorrected = project(&inputs, YEARS).unwrap();

        inputs.coefficient = 0.5;
        let corrected = project(&inputs, YEARS).unwrap();

        let before = uncorrected.period_rows(0)[6].male;
        assert!(before > 0);
        let expected = before + (before as f64 * (3.0 * 0.5)).trunc() as i64;
        assert_eq!(corrected.period_rows(0)[6].male, expected);
    }

    #[test]
    fn test_age_group_index_out_of_range_is_schema_mismatch() {
        let mut inputs = sample_inputs();
        inputs.population.age_groups[20] = AgeGroup::new(21, "20+");

        match project(&inputs, YEARS).unwrap_err() {
            Error::SchemaMismatch { table, key } => {
                assert_eq!(table, "population");
                assert_eq!(key, SchemaKey::AgeGroup(20));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_permissive_huge_coefficient_saturates() {
        let mut inputs = sample_inputs();
        inputs.coefficient = 1e20;
        let config = ProjectionConfig::new(YEARS).permissive();

        let result = project_with(&inputs, &config).unwrap();
        assert_eq!(result.len(), 63);
        // Age 4 in period 0 has positive migration and a populated slot
        assert_eq!(result.period_rows(0)[4].male, i64::MAX);
        let _ = result.summary();
    }

    #[test]
    fn test_migration_rate_relative_to_source() {
        let mut inputs = sample_inputs();
        inputs.coefficient = 0.0;
        let uncorrected = project(&inputs, YEARS).unwrap();

        inputs.coefficient = 1.0;
        let corrected = project(&inputs, YEARS).unwrap();

        // Period 0, age 4: source male 1040, migration +20
        let before = uncorrected.period_rows(0)[4].male;
        let rate = 20.0 / 1040.0;
        let expected = before + (before as f64 * (rate * 1.0)).trunc() as i64;
        assert_eq!(corrected.period_rows(0)[4].male, expected);
    }

    #[test]
    fn test_base_feeds_both_later_periods() {
        let mut inputs = sample_inputs();
        // Make base and target rates identical so periods 1 and 2 must agree
        let base_fertility = inputs.fertility.rates_for(2010).unwrap().to_vec();
        let base_survival = inputs.survival.rates_for(2010).unwrap().clone();
        inputs.fertility.insert_year(2020, base_fertility);
        inputs.survival.insert_year(2020, base_survival);
        inputs.sex_ratio.insert(2020, inputs.sex_ratio.ratio_for(2010).unwrap());

        let result = project(&inputs, YEARS).unwrap();
        assert_eq!(result.period_rows(1), result.period_rows(2));
    }

    #[test]
    fn test_oldest_cohort_dropped() {
        let result = project(&sample_inputs(), YEARS).unwrap();
        // Start male age 20 = 1200, survival 0.97
        assert_eq!(result.periods[0].aged_out_male, 1164);
        assert!(result.periods.iter().all(|p| p.aged_out_female > 0));
    }

    #[test]
    fn test_missing_fertility_year_fails_whole_run() {
        let mut inputs = sample_inputs();
        inputs.fertility.remove_year(2010);

        match project(&inputs, YEARS).unwrap_err() {
            Error::SchemaMismatch { table, key } => {
                assert_eq!(table, "fertility");
                assert_eq!(key, SchemaKey::Year(2010));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_year_fails_each_period_using_it() {
        let mut inputs = sample_inputs();
        inputs.fertility.remove_year(2020);
        let engine = ProjectionEngine::new(inputs, ProjectionConfig::new(YEARS));

        // Validation covers all three years, so even Start fails
        for period in Period::ALL {
            let err = engine.project_period(period).unwrap_err();
            assert!(err.to_string().contains("year 2020"));
        }
    }

    #[test]
    fn test_missing_sex_ratio_year() {
        let mut inputs = sample_inputs();
        inputs.sex_ratio.remove(2000);
        let err = project(&inputs, YEARS).unwrap_err();
        assert_eq!(
            err.to_string(),
            "schema mismatch in sex ratio table: missing year 2000"
        );
    }

    #[test]
    fn test_strict_rejects_out_of_range_coefficient() {
        let mut inputs = sample_inputs();
        inputs.coefficient = 2.5;
        let err = project(&inputs, YEARS).unwrap_err();
        assert!(matches!(err, Error::Configuration { parameter: "coefficient", .. }));
    }

    #[test]
    fn test_permissive_computes_without_clamping() {
        let mut inputs = sample_inputs();
        inputs.coefficient = 2.5;
        let config = ProjectionConfig::new(YEARS).permissive();
        let unclamped = project_with(&inputs, &config).unwrap();

        inputs.coefficient = 2.0;
        let clamped = project_with(&inputs, &config).unwrap();

        assert_eq!(unclamped.coefficient, 2.5);
        assert_ne!(unclamped.rows, clamped.rows);
    }

    #[test]
    fn test_permissive_rejects_nan() {
        let mut inputs = sample_inputs();
        inputs.coefficient = f64::NAN;
        let config = ProjectionConfig::new(YEARS).permissive();
        assert!(project_with(&inputs, &config).is_err());
    }

    #[test]
    fn test_engine_period_matches_full_run() {
        let engine = ProjectionEngine::new(sample_inputs(), ProjectionConfig::new(YEARS));
        let full = engine.project().unwrap();
        let base = engine.project_period(Period::Base).unwrap();
        assert_eq!(base.rows.as_slice(), full.period_rows(1));
        assert_eq!(base.summary, full.periods[1]);
    }

    #[test]
    fn test_period_labels() {
        assert_eq!(Period::Start.output_year(&YEARS), 2010);
        assert_eq!(Period::Base.output_year(&YEARS), 2020);
        assert_eq!(Period::Target.output_year(&YEARS), 2020);
        assert_eq!(Period::Target.rate_year(&YEARS), 2020);
    }
}
