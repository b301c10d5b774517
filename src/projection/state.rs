//! Working state for a single projection period

use crate::tables::AGE_GROUP_COUNT;

/// Truncate toward zero. Every count-producing product goes through here
/// before it is stored or accumulated.
#[inline]
pub fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}

/// Buffers and accumulators for one period's cohort-component step
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodBuffers {
    /// Projected male counts by output age group
    pub male: Vec<i64>,

    /// Projected female counts by output age group
    pub female: Vec<i64>,

    /// Running male newborn count across all fertile source ages
    pub male_births: i64,

    /// Running female newborn count across all fertile source ages
    pub female_births: i64,

    /// Survivors of the oldest cohort, which leave the tracked range
    pub aged_out_male: i64,
    pub aged_out_female: i64,
}

impl Default for PeriodBuffers {
    fn default() -> Self {
        Self::new()
    }
}

impl PeriodBuffers {
    pub fn new() -> Self {
        Self {
            male: vec![0; AGE_GROUP_COUNT],
            female: vec![0; AGE_GROUP_COUNT],
            male_births: 0,
            female_births: 0,
            aged_out_male: 0,
            aged_out_female: 0,
        }
    }

    /// Add the births from one source cohort, split by sex with separate truncation.
    /// `male_share` and `female_share` are R/(100+R) and 100/(100+R).
    pub fn accumulate_births(
        &mut self,
        female_source: i64,
        fertility_rate: f64,
        male_share: f64,
        female_share: f64,
    ) {
        let total_births = female_source as f64 * fertility_rate;
        self.male_births = self.male_births.saturating_add(truncate(total_births * male_share));
        self.female_births = self.female_births.saturating_add(truncate(total_births * female_share));
    }

    /// Move the survivors of source cohort `age` up one slot.
    /// Survivors of the oldest cohort are recorded as aged out, not emitted.
    pub fn age_forward(
        &mut self,
        age: usize,
        male_source: i64,
        female_source: i64,
        male_survival: f64,
        female_survival: f64,
    ) {
        let male = truncate(male_source as f64 * male_survival);
        let female = truncate(female_source as f64 * female_survival);

        let target = age + 1;
        if target < AGE_GROUP_COUNT {
            self.male[target] = male;
            self.female[target] = female;
        } else {
            self.aged_out_male = male;
            self.aged_out_female = female;
        }
    }

    /// Newborns survive one step at the youngest age group's rate
    pub fn place_newborns(&mut self, male_survival: f64, female_survival: f64) {
        self.male[0] = truncate(self.male_births as f64 * male_survival);
        self.female[0] = truncate(self.female_births as f64 * female_survival);
    }

    /// Apply the relative migration correction to output age `age`.
    ///
    /// The rate is migration over the *source* cohort size, with a zero source
    /// replaced by 1. A cohort with no originating population therefore gets no
    /// correction: either the projected count is 0 as well, or the rate is the
    /// raw migration count applied to whatever survived into the slot.
    pub fn apply_migration(
        &mut self,
        age: usize,
        male_migration: f64,
        female_migration: f64,
        male_source: i64,
        female_source: i64,
        coefficient: f64,
    ) {
        let male_rate = male_migration / divisor(male_source);
        let female_rate = female_migration / divisor(female_source);

        let male_correction = truncate(self.male[age] as f64 * (male_rate * coefficient));
        let female_correction = truncate(self.female[age] as f64 * (female_rate * coefficient));
        self.male[age] = self.male[age].saturating_add(male_correction);
        self.female[age] = self.female[age].saturating_add(female_correction);
    }

    pub fn total_male(&self) -> i64 {
        saturating_sum(&self.male)
    }

    pub fn total_female(&self) -> i64 {
        saturating_sum(&self.female)
    }
}

/// Counts saturate at the i64 bounds instead of overflowing
pub fn saturating_sum(counts: &[i64]) -> i64 {
    counts.iter().fold(0i64, |acc, &c| acc.saturating_add(c))
}

fn divisor(source: i64) -> f64 {
    if source != 0 {
        source as f64
    } else {
        1.0
    }
}
