//! CSV-based table loader
//!
//! Each sheet of the input workbook is one CSV file in a directory
//! (default data/inputs/). Every age-keyed file starts with an "Age Group" column.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{Reader, StringRecord};
use log::info;
use serde::Deserialize;

use super::{
    AgeGroup, FertilityTable, MigrationTable, PopulationSnapshot, PopulationTable, SexRatioTable,
    SurvivalRates, SurvivalTable,
};
use crate::error::{Error, Result, SchemaKey};

/// Default path to the input directory
pub const DEFAULT_INPUT_PATH: &str = "data/inputs";

pub const POPULATION_FILE: &str = "population.csv";
pub const FERTILITY_FILE: &str = "fertility.csv";
pub const SURVIVAL_FILE: &str = "survival.csv";
pub const SEX_RATIO_FILE: &str = "sex_ratio.csv";
pub const MIGRATION_FILE: &str = "migration.csv";
pub const COEFFICIENT_FILE: &str = "coefficient.csv";

pub const AGE_GROUP_COLUMN: &str = "Age Group";

/// Raw population row
#[derive(Debug, Deserialize)]
struct PopulationRow {
    #[serde(rename = "Age Group")]
    age_group: String,
    male_start: f64,
    female_start: f64,
    male_base: f64,
    female_base: f64,
}

/// Raw sex ratio row
#[derive(Debug, Deserialize)]
struct SexRatioRow {
    year: u32,
    males_per_100_females: f64,
}

/// Raw migration row
#[derive(Debug, Deserialize)]
struct MigrationRow {
    #[serde(rename = "Age Group")]
    age_group: String,
    male_net_migration: f64,
    female_net_migration: f64,
}

#[derive(Debug, Deserialize)]
struct CoefficientRow {
    coefficient: f64,
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn require_columns(table: &'static str, headers: &StringRecord, columns: &[&str]) -> Result<()> {
    for column in columns {
        if !headers.iter().any(|h| h.trim() == *column) {
            return Err(Error::missing_column(table, *column));
        }
    }
    Ok(())
}

fn parse_cell(file: &str, row: usize, column: &str, value: &str) -> Result<f64> {
    value.trim().parse().map_err(|_| Error::InvalidValue {
        file: file.to_string(),
        row,
        column: column.to_string(),
        value: value.to_string(),
    })
}

/// Counts may be written as floats ("1000.0") but must be whole and finite
fn whole_count(row: usize, column: &str, value: f64) -> Result<i64> {
    if value.is_finite() && value.fract() == 0.0 {
        Ok(value as i64)
    } else {
        Err(Error::InvalidValue {
            file: POPULATION_FILE.to_string(),
            row,
            column: column.to_string(),
            value: value.to_string(),
        })
    }
}

/// Line number of a record for error messages (header is line 1)
fn line_of(record: &StringRecord, index: usize) -> usize {
    record
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or(index + 2)
}

/// Ages must appear in the same order as in the population table
fn check_age_labels(table: &'static str, expected: &[AgeGroup], found: &[String]) -> Result<()> {
    for (index, group) in expected.iter().enumerate() {
        match found.get(index) {
            Some(label) if label.trim() == group.label.trim() => {}
            _ => {
                return Err(Error::SchemaMismatch {
                    table,
                    key: SchemaKey::AgeGroup(index),
                })
            }
        }
    }
    Ok(())
}

fn parse_population<R: Read>(reader: R) -> Result<PopulationTable> {
    let mut csv_reader = Reader::from_reader(reader);
    require_columns(
        PopulationTable::NAME,
        csv_reader.headers()?,
        &[AGE_GROUP_COLUMN, "male_start", "female_start", "male_base", "female_base"],
    )?;

    let mut age_groups = Vec::new();
    let mut start = PopulationSnapshot::default();
    let mut base = PopulationSnapshot::default();

    for (index, result) in csv_reader.deserialize().enumerate() {
        let row: PopulationRow = result?;
        let line = index + 2;
        age_groups.push(AgeGroup::new(index, row.age_group.trim()));
        start.male.push(whole_count(line, "male_start", row.male_start)?);
        start.female.push(whole_count(line, "female_start", row.female_start)?);
        base.male.push(whole_count(line, "male_base", row.male_base)?);
        base.female.push(whole_count(line, "female_base", row.female_base)?);
    }

    Ok(PopulationTable::new(age_groups, start, base))
}

fn parse_fertility<R: Read>(reader: R) -> Result<(Vec<String>, FertilityTable)> {
    let mut csv_reader = Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    require_columns(FertilityTable::NAME, &headers, &[AGE_GROUP_COLUMN])?;

    // Year columns are the headers that parse as a year; anything else is ignored
    let year_columns: Vec<(usize, u32)> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| h.trim().parse::<u32>().ok().map(|year| (i, year)))
        .collect();
    let age_index = column_index(&headers, AGE_GROUP_COLUMN);

    let mut labels = Vec::new();
    let mut columns: BTreeMap<u32, Vec<f64>> = BTreeMap::new();

    for (index, result) in csv_reader.records().enumerate() {
        let record = result?;
        let line = line_of(&record, index);
        labels.push(age_index.and_then(|i| record.get(i)).unwrap_or_default().to_string());
        for &(col, year) in &year_columns {
            let value = parse_cell(FERTILITY_FILE, line, &headers[col], &record[col])?;
            columns.entry(year).or_default().push(value);
        }
    }

    let mut table = FertilityTable::new();
    for (year, rates) in columns {
        table.insert_year(year, rates);
    }
    Ok((labels, table))
}

fn parse_survival<R: Read>(reader: R) -> Result<(Vec<String>, SurvivalTable)> {
    let mut csv_reader = Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    require_columns(SurvivalTable::NAME, &headers, &[AGE_GROUP_COLUMN])?;

    let mut male_columns: BTreeMap<u32, usize> = BTreeMap::new();
    let mut female_columns: BTreeMap<u32, usize> = BTreeMap::new();
    for (i, header) in headers.iter().enumerate() {
        let header = header.trim();
        if let Some(year) = header.strip_prefix("male_").and_then(|y| y.parse().ok()) {
            male_columns.insert(year, i);
        } else if let Some(year) = header.strip_prefix("female_").and_then(|y| y.parse().ok()) {
            female_columns.insert(year, i);
        }
    }

    // A year must carry both sexes
    for year in male_columns.keys() {
        if !female_columns.contains_key(year) {
            return Err(Error::missing_column(SurvivalTable::NAME, format!("female_{}", year)));
        }
    }
    for year in female_columns.keys() {
        if !male_columns.contains_key(year) {
            return Err(Error::missing_column(SurvivalTable::NAME, format!("male_{}", year)));
        }
    }

    let age_index = column_index(&headers, AGE_GROUP_COLUMN);
    let mut labels = Vec::new();
    let mut rates: BTreeMap<u32, SurvivalRates> = BTreeMap::new();

    for (index, result) in csv_reader.records().enumerate() {
        let record = result?;
        let line = line_of(&record, index);
        labels.push(age_index.and_then(|i| record.get(i)).unwrap_or_default().to_string());
        for (&year, &male_col) in &male_columns {
            let female_col = female_columns[&year];
            let male = parse_cell(SURVIVAL_FILE, line, &headers[male_col], &record[male_col])?;
            let female = parse_cell(SURVIVAL_FILE, line, &headers[female_col], &record[female_col])?;
            let entry = rates.entry(year).or_default();
            entry.male.push(male);
            entry.female.push(female);
        }
    }

    let mut table = SurvivalTable::new();
    for (year, year_rates) in rates {
        table.insert_year(year, year_rates);
    }
    Ok((labels, table))
}

fn parse_migration<R: Read>(reader: R) -> Result<(Vec<String>, MigrationTable)> {
    let mut csv_reader = Reader::from_reader(reader);
    require_columns(
        MigrationTable::NAME,
        csv_reader.headers()?,
        &[AGE_GROUP_COLUMN, "male_net_migration", "female_net_migration"],
    )?;

    let mut labels = Vec::new();
    let mut table = MigrationTable::default();
    for result in csv_reader.deserialize() {
        let row: MigrationRow = result?;
        labels.push(row.age_group);
        table.male.push(row.male_net_migration);
        table.female.push(row.female_net_migration);
    }
    Ok((labels, table))
}

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

/// Load population counts from any reader
pub fn read_population<R: Read>(reader: R) -> Result<PopulationTable> {
    parse_population(reader)
}

/// Load fertility rates from any reader
pub fn read_fertility<R: Read>(reader: R) -> Result<FertilityTable> {
    parse_fertility(reader).map(|(_, table)| table)
}

/// Load survival rates from any reader
pub fn read_survival<R: Read>(reader: R) -> Result<SurvivalTable> {
    parse_survival(reader).map(|(_, table)| table)
}

/// Load sex ratios at birth from any reader
pub fn read_sex_ratio<R: Read>(reader: R) -> Result<SexRatioTable> {
    let mut csv_reader = Reader::from_reader(reader);
    require_columns(
        SexRatioTable::NAME,
        csv_reader.headers()?,
        &["year", "males_per_100_females"],
    )?;

    let mut table = SexRatioTable::new();
    for result in csv_reader.deserialize() {
        let row: SexRatioRow = result?;
        table.insert(row.year, row.males_per_100_females);
    }
    Ok(table)
}

/// Load net migration counts from any reader
pub fn read_migration<R: Read>(reader: R) -> Result<MigrationTable> {
    parse_migration(reader).map(|(_, table)| table)
}

/// Load the migration adjustment coefficient (first row) from any reader
pub fn read_coefficient<R: Read>(reader: R) -> Result<f64> {
    let mut csv_reader = Reader::from_reader(reader);
    require_columns("coefficient", csv_reader.headers()?, &["coefficient"])?;

    match csv_reader.deserialize::<CoefficientRow>().next() {
        Some(row) => Ok(row?.coefficient),
        None => Err(Error::missing_column("coefficient", "coefficient")),
    }
}

/// All tables loaded from one input directory
#[derive(Debug, Clone)]
pub struct LoadedTables {
    pub population: PopulationTable,
    pub fertility: FertilityTable,
    pub survival: SurvivalTable,
    pub sex_ratio: SexRatioTable,
    pub migration: MigrationTable,
    pub coefficient: f64,
}

impl LoadedTables {
    /// Load all tables from the default path
    pub fn load_default() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_INPUT_PATH))
    }

    /// Load all tables from a specific directory
    pub fn load_from(path: &Path) -> Result<Self> {
        let population = parse_population(open(&path.join(POPULATION_FILE))?)?;
        let (fertility_labels, fertility) = parse_fertility(open(&path.join(FERTILITY_FILE))?)?;
        let (survival_labels, survival) = parse_survival(open(&path.join(SURVIVAL_FILE))?)?;
        let sex_ratio = read_sex_ratio(open(&path.join(SEX_RATIO_FILE))?)?;
        let (migration_labels, migration) = parse_migration(open(&path.join(MIGRATION_FILE))?)?;
        let coefficient = read_coefficient(open(&path.join(COEFFICIENT_FILE))?)?;

        check_age_labels(FertilityTable::NAME, &population.age_groups, &fertility_labels)?;
        check_age_labels(SurvivalTable::NAME, &population.age_groups, &survival_labels)?;
        check_age_labels(MigrationTable::NAME, &population.age_groups, &migration_labels)?;

        info!(
            "loaded {} age groups and {} years from {}",
            population.age_groups.len(),
            sex_ratio.years().len(),
            path.display()
        );

        Ok(Self {
            population,
            fertility,
            survival,
            sex_ratio,
            migration,
            coefficient,
        })
    }
}
