//! Error types shared by the table loaders and the projection engine

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Key that a table was expected to supply but did not
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKey {
    /// A requested year label has no entry (column or row)
    Year(u32),
    /// A per-age sequence stops before this age group index
    AgeGroup(usize),
    /// A per-age sequence holds more entries than there are age groups
    SurplusAgeGroups { actual: usize, expected: usize },
    /// A named column is absent from a CSV header
    Column(String),
}

impl fmt::Display for SchemaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaKey::Year(year) => write!(f, "year {}", year),
            SchemaKey::AgeGroup(index) => write!(f, "age group {}", index),
            SchemaKey::SurplusAgeGroups { actual, expected } => {
                write!(f, "{} age groups (expected {})", actual, expected)
            }
            SchemaKey::Column(name) => write!(f, "column '{}'", name),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// A required year/age key is absent from an input table.
    /// Aborts the whole projection; no partial result is produced.
    #[error("schema mismatch in {table} table: missing {key}")]
    SchemaMismatch { table: &'static str, key: SchemaKey },

    /// A scalar parameter was rejected before any period ran
    #[error("invalid {parameter} = {value}: {reason}")]
    Configuration {
        parameter: &'static str,
        value: f64,
        reason: String,
    },

    #[error("{file} row {row}, column '{column}': cannot parse '{value}'")]
    InvalidValue {
        file: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub(crate) fn missing_year(table: &'static str, year: u32) -> Self {
        Error::SchemaMismatch {
            table,
            key: SchemaKey::Year(year),
        }
    }

    pub(crate) fn missing_column(table: &'static str, column: impl Into<String>) -> Self {
        Error::SchemaMismatch {
            table,
            key: SchemaKey::Column(column.into()),
        }
    }

    /// True for the SchemaMismatch kind, regardless of key
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, Error::SchemaMismatch { .. })
    }
}
