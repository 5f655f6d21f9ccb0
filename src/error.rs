use std::path::PathBuf;
use thiserror::Error;

use crate::types::Party;

/// Fatal errors raised while loading the marker table
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("empty file: no header row")]
    MissingHeader,

    #[error("header has {found} column(s); need at least sample name and marker columns")]
    HeaderTooNarrow { found: usize },
}

/// Errors raised while comparing a duo
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompareError {
    #[error("{party} '{name}' not found")]
    NotFound { party: Party, name: String },
}

/// Errors raised while rendering or finalizing a report
#[derive(Error, Debug)]
pub enum SinkWriteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("report has {rows} rows; limit for this format is {limit}")]
    TooManyRows { rows: usize, limit: usize },

    #[error("report has {cols} columns; limit for this format is {limit}")]
    TooManyColumns { cols: usize, limit: usize },
}

/// Errors raised while reading the TOML configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("delimiter must be a single character, got {0:?}")]
    Delimiter(String),

    #[error("column width must be positive, got {0}")]
    ColumnWidth(f64),

    #[error("end token must not be blank")]
    EndToken,
}
