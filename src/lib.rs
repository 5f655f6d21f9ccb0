//! # Allele Duo Report
//!
//! Compares father/son duos marker by marker from a tab-separated allele table
//! and produces a spreadsheet report that highlights mismatching alleles.
//!
//! ## Features
//!
//! - Case-insensitive sample lookup, last-write-wins on duplicate rows
//! - Numeric-aware allele equivalence (`7` equals `7.0`)
//! - Per-duo allele columns: slots empty for both parties are dropped
//! - Per-marker stop at the first blank allele, with aligned padding
//! - XLSX, CSV, TSV and JSON output

pub mod analysis;
pub mod config;
pub mod error;
pub mod output;
pub mod parsers;
pub mod report;
pub mod store;
pub mod types;

// Re-export key types
pub use analysis::{DuoComparator, DuoSession};
pub use config::ReportConfig;
pub use error::{CompareError, ConfigError, LoadError, SinkWriteError};
pub use output::{ReportFormat, ReportGenerator};
pub use parsers::{TableParser, TsvParser};
pub use report::ReportAssembler;
pub use store::{Dataset, MarkerCatalog, RecordStore};
pub use types::*;
