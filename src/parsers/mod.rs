use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::LoadError;
pub use crate::types::trim_field;

pub mod tsv_parser;

pub use tsv_parser::TsvParser;

/// Header plus raw rows of a delimited marker table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// One data line split into fields; `line` is 1-based and counts the header
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub line: usize,
    pub fields: Vec<String>,
}

impl RawRow {
    pub fn new(line: usize, fields: Vec<String>) -> Self {
        Self { line, fields }
    }

    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|f| trim_field(f).is_empty())
    }
}

/// Anything that can produce a raw marker table from a path
pub trait TableParser {
    fn parse(&self, path: &Path) -> Result<RawTable, LoadError>;
}

/// Open a file for buffered reading, transparently decompressing `.gz`
pub fn open_file(path: &Path) -> Result<Box<dyn BufRead>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let is_gzip = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);

    if is_gzip {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Split a line on `delimiter`. An empty line yields no fields and a
/// trailing delimiter does not open an extra empty field.
pub fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    if line.is_empty() {
        return Vec::new();
    }

    let mut fields: Vec<String> = line.split(delimiter).map(str::to_string).collect();
    if line.ends_with(delimiter) {
        fields.pop();
    }
    fields
}
