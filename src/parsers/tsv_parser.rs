use std::path::Path;
use tracing::debug;

use crate::error::LoadError;
use crate::parsers::{open_file, split_fields, RawRow, RawTable, TableParser};

/// Delimited-text parser for marker tables (tab-separated by default)
pub struct TsvParser {
    delimiter: char,
}

impl Default for TsvParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TsvParser {
    pub fn new() -> Self {
        Self { delimiter: '\t' }
    }

    pub fn with_delimiter(delimiter: char) -> Self {
        Self { delimiter }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn parse(&self, path: &Path) -> Result<RawTable, LoadError> {
        let mut reader = open_file(path)?;

        let mut line = String::new();
        let read = reader
            .read_line(&mut line)
            .map_err(|source| LoadError::Read { line: 1, source })?;
        if read == 0 {
            return Err(LoadError::MissingHeader);
        }
        let header = split_fields(strip_line_ending(&line), self.delimiter);

        let mut rows = Vec::new();
        let mut line_number = 1;
        loop {
            line.clear();
            line_number += 1;
            let read = reader.read_line(&mut line).map_err(|source| LoadError::Read {
                line: line_number,
                source,
            })?;
            if read == 0 {
                break;
            }
            rows.push(RawRow::new(
                line_number,
                split_fields(strip_line_ending(&line), self.delimiter),
            ));
        }

        debug!(
            "Read {} data line(s) from {}",
            rows.len(),
            path.display()
        );
        Ok(RawTable { header, rows })
    }
}

impl TableParser for TsvParser {
    fn parse(&self, path: &Path) -> Result<RawTable, LoadError> {
        self.parse(path)
    }
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
