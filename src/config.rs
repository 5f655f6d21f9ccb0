use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::ConfigError;

/// Tunable settings, optionally read from a TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Field separator of the input table
    pub delimiter: String,
    /// Worksheet name for spreadsheet output
    pub sheet_name: String,
    pub column_width: f64,
    /// RGB fill used for mismatched allele cells
    pub highlight_color: u32,
    /// Token that ends the interactive duo loop (case-insensitive)
    pub end_token: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            delimiter: "\t".to_string(),
            sheet_name: "Comparisons".to_string(),
            column_width: 16.0,
            highlight_color: 0xFF0000,
            end_token: "end".to_string(),
        }
    }
}

impl ReportConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&contents)?;
        debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.delimiter_char()?;
        if self.column_width.is_nan() || self.column_width <= 0.0 {
            return Err(ConfigError::ColumnWidth(self.column_width));
        }
        if self.end_token.trim().is_empty() {
            return Err(ConfigError::EndToken);
        }
        Ok(())
    }

    pub fn delimiter_char(&self) -> Result<char, ConfigError> {
        let mut chars = self.delimiter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ConfigError::Delimiter(self.delimiter.clone())),
        }
    }

    /// True when `input` is the loop terminator
    pub fn is_end_token(&self, input: &str) -> bool {
        input.trim().eq_ignore_ascii_case(self.end_token.trim())
    }
}
