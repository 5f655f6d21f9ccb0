use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of allele slots per marker
pub const MAX_SLOTS: usize = 8;

/// Which side of a duo a sample plays
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Party {
    Father,
    Son,
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Father => write!(f, "Father"),
            Party::Son => write!(f, "Son"),
        }
    }
}

/// Sample name as entered plus its case-insensitive lookup key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SampleKey {
    pub entered: String,
    pub lookup: String,
}

impl SampleKey {
    pub fn new(entered: impl Into<String>) -> Self {
        let entered = entered.into();
        let lookup = lookup_key(&entered);
        Self { entered, lookup }
    }
}

/// Strip spaces, tabs and line breaks from both ends of a field
pub fn trim_field(s: &str) -> &str {
    s.trim_matches(|c| matches!(c, ' ' | '\t' | '\r' | '\n'))
}

/// Trimmed, ASCII-lowercased form used to index samples
pub fn lookup_key(name: &str) -> String {
    trim_field(name).to_ascii_lowercase()
}

/// One (sample, marker) observation with a fixed number of allele slots
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlleleRecord {
    pub sample: String,
    pub marker: String,
    pub slots: [String; MAX_SLOTS],
}

impl AlleleRecord {
    pub fn slot(&self, index: usize) -> &str {
        self.slots.get(index).map(String::as_str).unwrap_or("")
    }
}

/// Father/son values for one active slot on one marker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonCell {
    pub father: String,
    pub son: String,
    pub diff: bool,
}

impl ComparisonCell {
    pub fn padding() -> Self {
        Self {
            father: String::new(),
            son: String::new(),
            diff: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Verdict {
    Match,
    Mismatch,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Match => "Match",
            Verdict::Mismatch => "Mismatch",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One marker's worth of cells for a duo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonRow {
    pub marker: String,
    /// One cell per active slot, padding included
    pub cells: Vec<ComparisonCell>,
    pub verdict: Verdict,
    /// Position in the active slot set where blank-padding began
    pub stopped_at: Option<usize>,
}

impl ComparisonRow {
    /// Cells that were actually compared
    pub fn compared(&self) -> &[ComparisonCell] {
        let end = self.stopped_at.unwrap_or(self.cells.len()).min(self.cells.len());
        &self.cells[..end]
    }

    pub fn padding(&self) -> &[ComparisonCell] {
        let start = self.stopped_at.unwrap_or(self.cells.len()).min(self.cells.len());
        &self.cells[start..]
    }
}

/// Full comparison of one accepted duo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DuoResult {
    pub father: SampleKey,
    pub son: SampleKey,
    pub active_slots: Vec<usize>,
    pub rows: Vec<ComparisonRow>,
}

impl DuoResult {
    pub fn mismatch_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.verdict == Verdict::Mismatch)
            .count()
    }
}

/// Display row kinds emitted by the report assembler
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RowKind {
    Header,
    Data,
    Spacer,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayCell {
    pub value: CellValue,
    pub highlighted: bool,
}

impl DisplayCell {
    pub fn plain(value: CellValue) -> Self {
        Self {
            value,
            highlighted: false,
        }
    }
}

/// One output row, independent of any file format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayRow {
    pub kind: RowKind,
    pub cells: Vec<DisplayCell>,
}

impl DisplayRow {
    pub fn spacer() -> Self {
        Self {
            kind: RowKind::Spacer,
            cells: Vec::new(),
        }
    }
}
