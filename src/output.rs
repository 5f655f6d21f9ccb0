use chrono::Local;
use rust_xlsxwriter::{Color, Format, FormatPattern, Workbook, Worksheet};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::ReportConfig;
use crate::error::SinkWriteError;
use crate::types::*;

const XLSX_MAX_ROWS: usize = 1_048_576;
const XLSX_MAX_COLS: usize = 16_384;

/// Supported report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Xlsx,
    Csv,
    Tsv,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Csv => "csv",
            ReportFormat::Tsv => "tsv",
            ReportFormat::Json => "json",
        }
    }
}

/// Destination for display rows addressed by 0-based (row, column)
pub trait ReportSink {
    /// Called once per row before any of its cells, spacers included
    fn begin_row(&mut self, _row: u32, _kind: RowKind) -> Result<(), SinkWriteError> {
        Ok(())
    }

    fn set_column_width(&mut self, col: u16, width: f64) -> Result<(), SinkWriteError>;

    fn write_cell(&mut self, row: u32, col: u16, cell: &DisplayCell) -> Result<(), SinkWriteError>;

    /// Persist everything written so far
    fn finish(self) -> Result<(), SinkWriteError>;
}

/// Write `rows` top to bottom into `sink`, applying `column_width` to every
/// column a header spans. Spacer rows are announced but carry no cells.
pub fn render<S: ReportSink>(
    rows: &[DisplayRow],
    sink: &mut S,
    column_width: f64,
) -> Result<(), SinkWriteError> {
    for (row_idx, row) in rows.iter().enumerate() {
        let r = u32::try_from(row_idx).map_err(|_| SinkWriteError::TooManyRows {
            rows: rows.len(),
            limit: u32::MAX as usize,
        })?;
        sink.begin_row(r, row.kind)?;

        if row.kind == RowKind::Header {
            for col in 0..row.cells.len() {
                sink.set_column_width(column_index(col, row.cells.len())?, column_width)?;
            }
        }

        for (col, cell) in row.cells.iter().enumerate() {
            sink.write_cell(r, column_index(col, row.cells.len())?, cell)?;
        }
    }
    Ok(())
}

fn column_index(col: usize, cols: usize) -> Result<u16, SinkWriteError> {
    u16::try_from(col).map_err(|_| SinkWriteError::TooManyColumns {
        cols,
        limit: u16::MAX as usize,
    })
}

/// Single-worksheet XLSX workbook with a solid fill for highlighted cells
pub struct XlsxSink {
    path: PathBuf,
    worksheet: Worksheet,
    highlight: Format,
}

impl XlsxSink {
    pub fn new(path: &Path, config: &ReportConfig) -> Result<Self, SinkWriteError> {
        let mut worksheet = Worksheet::new();
        worksheet.set_name(&config.sheet_name)?;

        let highlight = Format::new()
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(config.highlight_color));

        Ok(Self {
            path: path.to_path_buf(),
            worksheet,
            highlight,
        })
    }
}

impl ReportSink for XlsxSink {
    fn set_column_width(&mut self, col: u16, width: f64) -> Result<(), SinkWriteError> {
        self.worksheet.set_column_width(col, width)?;
        Ok(())
    }

    fn write_cell(&mut self, row: u32, col: u16, cell: &DisplayCell) -> Result<(), SinkWriteError> {
        let ws = &mut self.worksheet;
        match (&cell.value, cell.highlighted) {
            (CellValue::Number(n), false) => {
                ws.write_number(row, col, *n)?;
            }
            (CellValue::Number(n), true) => {
                ws.write_number_with_format(row, col, *n, &self.highlight)?;
            }
            (CellValue::Text(s), false) if s.is_empty() => {}
            (CellValue::Text(s), true) if s.is_empty() => {
                ws.write_blank(row, col, &self.highlight)?;
            }
            (CellValue::Text(s), false) => {
                ws.write_string(row, col, s)?;
            }
            (CellValue::Text(s), true) => {
                ws.write_string_with_format(row, col, s, &self.highlight)?;
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<(), SinkWriteError> {
        let mut workbook = Workbook::new();
        workbook.push_worksheet(self.worksheet);
        workbook.save(&self.path)?;
        Ok(())
    }
}

/// CSV/TSV rendition. Highlighting has no textual equivalent and is dropped.
pub struct DelimitedSink {
    path: PathBuf,
    delimiter: u8,
    grid: Vec<Vec<String>>,
}

impl DelimitedSink {
    pub fn new(path: &Path, delimiter: u8) -> Self {
        Self {
            path: path.to_path_buf(),
            delimiter,
            grid: Vec::new(),
        }
    }
}

impl ReportSink for DelimitedSink {
    fn begin_row(&mut self, row: u32, _kind: RowKind) -> Result<(), SinkWriteError> {
        let row = row as usize;
        if self.grid.len() <= row {
            self.grid.resize_with(row + 1, Vec::new);
        }
        Ok(())
    }

    fn set_column_width(&mut self, _col: u16, _width: f64) -> Result<(), SinkWriteError> {
        Ok(())
    }

    fn write_cell(&mut self, row: u32, col: u16, cell: &DisplayCell) -> Result<(), SinkWriteError> {
        let (row, col) = (row as usize, col as usize);
        if self.grid.len() <= row {
            self.grid.resize_with(row + 1, Vec::new);
        }
        let line = &mut self.grid[row];
        if line.len() <= col {
            line.resize(col + 1, String::new());
        }
        line[col] = cell.value.to_string();
        Ok(())
    }

    fn finish(self) -> Result<(), SinkWriteError> {
        let mut bytes = Vec::new();
        for line in &self.grid {
            // csv writes `""` for an empty record
            if line.is_empty() {
                bytes.push(b'\n');
                continue;
            }
            let mut wtr = csv::WriterBuilder::new()
                .delimiter(self.delimiter)
                .from_writer(Vec::new());
            wtr.write_record(line)?;
            let record = wtr
                .into_inner()
                .map_err(|e| SinkWriteError::Io(e.into_error()))?;
            bytes.extend_from_slice(&record);
        }

        fs::write(&self.path, bytes)?;
        Ok(())
    }
}

/// Place `output_name` in the directory of `input`; absolute names are kept
pub fn resolve_output_path(input: &Path, output_name: &Path) -> PathBuf {
    match input.parent() {
        Some(dir) => dir.join(output_name),
        None => output_name.to_path_buf(),
    }
}

/// `<input stem>_duos.<ext>`
pub fn default_output_name(input: &Path, format: ReportFormat) -> String {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.trim_end_matches(".tsv").trim_end_matches(".txt"))
        .filter(|s| !s.is_empty())
        .unwrap_or("comparison");
    format!("{}_duos.{}", stem, format.extension())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    rows: &'a [DisplayRow],
}

/// Report generator for assembled duo rows
pub struct ReportGenerator {
    output_path: PathBuf,
    config: ReportConfig,
}

impl ReportGenerator {
    pub fn new(output_path: &Path, config: ReportConfig) -> Self {
        Self {
            output_path: output_path.to_path_buf(),
            config,
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Render `rows` in `format` and finalize the output file
    pub fn generate(&self, rows: &[DisplayRow], format: ReportFormat) -> Result<(), SinkWriteError> {
        debug!(
            "Writing {} row(s) as {:?} to {}",
            rows.len(),
            format,
            self.output_path.display()
        );

        match format {
            ReportFormat::Xlsx => self.generate_xlsx_report(rows)?,
            ReportFormat::Csv => self.generate_delimited_report(rows, b',')?,
            ReportFormat::Tsv => self.generate_delimited_report(rows, b'\t')?,
            ReportFormat::Json => self.generate_json_report(rows)?,
        }

        info!("Report saved to {}", self.output_path.display());
        Ok(())
    }

    fn generate_xlsx_report(&self, rows: &[DisplayRow]) -> Result<(), SinkWriteError> {
        if rows.len() > XLSX_MAX_ROWS {
            return Err(SinkWriteError::TooManyRows {
                rows: rows.len(),
                limit: XLSX_MAX_ROWS,
            });
        }
        let widest = rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
        if widest > XLSX_MAX_COLS {
            return Err(SinkWriteError::TooManyColumns {
                cols: widest,
                limit: XLSX_MAX_COLS,
            });
        }

        let mut sink = XlsxSink::new(&self.output_path, &self.config)?;
        render(rows, &mut sink, self.config.column_width)?;
        sink.finish()
    }

    fn generate_delimited_report(&self, rows: &[DisplayRow], delimiter: u8) -> Result<(), SinkWriteError> {
        let mut sink = DelimitedSink::new(&self.output_path, delimiter);
        render(rows, &mut sink, self.config.column_width)?;
        sink.finish()
    }

    fn generate_json_report(&self, rows: &[DisplayRow]) -> Result<(), SinkWriteError> {
        let report = JsonReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            rows,
        };
        let json_content = serde_json::to_string_pretty(&report)?;
        fs::write(&self.output_path, json_content)?;
        Ok(())
    }
}
