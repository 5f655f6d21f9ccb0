use crate::analysis::parse_numeric;
use crate::types::*;

/// Fixed leading columns of every duo block
pub const LEADING_COLUMNS: [&str; 4] = ["Duo #", "Father", "Son", "Marker"];

/// Linearizes duo results into header, data and spacer rows
pub struct ReportAssembler;

impl Default for ReportAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Rows for all accepted duos, in the order given. Ordinals start at 1.
    pub fn assemble(&self, results: &[DuoResult]) -> Vec<DisplayRow> {
        let rows_needed: usize = results.iter().map(|r| r.rows.len() + 2).sum();
        let mut rows = Vec::with_capacity(rows_needed);

        for (i, result) in results.iter().enumerate() {
            self.append_duo(i + 1, result, &mut rows);
        }
        rows
    }

    fn append_duo(&self, ordinal: usize, result: &DuoResult, out: &mut Vec<DisplayRow>) {
        out.push(header_row(&result.active_slots));
        for row in &result.rows {
            out.push(data_row(ordinal, result, row));
        }
        out.push(DisplayRow::spacer());
    }
}

/// Header labels for a duo with the given active slots
pub fn header_labels(active_slots: &[usize]) -> Vec<String> {
    let mut labels: Vec<String> = LEADING_COLUMNS.iter().map(|s| s.to_string()).collect();
    for slot in active_slots {
        labels.push(format!("Father Allele {}", slot + 1));
        labels.push(format!("Son Allele {}", slot + 1));
    }
    labels.push("Match".to_string());
    labels
}

fn header_row(active_slots: &[usize]) -> DisplayRow {
    DisplayRow {
        kind: RowKind::Header,
        cells: header_labels(active_slots)
            .into_iter()
            .map(|label| DisplayCell::plain(CellValue::Text(label)))
            .collect(),
    }
}

fn data_row(ordinal: usize, result: &DuoResult, row: &ComparisonRow) -> DisplayRow {
    let mut cells = Vec::with_capacity(LEADING_COLUMNS.len() + row.cells.len() * 2 + 1);
    cells.push(DisplayCell::plain(CellValue::Number(ordinal as f64)));
    cells.push(DisplayCell::plain(CellValue::text(&result.father.entered)));
    cells.push(DisplayCell::plain(CellValue::text(&result.son.entered)));
    cells.push(DisplayCell::plain(CellValue::text(&row.marker)));

    for cell in &row.cells {
        cells.push(allele_cell(&cell.father, cell.diff));
        cells.push(allele_cell(&cell.son, cell.diff));
    }

    cells.push(DisplayCell::plain(CellValue::text(row.verdict.as_str())));
    DisplayRow {
        kind: RowKind::Data,
        cells,
    }
}

/// Numeric alleles become numeric cells; everything else stays text
fn allele_cell(value: &str, highlighted: bool) -> DisplayCell {
    let value = match parse_numeric(value) {
        Some(n) => CellValue::Number(n),
        None => CellValue::text(value),
    };
    DisplayCell { value, highlighted }
}
