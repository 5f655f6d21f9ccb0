use tracing::{debug, info};

use crate::error::CompareError;
use crate::store::{MarkerCatalog, RecordStore, SampleRecords};
use crate::types::*;

/// Parse a value as a plain decimal floating-point literal.
///
/// The whole trimmed string must match `[+-]? digits [. digits] [e [+-] digits]`
/// (either side of the decimal point may be empty, not both). Anything else,
/// including an empty string, `inf` or `nan`, is not numeric.
pub fn parse_numeric(value: &str) -> Option<f64> {
    let t = trim_field(value);
    let bytes = t.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }

    if digits == 0 {
        return None;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return None;
        }
    }

    if i != bytes.len() {
        return None;
    }

    t.parse::<f64>().ok()
}

/// Numeric-aware equality: numbers when both sides parse, exact text otherwise
pub fn values_equivalent(father: &str, son: &str) -> bool {
    match (parse_numeric(father), parse_numeric(son)) {
        (Some(f), Some(s)) => f == s,
        _ => trim_field(father) == trim_field(son),
    }
}

fn is_blank(value: &str) -> bool {
    trim_field(value).is_empty()
}

/// Slots that carry a value for either party on at least one marker.
/// Never empty: falls back to slot 0.
pub fn active_slots(
    father: &SampleRecords,
    son: &SampleRecords,
    catalog: &MarkerCatalog,
) -> Vec<usize> {
    let mut slots: Vec<usize> = (0..MAX_SLOTS)
        .filter(|&slot| {
            catalog.iter().any(|marker| {
                !is_blank(father.value(marker, slot)) || !is_blank(son.value(marker, slot))
            })
        })
        .collect();

    if slots.is_empty() {
        slots.push(0);
    }
    slots
}

/// First phase of a row: compare slots in order until one side is blank.
///
/// Returns the compared cells and, if a blank was hit, the position in
/// `slots` right after the stopping slot.
pub fn compare_until_stop(
    father: &SampleRecords,
    son: &SampleRecords,
    marker: &str,
    slots: &[usize],
) -> (Vec<ComparisonCell>, Option<usize>) {
    let mut cells = Vec::with_capacity(slots.len());

    for (pos, &slot) in slots.iter().enumerate() {
        let f = father.value(marker, slot);
        let s = son.value(marker, slot);

        cells.push(ComparisonCell {
            father: f.to_string(),
            son: s.to_string(),
            diff: !values_equivalent(f, s),
        });

        if is_blank(f) || is_blank(s) {
            return (cells, Some(pos + 1));
        }
    }

    (cells, None)
}

/// Second phase of a row: fill the remaining active slots with blank cells
pub fn pad_remainder(cells: &mut Vec<ComparisonCell>, active_len: usize) {
    while cells.len() < active_len {
        cells.push(ComparisonCell::padding());
    }
}

/// Build the comparison row for one marker
pub fn build_row(
    father: &SampleRecords,
    son: &SampleRecords,
    marker: &str,
    slots: &[usize],
) -> ComparisonRow {
    let (mut cells, stopped_at) = compare_until_stop(father, son, marker, slots);
    let verdict = if cells.iter().any(|c| c.diff) {
        Verdict::Mismatch
    } else {
        Verdict::Match
    };
    pad_remainder(&mut cells, slots.len());

    ComparisonRow {
        marker: marker.to_string(),
        cells,
        verdict,
        stopped_at,
    }
}

/// Compares father/son duos against a loaded store
pub struct DuoComparator<'a> {
    store: &'a RecordStore,
    catalog: &'a MarkerCatalog,
}

impl<'a> DuoComparator<'a> {
    pub fn new(store: &'a RecordStore, catalog: &'a MarkerCatalog) -> Self {
        Self { store, catalog }
    }

    /// Compare one duo. Names are resolved case-insensitively, father first.
    pub fn compare(&self, father: &str, son: &str) -> Result<DuoResult, CompareError> {
        let father = SampleKey::new(father);
        let son = SampleKey::new(son);
        let father_records = self.resolve(&father, Party::Father)?;
        let son_records = self.resolve(&son, Party::Son)?;

        let slots = active_slots(father_records, son_records, self.catalog);
        debug!(
            "Active slots for {} / {}: {:?}",
            father.entered, son.entered, slots
        );

        let rows = self
            .catalog
            .iter()
            .map(|marker| build_row(father_records, son_records, marker, &slots))
            .collect();

        Ok(DuoResult {
            father,
            son,
            active_slots: slots,
            rows,
        })
    }

    fn resolve(&self, key: &SampleKey, party: Party) -> Result<&'a SampleRecords, CompareError> {
        self.store.find(key).ok_or_else(|| CompareError::NotFound {
            party,
            name: key.entered.clone(),
        })
    }
}

/// Accepted duos of one run, in submission order
pub struct DuoSession<'a> {
    comparator: DuoComparator<'a>,
    accepted: Vec<DuoResult>,
}

impl<'a> DuoSession<'a> {
    pub fn new(store: &'a RecordStore, catalog: &'a MarkerCatalog) -> Self {
        Self {
            comparator: DuoComparator::new(store, catalog),
            accepted: Vec::new(),
        }
    }

    /// Compare and keep a duo. A rejected duo leaves the session untouched.
    pub fn submit(&mut self, father: &str, son: &str) -> Result<&DuoResult, CompareError> {
        let result = self.comparator.compare(father, son)?;
        info!(
            "Duo #{} {} / {}: {} of {} marker(s) mismatched",
            self.accepted.len() + 1,
            father,
            son,
            result.mismatch_count(),
            result.rows.len()
        );
        self.accepted.push(result);
        Ok(&self.accepted[self.accepted.len() - 1])
    }

    /// Ordinal the next accepted duo will receive
    pub fn next_ordinal(&self) -> usize {
        self.accepted.len() + 1
    }

    pub fn into_results(self) -> Vec<DuoResult> {
        self.accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::{RawRow, RawTable};
    use crate::store::Dataset;

    fn dataset(rows: &[&[&str]]) -> Dataset {
        let header = ["Sample", "Marker", "A1", "A2", "A3", "A4"];
        let table = RawTable {
            header: header.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .enumerate()
                .map(|(i, fields)| {
                    RawRow::new(i + 2, fields.iter().map(|s| s.to_string()).collect())
                })
                .collect(),
        };
        Dataset::from_table(&table).unwrap()
    }

    fn cell(father: &str, son: &str, diff: bool) -> ComparisonCell {
        ComparisonCell {
            father: father.to_string(),
            son: son.to_string(),
            diff,
        }
    }

    #[test]
    fn test_parse_numeric() {
        assert_eq!(parse_numeric("7"), Some(7.0));
        assert_eq!(parse_numeric(" 7.0 "), Some(7.0));
        assert_eq!(parse_numeric("-1.5e2"), Some(-150.0));
        assert_eq!(parse_numeric("+3"), Some(3.0));
        assert_eq!(parse_numeric(".5"), Some(0.5));
        assert_eq!(parse_numeric("5."), Some(5.0));
        assert_eq!(parse_numeric("9.3"), Some(9.3));
        assert_eq!(parse_numeric("1E+2"), Some(100.0));

        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("   "), None);
        assert_eq!(parse_numeric("."), None);
        assert_eq!(parse_numeric("-"), None);
        assert_eq!(parse_numeric("12a"), None);
        assert_eq!(parse_numeric("1e"), None);
        assert_eq!(parse_numeric("1e+"), None);
        assert_eq!(parse_numeric("X"), None);
        assert_eq!(parse_numeric("inf"), None);
        assert_eq!(parse_numeric("NaN"), None);
        assert_eq!(parse_numeric("1 2"), None);
        assert_eq!(parse_numeric("0x1A"), None);
    }

    #[test]
    fn test_values_equivalent() {
        assert!(values_equivalent("7", "7.0"));
        assert!(values_equivalent("12", "1.2e1"));
        assert!(values_equivalent("X", "X"));
        assert!(values_equivalent("", ""));
        assert!(!values_equivalent("x", "X"));
        assert!(!values_equivalent("7", "7a"));
        assert!(!values_equivalent("", "14"));
        assert!(!values_equivalent("9.3", "9.30001"));
    }

    #[test]
    fn test_compare_unknown_father() {
        let data = dataset(&[&["F", "D1", "12"], &["S", "D1", "12"]]);
        let comparator = DuoComparator::new(&data.store, &data.catalog);

        let err = comparator.compare("nobody", "S").unwrap_err();
        assert_eq!(
            err,
            CompareError::NotFound {
                party: Party::Father,
                name: "nobody".to_string()
            }
        );

        let err = comparator.compare("F", "nobody").unwrap_err();
        assert!(matches!(err, CompareError::NotFound { party: Party::Son, .. }));
    }

    #[test]
    fn test_identical_duo_matches_everywhere() {
        let data = dataset(&[
            &["F", "D1", "12", "14"],
            &["F", "D2", "8", "8"],
            &["S", "D1", "12", "14"],
            &["S", "D2", "8", "8"],
        ]);
        let result = DuoComparator::new(&data.store, &data.catalog)
            .compare("f", "S")
            .unwrap();

        assert_eq!(result.active_slots, vec![0, 1]);
        assert_eq!(result.rows.len(), 2);
        for row in &result.rows {
            assert_eq!(row.verdict, Verdict::Match);
            assert!(row.cells.iter().all(|c| !c.diff));
            assert_eq!(row.stopped_at, None);
        }
        assert_eq!(result.mismatch_count(), 0);
    }

    #[test]
    fn test_numeric_equivalence_not_flagged() {
        let data = dataset(&[&["F", "D1", "7", "9.3"], &["S", "D1", "7.0", "9.30"]]);
        let result = DuoComparator::new(&data.store, &data.catalog)
            .compare("F", "S")
            .unwrap();

        let row = &result.rows[0];
        assert_eq!(row.cells[0], cell("7", "7.0", false));
        assert_eq!(row.cells[1], cell("9.3", "9.30", false));
        assert_eq!(row.verdict, Verdict::Match);
    }

    #[test]
    fn test_stopping_slot_counts_and_rest_is_padded() {
        let data = dataset(&[&["F", "D1", "12", "", "11"], &["S", "D1", "12", "14", ""]]);
        let result = DuoComparator::new(&data.store, &data.catalog)
            .compare("F", "S")
            .unwrap();

        assert_eq!(result.active_slots, vec![0, 1, 2]);
        let row = &result.rows[0];
        assert_eq!(
            row.cells,
            vec![cell("12", "12", false), cell("", "14", true), cell("", "", false)]
        );
        assert_eq!(row.stopped_at, Some(2));
        assert_eq!(row.compared().len(), 2);
        assert_eq!(row.padding(), &[cell("", "", false)]);
        assert_eq!(row.verdict, Verdict::Mismatch);
    }

    #[test]
    fn test_padding_never_highlights() {
        // a slot blank for both parties is dropped, so no stop here
        let data = dataset(&[
            &["F", "D1", "12", "", "10"],
            &["S", "D1", "12", "", "11"],
        ]);
        let result = DuoComparator::new(&data.store, &data.catalog)
            .compare("F", "S")
            .unwrap();

        let row = &result.rows[0];
        assert_eq!(result.active_slots, vec![0, 2]);
        assert_eq!(row.cells[1], cell("10", "11", true));
        assert_eq!(row.stopped_at, None);

        let data = dataset(&[&["F", "D1", "", "10"], &["S", "D1", "", "11"]]);
        let result = DuoComparator::new(&data.store, &data.catalog)
            .compare("F", "S")
            .unwrap();
        let row = &result.rows[0];
        assert_eq!(result.active_slots, vec![1]);
        assert_eq!(row.cells, vec![cell("10", "11", true)]);

        let data = dataset(&[
            &["F", "D1", "5", "10"],
            &["F", "D2", "", "10"],
            &["S", "D1", "5", "10"],
            &["S", "D2", "", "11"],
        ]);
        let result = DuoComparator::new(&data.store, &data.catalog)
            .compare("F", "S")
            .unwrap();
        let d2 = &result.rows[1];
        assert_eq!(d2.cells, vec![cell("", "", false), cell("", "", false)]);
        assert_eq!(d2.stopped_at, Some(1));
        assert_eq!(d2.verdict, Verdict::Match);
    }

    #[test]
    fn test_active_slots_are_per_duo() {
        let data = dataset(&[
            &["F1", "D1", "12", "14", "16"],
            &["S1", "D1", "12", "14", "16"],
            &["F2", "D1", "12"],
            &["S2", "D1", "12"],
        ]);
        let comparator = DuoComparator::new(&data.store, &data.catalog);
        assert_eq!(comparator.compare("F1", "S1").unwrap().active_slots, vec![0, 1, 2]);
        assert_eq!(comparator.compare("F2", "S2").unwrap().active_slots, vec![0]);
    }

    #[test]
    fn test_active_slots_fall_back_to_first() {
        let data = dataset(&[&["F", "D1"], &["S", "D2"]]);
        let result = DuoComparator::new(&data.store, &data.catalog)
            .compare("F", "S")
            .unwrap();

        assert_eq!(result.active_slots, vec![0]);
        for row in &result.rows {
            assert_eq!(row.cells, vec![cell("", "", false)]);
            assert_eq!(row.verdict, Verdict::Match);
        }
    }

    #[test]
    fn test_marker_absent_for_one_party() {
        let data = dataset(&[
            &["F", "D1", "12"],
            &["F", "D2", "8"],
            &["S", "D1", "12"],
            &["X", "TH01", "6"],
        ]);
        let result = DuoComparator::new(&data.store, &data.catalog)
            .compare("F", "S")
            .unwrap();

        let markers: Vec<&str> = result.rows.iter().map(|r| r.marker.as_str()).collect();
        assert_eq!(markers, vec!["D1", "D2", "TH01"]);

        assert_eq!(result.rows[1].cells, vec![cell("8", "", true)]);
        assert_eq!(result.rows[1].verdict, Verdict::Mismatch);
        assert_eq!(result.rows[2].cells, vec![cell("", "", false)]);
        assert_eq!(result.rows[2].verdict, Verdict::Match);
    }

    #[test]
    fn test_text_alleles_compare_case_sensitively() {
        let data = dataset(&[&["F", "AMEL", "X", "Y"], &["S", "AMEL", "X", "y"]]);
        let result = DuoComparator::new(&data.store, &data.catalog)
            .compare("F", "S")
            .unwrap();
        assert_eq!(result.rows[0].cells[1], cell("Y", "y", true));
        assert_eq!(result.rows[0].verdict, Verdict::Mismatch);
    }

    #[test]
    fn test_pad_remainder() {
        let mut cells = vec![cell("1", "1", false)];
        pad_remainder(&mut cells, 3);
        assert_eq!(cells.len(), 3);
        assert!(cells[1..].iter().all(|c| c == &ComparisonCell::padding()));

        pad_remainder(&mut cells, 2);
        assert_eq!(cells.len(), 3);
    }

    #[test]
    fn test_session_rejection_keeps_ordinal() {
        let data = dataset(&[&["F", "D1", "12"], &["S", "D1", "13"]]);
        let mut session = DuoSession::new(&data.store, &data.catalog);

        assert_eq!(session.next_ordinal(), 1);
        assert!(session.submit("F", "missing").is_err());
        assert_eq!(session.next_ordinal(), 1);

        let result = session.submit("F", "S").unwrap();
        assert_eq!(result.father.entered, "F");
        assert_eq!(result.son.lookup, "s");
        assert_eq!(session.next_ordinal(), 2);
        assert_eq!(session.into_results().len(), 1);
    }

    #[test]
    fn test_catalog_drives_row_order() {
        let data = dataset(&[&["F", "b", "1"], &["S", "a", "1"]]);
        let catalog = MarkerCatalog::from_markers(["b", "a", "b"]);
        let result = DuoComparator::new(&data.store, &catalog)
            .compare("F", "S")
            .unwrap();
        let markers: Vec<&str> = result.rows.iter().map(|r| r.marker.as_str()).collect();
        assert_eq!(markers, vec!["a", "b"]);
    }
}
