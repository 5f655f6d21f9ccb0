use hashbrown::HashMap;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

use crate::error::LoadError;
use crate::parsers::{RawRow, RawTable, TableParser};
use crate::types::{lookup_key, trim_field, AlleleRecord, SampleKey, MAX_SLOTS};

/// Records of a single sample, keyed by marker name
#[derive(Debug, Clone, Default)]
pub struct SampleRecords {
    /// Sample name as it appeared on the most recent row
    pub name: String,
    pub markers: HashMap<String, AlleleRecord>,
}

impl SampleRecords {
    pub fn get(&self, marker: &str) -> Option<&AlleleRecord> {
        self.markers.get(marker)
    }

    /// Slot value for a marker; empty when the sample has no record for it
    pub fn value(&self, marker: &str, slot: usize) -> &str {
        self.get(marker).map(|r| r.slot(slot)).unwrap_or("")
    }
}

/// All loaded records, indexed by case-insensitive sample key then marker
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    samples: HashMap<String, SampleRecords>,
    allele_columns: usize,
}

impl RecordStore {
    /// Resolve a sample by name, ignoring case and surrounding whitespace
    pub fn sample(&self, name: &str) -> Option<&SampleRecords> {
        self.samples.get(&lookup_key(name))
    }

    /// Resolve a sample by its precomputed lookup key
    pub fn find(&self, key: &SampleKey) -> Option<&SampleRecords> {
        self.samples.get(&key.lookup)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sample(name).is_some()
    }

    /// Number of populated slot columns derived from the header
    pub fn allele_columns(&self) -> usize {
        self.allele_columns
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn record_count(&self) -> usize {
        self.samples.values().map(|s| s.markers.len()).sum()
    }

    /// Display names of all samples, sorted
    pub fn sample_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.samples.values().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    fn insert(&mut self, record: AlleleRecord) -> Option<AlleleRecord> {
        let entry = self.samples.entry(lookup_key(&record.sample)).or_default();
        entry.name = record.sample.clone();
        entry.markers.insert(record.marker.clone(), record)
    }
}

/// Deterministically ordered set of every marker seen in the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerCatalog {
    markers: Vec<String>,
}

impl MarkerCatalog {
    pub fn from_markers<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = markers.into_iter().map(Into::into).collect();
        Self {
            markers: set.into_iter().collect(),
        }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.markers.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Loaded store plus its derived marker catalog
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub store: RecordStore,
    pub catalog: MarkerCatalog,
    pub skipped_rows: usize,
}

impl Dataset {
    /// Read `path` with `parser` and index the result
    pub fn load(path: &Path, parser: &dyn TableParser) -> Result<Self, LoadError> {
        let table = parser.parse(path)?;
        let dataset = Self::from_table(&table)?;
        info!(
            "Loaded {} record(s) for {} sample(s), {} marker(s) from {}",
            dataset.store.record_count(),
            dataset.store.sample_count(),
            dataset.catalog.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Index an already parsed table
    pub fn from_table(table: &RawTable) -> Result<Self, LoadError> {
        if table.header.len() < 2 {
            return Err(LoadError::HeaderTooNarrow {
                found: table.header.len(),
            });
        }

        let allele_columns = (table.header.len() - 2).min(MAX_SLOTS);
        let mut store = RecordStore {
            samples: HashMap::new(),
            allele_columns,
        };
        let mut markers = BTreeSet::new();
        let mut skipped_rows = 0;

        for row in &table.rows {
            let Some(record) = build_record(row, allele_columns) else {
                skipped_rows += 1;
                continue;
            };

            markers.insert(record.marker.clone());
            if let Some(previous) = store.insert(record) {
                debug!(
                    "Line {}: replaced earlier record for {} / {}",
                    row.line, previous.sample, previous.marker
                );
            }
        }

        if skipped_rows > 0 {
            debug!("Skipped {} row(s) without sample or marker", skipped_rows);
        }

        Ok(Self {
            store,
            catalog: MarkerCatalog {
                markers: markers.into_iter().collect(),
            },
            skipped_rows,
        })
    }
}

fn build_record(row: &RawRow, allele_columns: usize) -> Option<AlleleRecord> {
    if row.is_blank() {
        return None;
    }
    if row.fields.len() < 2 {
        debug!("Line {}: fewer than 2 fields", row.line);
        return None;
    }

    let sample = trim_field(&row.fields[0]);
    let marker = trim_field(&row.fields[1]);
    if sample.is_empty() || marker.is_empty() {
        debug!("Line {}: empty sample or marker", row.line);
        return None;
    }

    let mut slots: [String; MAX_SLOTS] = Default::default();
    for (i, slot) in slots.iter_mut().enumerate().take(allele_columns) {
        if let Some(value) = row.fields.get(2 + i) {
            *slot = trim_field(value).to_string();
        }
    }

    Some(AlleleRecord {
        sample: sample.to_string(),
        marker: marker.to_string(),
        slots,
    })
}
