//! Core data model types.
//!
//! Uploads are parsed into [`EquipmentRecord`]s, summarized into [`Statistics`] and assembled
//! into a [`NewDataset`]. The retention store turns that into a stored [`Dataset`] by assigning
//! its id.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::error::{PipelineError, PipelineResult};
use crate::processing::summarize;

/// Identifier assigned to a [`Dataset`] by the retention store.
pub type DatasetId = u64;

/// One validated row of equipment measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentRecord {
    /// Equipment name (trimmed, never empty).
    pub name: String,
    /// Equipment type (trimmed, never empty).
    pub equipment_type: String,
    /// Finite flowrate reading.
    pub flowrate: f64,
    /// Finite pressure reading.
    pub pressure: f64,
    /// Finite temperature reading.
    pub temperature: f64,
}

impl EquipmentRecord {
    /// Create a record from already-validated values.
    pub fn new(
        name: impl Into<String>,
        equipment_type: impl Into<String>,
        flowrate: f64,
        pressure: f64,
        temperature: f64,
    ) -> Self {
        Self {
            name: name.into(),
            equipment_type: equipment_type.into(),
            flowrate,
            pressure,
            temperature,
        }
    }

    /// Read one of the numeric measurements.
    pub fn value(&self, field: NumericField) -> f64 {
        match field {
            NumericField::Flowrate => self.flowrate,
            NumericField::Pressure => self.pressure,
            NumericField::Temperature => self.temperature,
        }
    }
}

/// The numeric measurement columns of an equipment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericField {
    Flowrate,
    Pressure,
    Temperature,
}

impl NumericField {
    /// All numeric fields in report order.
    pub const ALL: [NumericField; 3] = [Self::Flowrate, Self::Pressure, Self::Temperature];

    /// Display label, identical to the CSV column name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Flowrate => "Flowrate",
            Self::Pressure => "Pressure",
            Self::Temperature => "Temperature",
        }
    }
}

/// Minimum, maximum and mean of one numeric field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSummary {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

/// Summary statistics derived from a dataset's records.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    /// Number of records (always >= 1).
    pub count: usize,
    pub flowrate: FieldSummary,
    pub pressure: FieldSummary,
    pub temperature: FieldSummary,
    /// Occurrences per equipment type, in first-seen order.
    pub type_distribution: IndexMap<String, usize>,
}

impl Statistics {
    /// Summary for one numeric field.
    pub fn field(&self, field: NumericField) -> &FieldSummary {
        match field {
            NumericField::Flowrate => &self.flowrate,
            NumericField::Pressure => &self.pressure,
            NumericField::Temperature => &self.temperature,
        }
    }
}

/// A fully assembled upload that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDataset {
    filename: String,
    uploaded_at: DateTime<Utc>,
    records: Vec<EquipmentRecord>,
    summary: Statistics,
}

impl NewDataset {
    /// Assemble a dataset, computing its summary from `records`.
    ///
    /// Fails with [`PipelineError::NoValidData`] if `records` is empty.
    pub fn new(
        filename: impl Into<String>,
        uploaded_at: DateTime<Utc>,
        records: Vec<EquipmentRecord>,
    ) -> PipelineResult<Self> {
        let summary = summarize(&records).ok_or(PipelineError::NoValidData { rejected: 0 })?;
        Ok(Self {
            filename: filename.into(),
            uploaded_at,
            records,
            summary,
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }

    pub fn records(&self) -> &[EquipmentRecord] {
        &self.records
    }

    pub fn summary(&self) -> &Statistics {
        &self.summary
    }

    pub(crate) fn into_stored(self, id: DatasetId, sequence: u64) -> Dataset {
        Dataset {
            id,
            sequence,
            filename: self.filename,
            uploaded_at: self.uploaded_at,
            records: self.records,
            summary: self.summary,
        }
    }
}

/// A retained upload: records plus their derived summary.
///
/// Datasets are immutable once stored; only the retention store can create them.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    id: DatasetId,
    sequence: u64,
    filename: String,
    uploaded_at: DateTime<Utc>,
    records: Vec<EquipmentRecord>,
    summary: Statistics,
}

impl Dataset {
    pub fn id(&self) -> DatasetId {
        self.id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }

    /// Records in original row order.
    pub fn records(&self) -> &[EquipmentRecord] {
        &self.records
    }

    pub fn summary(&self) -> &Statistics {
        &self.summary
    }

    /// Always equal to `records().len()`.
    pub fn total_records(&self) -> usize {
        self.records.len()
    }

    /// Insertion sequence, used to order datasets with equal timestamps.
    pub(crate) fn sequence(&self) -> u64 {
        self.sequence
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{EquipmentRecord, NewDataset, NumericField};
    use crate::error::PipelineError;

    #[test]
    fn new_dataset_derives_summary_and_total() {
        let records = vec![
            EquipmentRecord::new("P-1", "Pump", 10.0, 2.0, 80.0),
            EquipmentRecord::new("V-1", "Valve", 30.0, 4.0, 90.0),
        ];
        let ds = NewDataset::new("plant.csv", Utc::now(), records).unwrap();
        assert_eq!(ds.summary().count, 2);
        assert_eq!(ds.summary().field(NumericField::Flowrate).avg, 20.0);

        let stored = ds.into_stored(7, 0);
        assert_eq!(stored.id(), 7);
        assert_eq!(stored.total_records(), stored.records().len());
    }

    #[test]
    fn new_dataset_refuses_empty_records() {
        let err = NewDataset::new("empty.csv", Utc::now(), Vec::new()).unwrap_err();
        assert!(matches!(err, PipelineError::NoValidData { .. }));
    }
}
