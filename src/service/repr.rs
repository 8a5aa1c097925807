//! JSON representations exchanged with the transport layer.
//!
//! Field names are part of the public contract and match the hosted API.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::types::{Dataset, DatasetId, EquipmentRecord, Statistics};

/// One equipment record; `id` is its 1-based position in the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRecordRepr {
    pub id: usize,
    pub equipment_name: String,
    pub equipment_type: String,
    pub flowrate: f64,
    pub pressure: f64,
    pub temperature: f64,
}

impl EquipmentRecordRepr {
    pub fn new(position: usize, record: &EquipmentRecord) -> Self {
        Self {
            id: position,
            equipment_name: record.name.clone(),
            equipment_type: record.equipment_type.clone(),
            flowrate: record.flowrate,
            pressure: record.pressure,
            temperature: record.temperature,
        }
    }
}

/// Flattened summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsRepr {
    pub total_count: usize,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    pub min_flowrate: f64,
    pub max_flowrate: f64,
    pub min_pressure: f64,
    pub max_pressure: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
    /// Serialized as a JSON object in first-seen order.
    pub type_distribution: IndexMap<String, usize>,
}

impl From<&Statistics> for StatisticsRepr {
    fn from(s: &Statistics) -> Self {
        Self {
            total_count: s.count,
            avg_flowrate: s.flowrate.avg,
            avg_pressure: s.pressure.avg,
            avg_temperature: s.temperature.avg,
            min_flowrate: s.flowrate.min,
            max_flowrate: s.flowrate.max,
            min_pressure: s.pressure.min,
            max_pressure: s.pressure.max,
            min_temperature: s.temperature.min,
            max_temperature: s.temperature.max,
            type_distribution: s.type_distribution.clone(),
        }
    }
}

/// A stored dataset with its summary and records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRepr {
    pub id: DatasetId,
    pub filename: String,
    /// RFC 3339.
    pub uploaded_at: DateTime<Utc>,
    pub total_records: usize,
    pub summary: StatisticsRepr,
    pub equipment_records: Vec<EquipmentRecordRepr>,
}

impl From<&Dataset> for DatasetRepr {
    fn from(ds: &Dataset) -> Self {
        Self {
            id: ds.id(),
            filename: ds.filename().to_owned(),
            uploaded_at: ds.uploaded_at(),
            total_records: ds.total_records(),
            summary: StatisticsRepr::from(ds.summary()),
            equipment_records: ds
                .records()
                .iter()
                .enumerate()
                .map(|(idx, r)| EquipmentRecordRepr::new(idx + 1, r))
                .collect(),
        }
    }
}

/// Successful upload body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub data: DatasetRepr,
}

impl UploadResponse {
    pub fn new(data: DatasetRepr) -> Self {
        Self {
            success: true,
            message: format!(
                "Dataset \"{}\" uploaded successfully with {} records",
                data.filename, data.total_records
            ),
            data,
        }
    }
}

/// Failure body: `{"error": <message>, "kind": <label>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: String,
}

impl From<&PipelineError> for ErrorBody {
    fn from(err: &PipelineError) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind().as_str().to_owned(),
        }
    }
}

/// A serialized response plus the status a transport layer should answer with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl JsonReply {
    /// Serialize `result`: `ok_status` with the value, or the error's status with an [`ErrorBody`].
    pub fn from_result<T: Serialize>(result: Result<T, PipelineError>, ok_status: u16) -> Self {
        let serialized = match &result {
            Ok(value) => serde_json::to_vec(value).map(|body| Self { status: ok_status, body }),
            Err(err) => serde_json::to_vec(&ErrorBody::from(err)).map(|body| Self {
                status: err.kind().status_code(),
                body,
            }),
        };
        serialized.unwrap_or_else(|e| {
            let err = PipelineError::from(e);
            tracing::error!("failed to serialize response: {err}");
            Self {
                status: err.kind().status_code(),
                body: format!("{{\"error\":\"{}\",\"kind\":\"{}\"}}", "serialization error", err.kind().as_str())
                    .into_bytes(),
            }
        })
    }
}
