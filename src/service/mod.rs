//! Boundary operations for the (external) transport layer.
//!
//! [`EquipmentService`] wires the upload pipeline, the [`RetentionManager`] and the
//! [`ReportComposer`] together:
//!
//! - **upload**: validate + parse + summarize, then store (evicting beyond the cap)
//! - **list**: retained datasets, most recent first
//! - **get** / **delete**: by id, [`PipelineError::NotFound`] if absent
//! - **report**: render a retained dataset; rendering happens outside the store lock
//!
//! ```rust
//! use equipment_analytics::service::EquipmentService;
//!
//! let service = EquipmentService::default();
//! let csv = "Equipment Name,Type,Flowrate,Pressure,Temperature\nPump-1,Pump,120,5.2,110\n";
//! let created = service.upload("plant.csv", csv.as_bytes()).unwrap();
//!
//! assert_eq!(service.list().len(), 1);
//! let report = service.report(created.id).unwrap();
//! assert!(!report.bytes.is_empty());
//! service.delete(created.id).unwrap();
//! assert!(service.get(created.id).is_err());
//! ```

pub mod repr;

use crate::config::PipelineOptions;
use crate::error::{PipelineError, PipelineResult};
use crate::execution::ExecutionEngine;
use crate::ingestion::ingest_upload;
use crate::report::{RenderedReport, ReportComposer};
use crate::retention::RetentionManager;
use crate::types::DatasetId;

pub use repr::{DatasetRepr, EquipmentRecordRepr, ErrorBody, JsonReply, StatisticsRepr, UploadResponse};

/// Number of rejected rows logged individually per upload.
const LOGGED_REJECTIONS: usize = 5;

/// The equipment analytics service.
#[derive(Debug)]
pub struct EquipmentService {
    options: PipelineOptions,
    store: RetentionManager,
    composer: ReportComposer,
}

impl Default for EquipmentService {
    fn default() -> Self {
        Self::new(PipelineOptions::default())
    }
}

impl EquipmentService {
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            store: RetentionManager::new(options.history_cap),
            composer: ReportComposer::from_options(&options),
            options,
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// The underlying dataset store.
    pub fn store(&self) -> &RetentionManager {
        &self.store
    }

    /// Ingest and store an upload. History is unchanged if ingestion fails.
    pub fn upload(&self, filename: &str, content: &[u8]) -> PipelineResult<DatasetRepr> {
        let upload = ingest_upload(filename, content, &self.options)?;
        for rejection in upload.rejections.iter().take(LOGGED_REJECTIONS) {
            tracing::info!(
                filename,
                row = rejection.row,
                column = rejection.column,
                reason = ?rejection.reason,
                "row skipped"
            );
        }

        let outcome = self.store.insert(upload.dataset);
        if !outcome.evicted.is_empty() {
            tracing::debug!(evicted = ?outcome.evicted, "history cap enforced");
        }
        Ok(DatasetRepr::from(outcome.dataset.as_ref()))
    }

    /// Upload and wrap the result the way the hosted API answers (201 on success).
    pub fn upload_reply(&self, filename: &str, content: &[u8]) -> JsonReply {
        JsonReply::from_result(self.upload(filename, content).map(UploadResponse::new), 201)
    }

    /// Retained datasets, most recent first.
    pub fn list(&self) -> Vec<DatasetRepr> {
        self.store
            .list()
            .iter()
            .map(|ds| DatasetRepr::from(ds.as_ref()))
            .collect()
    }

    pub fn get(&self, id: DatasetId) -> PipelineResult<DatasetRepr> {
        self.store.get(id).map(|ds| DatasetRepr::from(ds.as_ref()))
    }

    /// [`Self::list`] as a 200 reply.
    pub fn list_reply(&self) -> JsonReply {
        JsonReply::from_result(Ok(self.list()), 200)
    }

    /// [`Self::get`] as a reply: 200 with the dataset, or 404 with an error body.
    pub fn get_reply(&self, id: DatasetId) -> JsonReply {
        JsonReply::from_result(self.get(id), 200)
    }

    /// Render the report for dataset `id`.
    pub fn report(&self, id: DatasetId) -> PipelineResult<RenderedReport> {
        let dataset = self.store.get(id)?;
        self.composer.compose_report(&dataset).inspect_err(|e| {
            if let PipelineError::Render { .. } = e {
                tracing::warn!(dataset_id = id, "report rendering failed: {e}");
            }
        })
    }

    /// Render reports for several datasets in parallel on `engine`, in the order of `ids`.
    pub fn report_many(&self, engine: &ExecutionEngine, ids: &[DatasetId]) -> Vec<PipelineResult<RenderedReport>> {
        engine.render_reports(&self.store, &self.composer, ids)
    }

    /// Delete dataset `id`. Deleting an absent id is [`PipelineError::NotFound`].
    pub fn delete(&self, id: DatasetId) -> PipelineResult<()> {
        self.store.delete(id).map(|_| ())
    }

    /// [`Self::delete`] as a reply: 204 with an empty body, or 404 with an error body.
    pub fn delete_reply(&self, id: DatasetId) -> JsonReply {
        match self.delete(id) {
            Ok(()) => JsonReply {
                status: 204,
                body: Vec::new(),
            },
            Err(e) => JsonReply::from_result(Err::<(), _>(e), 204),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EquipmentService;
    use crate::config::PipelineOptions;
    use crate::error::ErrorKind;

    const CSV: &str = "Equipment Name,Type,Flowrate,Pressure,Temperature\nP-1,Pump,10,2,80\nV-1,Valve,20,4,90\n";

    #[test]
    fn failed_upload_leaves_history_unchanged() {
        let service = EquipmentService::default();
        service.upload("ok.csv", CSV.as_bytes()).unwrap();

        let err = service
            .upload("bad.csv", b"Equipment Name,Type,Flowrate,Temperature\nP,Pump,1,2\n")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingColumns);
        assert_eq!(service.list().len(), 1);
    }

    #[test]
    fn upload_reply_reports_status_and_body() {
        let service = EquipmentService::new(PipelineOptions {
            history_cap: 2,
            ..Default::default()
        });
        let ok = service.upload_reply("plant.csv", CSV.as_bytes());
        assert_eq!(ok.status, 201);
        let body: serde_json::Value = serde_json::from_slice(&ok.body).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["total_records"], 2);

        let bad = service.upload_reply("plant.txt", CSV.as_bytes());
        assert_eq!(bad.status, 400);
        let body: serde_json::Value = serde_json::from_slice(&bad.body).unwrap();
        assert_eq!(body["kind"], "format_error");
        assert!(body["error"].as_str().unwrap().contains("plant.txt"));
    }

    #[test]
    fn get_and_delete_replies_map_missing_ids_to_404() {
        let service = EquipmentService::default();
        let id = service.upload("plant.csv", CSV.as_bytes()).unwrap().id;

        let found = service.get_reply(id);
        assert_eq!(found.status, 200);
        let body: serde_json::Value = serde_json::from_slice(&found.body).unwrap();
        assert_eq!(body["id"], id);
        assert_eq!(body["equipment_records"].as_array().unwrap().len(), 2);

        let listed: serde_json::Value = serde_json::from_slice(&service.list_reply().body).unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let deleted = service.delete_reply(id);
        assert_eq!(deleted.status, 204);
        assert!(deleted.body.is_empty());

        for reply in [service.delete_reply(id), service.get_reply(id)] {
            assert_eq!(reply.status, 404);
            let body: serde_json::Value = serde_json::from_slice(&reply.body).unwrap();
            assert_eq!(body["kind"], "not_found");
            assert_eq!(body["error"], format!("dataset not found: {id}"));
        }
    }
}
