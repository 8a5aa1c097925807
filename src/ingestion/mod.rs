//! Ingestion of uploaded equipment CSV files.
//!
//! Most callers should use [`ingest_upload`] (from [`upload`]) which:
//!
//! - refuses files with a wrong extension or over the size limit
//! - validates the header against [`REQUIRED_COLUMNS`] ([`schema`])
//! - parses rows into typed records, dropping and counting bad rows ([`csv`])
//! - summarizes the records into an unstored [`crate::types::NewDataset`]
//! - optionally reports success/failure/alerts to an [`UploadObserver`]

pub mod csv;
pub mod observability;
pub mod schema;
pub mod upload;

pub use self::csv::{FieldError, FieldOutcome, ParsedRecords, RowRejection, parse_records};
pub use observability::{
    CompositeObserver, FileObserver, StdErrObserver, TracingObserver, UploadContext, UploadObserver, UploadSeverity,
    UploadStats,
};
pub use schema::{REQUIRED_COLUMNS, ValidatedTable, validate_header};
pub use upload::{IngestedUpload, ingest_from_path, ingest_upload, ingest_upload_at};
