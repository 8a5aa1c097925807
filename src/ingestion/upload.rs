//! Upload entry point.
//!
//! [`ingest_upload`] runs header validation, row parsing and summarization for one uploaded
//! file and yields an unstored [`NewDataset`]. Nothing is retained here, so a failed upload
//! never touches history.
//!
//! If [`PipelineOptions::observer`] is set, success/failure/alerts are reported to it.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::config::PipelineOptions;
use crate::error::{PipelineError, PipelineResult};
use crate::types::NewDataset;

use super::csv::{RowRejection, parse_records};
use super::observability::{UploadContext, UploadSeverity, UploadStats};
use super::schema::{REQUIRED_COLUMNS, validate_header};

/// A parsed upload, ready to be inserted into the retention store.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedUpload {
    pub dataset: NewDataset,
    /// Rows dropped by the record parser, in file order.
    pub rejections: Vec<RowRejection>,
}

impl IngestedUpload {
    /// Number of rows dropped.
    pub fn rejected(&self) -> usize {
        self.rejections.len()
    }
}

/// Ingest an uploaded file, stamping it with the current time.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` with accepted/rejected row counts
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```rust
/// use equipment_analytics::config::PipelineOptions;
/// use equipment_analytics::ingestion::ingest_upload;
///
/// let csv = "Equipment Name,Type,Flowrate,Pressure,Temperature\n\
///            Pump-1,Pump,120,5.2,110\n\
///            Valve-1,Valve,60,4.1,95\n";
/// let upload = ingest_upload("plant.csv", csv.as_bytes(), &PipelineOptions::default()).unwrap();
/// assert_eq!(upload.dataset.records().len(), 2);
/// assert_eq!(upload.dataset.summary().type_distribution["Pump"], 1);
/// ```
pub fn ingest_upload(
    filename: &str,
    content: &[u8],
    options: &PipelineOptions,
) -> PipelineResult<IngestedUpload> {
    ingest_upload_at(filename, content, Utc::now(), options)
}

/// Same as [`ingest_upload`] with an explicit upload timestamp.
pub fn ingest_upload_at(
    filename: &str,
    content: &[u8],
    uploaded_at: DateTime<Utc>,
    options: &PipelineOptions,
) -> PipelineResult<IngestedUpload> {
    let ctx = UploadContext {
        filename: filename.to_owned(),
        size: content.len(),
    };

    let result = run_pipeline(filename, content, uploaded_at, options);

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(upload) => obs.on_success(
                &ctx,
                UploadStats {
                    accepted: upload.dataset.records().len(),
                    rejected: upload.rejected(),
                },
            ),
            Err(e) => {
                let sev = UploadSeverity::for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}

/// Read a CSV file from disk and ingest it under its file name.
pub fn ingest_from_path(path: impl AsRef<Path>, options: &PipelineOptions) -> PipelineResult<IngestedUpload> {
    let path = path.as_ref();
    let filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_owned();
    let content = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            let err = PipelineError::Io(e);
            if let Some(obs) = options.observer.as_ref() {
                let ctx = UploadContext { filename, size: 0 };
                let sev = UploadSeverity::for_error(&err);
                obs.on_failure(&ctx, sev, &err);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, &err);
                }
            }
            return Err(err);
        }
    };
    ingest_upload(&filename, &content, options)
}

fn run_pipeline(
    filename: &str,
    content: &[u8],
    uploaded_at: DateTime<Utc>,
    options: &PipelineOptions,
) -> PipelineResult<IngestedUpload> {
    check_extension(filename, &options.allowed_extensions)?;
    if content.len() > options.max_upload_bytes {
        return Err(PipelineError::FileTooLarge {
            size: content.len(),
            limit: options.max_upload_bytes,
        });
    }

    let table = validate_header(content, &REQUIRED_COLUMNS)?;
    let parsed = parse_records(&table)?;
    let dataset = NewDataset::new(filename, uploaded_at, parsed.records)?;

    Ok(IngestedUpload {
        dataset,
        rejections: parsed.rejections,
    })
}

fn check_extension(filename: &str, allowed: &[String]) -> PipelineResult<()> {
    let ext = Path::new(filename).extension().and_then(|s| s.to_str());
    match ext {
        Some(ext) if allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)) => Ok(()),
        _ => Err(PipelineError::UnsupportedExtension {
            filename: filename.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{check_extension, ingest_upload};
    use crate::config::PipelineOptions;
    use crate::error::PipelineError;

    #[test]
    fn extension_check_is_case_insensitive() {
        let allowed = vec!["csv".to_string()];
        assert!(check_extension("DATA.CSV", &allowed).is_ok());
        assert!(check_extension("data.csv", &allowed).is_ok());
        assert!(check_extension("data.xlsx", &allowed).is_err());
        assert!(check_extension("csv", &allowed).is_err());
    }

    #[test]
    fn oversized_upload_is_refused_before_parsing() {
        let opts = PipelineOptions {
            max_upload_bytes: 8,
            ..Default::default()
        };
        let err = ingest_upload("big.csv", b"not even a header but long", &opts).unwrap_err();
        assert!(matches!(err, PipelineError::FileTooLarge { size: 26, limit: 8 }));
    }
}
