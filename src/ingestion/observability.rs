use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;

use crate::error::PipelineError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UploadSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (the upload was refused).
    Error,
    /// Critical error (I/O or other infrastructure failures).
    Critical,
}

impl UploadSeverity {
    /// Severity for a failed upload.
    pub fn for_error(err: &PipelineError) -> Self {
        match err.kind() {
            crate::error::ErrorKind::Internal => Self::Critical,
            _ => Self::Error,
        }
    }
}

/// Context about an upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadContext {
    /// File name as supplied by the client.
    pub filename: String,
    /// Size of the uploaded content in bytes.
    pub size: usize,
}

/// Row counts reported on a successful upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadStats {
    /// Rows turned into records.
    pub accepted: usize,
    /// Rows dropped by the record parser.
    pub rejected: usize,
}

/// Observer interface for upload outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait UploadObserver: Send + Sync {
    /// Called when an upload is parsed successfully.
    fn on_success(&self, _ctx: &UploadContext, _stats: UploadStats) {}

    /// Called when an upload is refused.
    fn on_failure(&self, _ctx: &UploadContext, _severity: UploadSeverity, _error: &PipelineError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &PipelineError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Fans callbacks out to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn UploadObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn UploadObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl UploadObserver for CompositeObserver {
    fn on_success(&self, ctx: &UploadContext, stats: UploadStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &UploadContext, severity: UploadSeverity, error: &PipelineError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &PipelineError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Forwards upload events to `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl UploadObserver for TracingObserver {
    fn on_success(&self, ctx: &UploadContext, stats: UploadStats) {
        tracing::info!(
            filename = %ctx.filename,
            bytes = ctx.size,
            accepted = stats.accepted,
            rejected = stats.rejected,
            "upload parsed"
        );
    }

    fn on_failure(&self, ctx: &UploadContext, severity: UploadSeverity, error: &PipelineError) {
        tracing::warn!(filename = %ctx.filename, ?severity, kind = error.kind().as_str(), "upload refused: {error}");
    }

    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &PipelineError) {
        tracing::error!(filename = %ctx.filename, ?severity, "upload alert: {error}");
    }
}

/// Logs upload events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl UploadObserver for StdErrObserver {
    fn on_success(&self, ctx: &UploadContext, stats: UploadStats) {
        eprintln!(
            "[upload][ok] file={} bytes={} accepted={} rejected={}",
            ctx.filename, ctx.size, stats.accepted, stats.rejected
        );
    }

    fn on_failure(&self, ctx: &UploadContext, severity: UploadSeverity, error: &PipelineError) {
        eprintln!("[upload][{severity:?}] file={} err={error}", ctx.filename);
    }

    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &PipelineError) {
        eprintln!("[ALERT][upload][{severity:?}] file={} err={error}", ctx.filename);
    }
}

/// Appends upload events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are logged and dropped.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock();
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| writeln!(f, "{} {line}", Utc::now().to_rfc3339()));
        if let Err(e) = written {
            tracing::debug!(path = %self.path.display(), "upload log write failed: {e}");
        }
    }
}

impl UploadObserver for FileObserver {
    fn on_success(&self, ctx: &UploadContext, stats: UploadStats) {
        self.append_line(&format!(
            "ok file={} bytes={} accepted={} rejected={}",
            ctx.filename, ctx.size, stats.accepted, stats.rejected
        ));
    }

    fn on_failure(&self, ctx: &UploadContext, severity: UploadSeverity, error: &PipelineError) {
        self.append_line(&format!(
            "fail severity={severity:?} file={} err={error}",
            ctx.filename
        ));
    }

    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &PipelineError) {
        self.append_line(&format!(
            "ALERT severity={severity:?} file={} err={error}",
            ctx.filename
        ));
    }
}
