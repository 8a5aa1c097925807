use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::ErrorKind;
use crate::types::DatasetId;

/// Execution events emitted by the engine.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted { reports: usize },
    ThrottleWaited { duration: Duration },
    ReportStarted { dataset_id: DatasetId },
    ReportFinished { dataset_id: DatasetId, bytes: usize },
    ReportFailed { dataset_id: DatasetId, kind: ErrorKind },
    RunFinished {
        elapsed: Duration,
        metrics: ExecutionMetricsSnapshot,
    },
}

/// Observer hook for execution events.
pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// Logs execution events through `tracing` at debug level.
#[derive(Debug, Default)]
pub struct TracingExecutionObserver;

impl ExecutionObserver for TracingExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        match event {
            ExecutionEvent::ReportFailed { dataset_id, kind } => {
                tracing::warn!(dataset_id, kind = kind.as_str(), "report failed");
            }
            ExecutionEvent::RunFinished { metrics, .. } => tracing::info!("report run finished: {metrics}"),
            other => tracing::debug!(event = ?other, "report execution"),
        }
    }
}

/// Real-time metrics for a batch rendering run.
///
/// The engine updates these counters during execution; callers can snapshot them at any time.
pub struct ExecutionMetrics {
    run_id: AtomicU64,
    elapsed_ns: AtomicU64,

    reports_rendered: AtomicU64,
    reports_failed: AtomicU64,
    bytes_rendered: AtomicU64,
    throttle_wait_ns: AtomicU64,

    active_reports: AtomicUsize,
    max_active_reports: AtomicUsize,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self {
            run_id: AtomicU64::new(0),
            elapsed_ns: AtomicU64::new(0),
            reports_rendered: AtomicU64::new(0),
            reports_failed: AtomicU64::new(0),
            bytes_rendered: AtomicU64::new(0),
            throttle_wait_ns: AtomicU64::new(0),
            active_reports: AtomicUsize::new(0),
            max_active_reports: AtomicUsize::new(0),
        }
    }

    pub fn begin_run(&self) {
        let _ = self.run_id.fetch_add(1, Ordering::SeqCst);
        self.elapsed_ns.store(0, Ordering::SeqCst);
        self.reports_rendered.store(0, Ordering::SeqCst);
        self.reports_failed.store(0, Ordering::SeqCst);
        self.bytes_rendered.store(0, Ordering::SeqCst);
        self.throttle_wait_ns.store(0, Ordering::SeqCst);
        self.active_reports.store(0, Ordering::SeqCst);
        self.max_active_reports.store(0, Ordering::SeqCst);
    }

    pub fn end_run(&self, elapsed: Duration) {
        self.elapsed_ns
            .store(elapsed.as_nanos().min(u64::MAX as u128) as u64, Ordering::SeqCst);
    }

    pub fn on_report_start(&self) {
        let now = self.active_reports.fetch_add(1, Ordering::SeqCst) + 1;
        update_max_usize(&self.max_active_reports, now);
    }

    pub fn on_report_end(&self, rendered_bytes: Option<usize>) {
        let _ = self.active_reports.fetch_sub(1, Ordering::SeqCst);
        match rendered_bytes {
            Some(n) => {
                let _ = self.reports_rendered.fetch_add(1, Ordering::SeqCst);
                let _ = self.bytes_rendered.fetch_add(n as u64, Ordering::SeqCst);
            }
            None => {
                let _ = self.reports_failed.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    pub fn on_throttle_wait(&self, d: Duration) {
        let add = d.as_nanos().min(u64::MAX as u128) as u64;
        let _ = self.throttle_wait_ns.fetch_add(add, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ExecutionMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        let elapsed = if elapsed_ns > 0 {
            Some(Duration::from_nanos(elapsed_ns))
        } else {
            None
        };

        ExecutionMetricsSnapshot {
            run_id: self.run_id.load(Ordering::SeqCst),
            elapsed,
            reports_rendered: self.reports_rendered.load(Ordering::SeqCst),
            reports_failed: self.reports_failed.load(Ordering::SeqCst),
            bytes_rendered: self.bytes_rendered.load(Ordering::SeqCst),
            throttle_wait: Duration::from_nanos(self.throttle_wait_ns.load(Ordering::SeqCst)),
            max_active_reports: self.max_active_reports.load(Ordering::SeqCst),
        }
    }
}

impl Default for ExecutionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn update_max_usize(dst: &AtomicUsize, now: usize) {
    loop {
        let cur = dst.load(Ordering::SeqCst);
        if now <= cur {
            break;
        }
        if dst
            .compare_exchange(cur, now, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            break;
        }
    }
}

/// Immutable snapshot of [`ExecutionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetricsSnapshot {
    pub run_id: u64,
    pub elapsed: Option<Duration>,
    pub reports_rendered: u64,
    pub reports_failed: u64,
    pub bytes_rendered: u64,
    pub throttle_wait: Duration,
    pub max_active_reports: usize,
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={}, rendered={}, failed={}, bytes={}, max_active={}, throttle_wait={:?}, elapsed={:?}",
            self.run_id,
            self.reports_rendered,
            self.reports_failed,
            self.bytes_rendered,
            self.max_active_reports,
            self.throttle_wait,
            self.elapsed
        )
    }
}
