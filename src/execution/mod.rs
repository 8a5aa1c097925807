//! Parallel report rendering.
//!
//! Report generation has no shared mutable state, so many reports can be rendered at once.
//! [`ExecutionEngine`] does this on a dedicated rayon pool with:
//!
//! - a cap on concurrently rendered reports (on top of the pool size)
//! - real-time metrics + observer hooks for monitoring
//!
//! Each dataset is fetched from the store as an `Arc` snapshot, so rendering never holds the
//! store lock and concurrent uploads/deletes are not blocked.

mod observer;
mod semaphore;

use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::error::PipelineResult;
use crate::report::{RenderedReport, ReportComposer};
use crate::retention::RetentionManager;
use crate::types::DatasetId;

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver, TracingExecutionObserver,
};

use semaphore::Semaphore;

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Number of worker threads used by the engine.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Upper bound on reports rendered at the same time.
    pub max_in_flight: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self {
            num_threads: Some(n),
            max_in_flight: n.max(1),
        }
    }
}

/// Renders batches of reports in parallel.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine. `num_threads == Some(0)` and `max_in_flight == 0` are treated as 1.
    pub fn new(opts: ExecutionOptions) -> PipelineResult<Self> {
        let n_threads = opts
            .num_threads
            .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
            .max(1);

        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .thread_name(|i| format!("report-render-{i}"))
            .build()?;

        Ok(Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        })
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Render a report for every id in `ids`.
    ///
    /// Results are returned in the order of `ids`. Unknown ids yield
    /// [`crate::PipelineError::NotFound`] in their slot without affecting the others.
    pub fn render_reports(
        &self,
        store: &RetentionManager,
        composer: &ReportComposer,
        ids: &[DatasetId],
    ) -> Vec<PipelineResult<RenderedReport>> {
        self.pool.install(|| self.render_reports_impl(store, composer, ids))
    }

    fn render_reports_impl(
        &self,
        store: &RetentionManager,
        composer: &ReportComposer,
        ids: &[DatasetId],
    ) -> Vec<PipelineResult<RenderedReport>> {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted { reports: ids.len() });

        let sem = Semaphore::new(self.opts.max_in_flight);
        let results: Vec<PipelineResult<RenderedReport>> = ids
            .par_iter()
            .map(|&dataset_id| {
                let waited = sem.acquire();
                if waited > Duration::ZERO {
                    self.metrics.on_throttle_wait(waited);
                    self.emit(ExecutionEvent::ThrottleWaited { duration: waited });
                }

                self.metrics.on_report_start();
                self.emit(ExecutionEvent::ReportStarted { dataset_id });

                let result = store
                    .get(dataset_id)
                    .and_then(|ds| composer.compose_report(&ds));

                match &result {
                    Ok(report) => {
                        self.metrics.on_report_end(Some(report.bytes.len()));
                        self.emit(ExecutionEvent::ReportFinished {
                            dataset_id,
                            bytes: report.bytes.len(),
                        });
                    }
                    Err(e) => {
                        self.metrics.on_report_end(None);
                        self.emit(ExecutionEvent::ReportFailed {
                            dataset_id,
                            kind: e.kind(),
                        });
                    }
                }
                sem.release();
                result
            })
            .collect();

        self.metrics.end_run(start.elapsed());
        self.emit(ExecutionEvent::RunFinished {
            elapsed: start.elapsed(),
            metrics: self.metrics.snapshot(),
        });

        results
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(o) = &self.observer {
            o.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use parking_lot::Mutex;

    use super::{ExecutionEngine, ExecutionEvent, ExecutionObserver, ExecutionOptions};
    use crate::error::PipelineError;
    use crate::report::ReportComposer;
    use crate::retention::RetentionManager;
    use crate::types::{EquipmentRecord, NewDataset};

    #[derive(Default)]
    struct CollectingObserver {
        events: Mutex<Vec<ExecutionEvent>>,
    }

    impl ExecutionObserver for CollectingObserver {
        fn on_event(&self, event: &ExecutionEvent) {
            self.events.lock().push(event.clone());
        }
    }

    fn store_with(n: usize) -> (RetentionManager, Vec<u64>) {
        let store = RetentionManager::new(n);
        let ids = (0..n)
            .map(|i| {
                let ds = NewDataset::new(
                    format!("batch-{i}.csv"),
                    Utc::now(),
                    vec![EquipmentRecord::new(format!("E-{i}"), "Pump", 1.0, 2.0, 3.0)],
                )
                .unwrap();
                store.insert(ds).dataset.id()
            })
            .collect();
        (store, ids)
    }

    #[test]
    fn results_follow_input_order_and_missing_ids_fail_alone() {
        let (store, mut ids) = store_with(6);
        ids.insert(2, 999);
        let obs = Arc::new(CollectingObserver::default());
        let engine = ExecutionEngine::new(ExecutionOptions {
            num_threads: Some(3),
            max_in_flight: 2,
        })
        .unwrap()
        .with_observer(obs.clone());

        let results = engine.render_reports(&store, &ReportComposer::default(), &ids);
        assert_eq!(results.len(), 7);
        for (id, result) in ids.iter().zip(&results) {
            match result {
                Ok(report) => assert_eq!(report.filename, format!("chemflow_report_{id}.txt")),
                Err(e) => {
                    assert_eq!(*id, 999);
                    assert!(matches!(e, PipelineError::NotFound { id: 999 }));
                }
            }
        }

        let snap = engine.metrics().snapshot();
        assert_eq!(snap.reports_rendered, 6);
        assert_eq!(snap.reports_failed, 1);
        assert!(snap.max_active_reports <= 2);
        assert!(snap.elapsed.is_some());

        let events = obs.events.lock();
        assert!(matches!(events.first(), Some(ExecutionEvent::RunStarted { reports: 7 })));
        assert!(matches!(events.last(), Some(ExecutionEvent::RunFinished { .. })));
    }
}
