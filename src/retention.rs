//! Bounded dataset history.
//!
//! [`RetentionManager`] owns the stored datasets and an index ordered by upload time. After
//! every completed insert it holds at most `cap` datasets; older ones are evicted
//! oldest-first. Equal timestamps are ordered by insertion sequence (earlier insert = older).
//!
//! All mutations (insert with its evictions, delete) run under one write lock, so readers
//! never observe a half-evicted history. Readers get `Arc` snapshots and may render or
//! serialize them without holding the lock.

use std::cmp::Reverse;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::config::DEFAULT_HISTORY_CAP;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{Dataset, DatasetId, NewDataset};

/// Result of [`RetentionManager::insert`].
#[derive(Debug, Clone)]
pub struct InsertOutcome {
    /// The dataset just stored, with its assigned id.
    pub dataset: Arc<Dataset>,
    /// Ids evicted to keep the history within its cap, oldest first.
    pub evicted: Vec<DatasetId>,
}

#[derive(Debug)]
struct History {
    next_id: DatasetId,
    next_sequence: u64,
    /// Most recent first.
    entries: Vec<Arc<Dataset>>,
}

fn order_key(ds: &Dataset) -> Reverse<(DateTime<Utc>, u64)> {
    Reverse((ds.uploaded_at(), ds.sequence()))
}

/// In-memory dataset store with a bounded, upload-time ordered history.
#[derive(Debug)]
pub struct RetentionManager {
    cap: usize,
    inner: RwLock<History>,
}

impl Default for RetentionManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP)
    }
}

impl RetentionManager {
    /// Create an empty store keeping at most `cap` datasets (minimum 1).
    pub fn new(cap: usize) -> Self {
        Self {
            cap: cap.max(1),
            inner: RwLock::new(History {
                next_id: 1,
                next_sequence: 0,
                entries: Vec::new(),
            }),
        }
    }

    /// Maximum number of retained datasets.
    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Store `dataset` and evict the oldest entries beyond the cap.
    ///
    /// The dataset being inserted is never evicted, even if its timestamp is older than every
    /// retained entry.
    pub fn insert(&self, dataset: NewDataset) -> InsertOutcome {
        let mut history = self.inner.write();

        let id = history.next_id;
        let sequence = history.next_sequence;
        history.next_id += 1;
        history.next_sequence += 1;

        let stored = Arc::new(dataset.into_stored(id, sequence));
        let key = order_key(&stored);
        let pos = history
            .entries
            .partition_point(|e| order_key(e) < key);
        history.entries.insert(pos, Arc::clone(&stored));

        let mut evicted = Vec::new();
        while history.entries.len() > self.cap {
            let Some(idx) = history.entries.iter().rposition(|e| e.id() != id) else {
                break;
            };
            let gone = history.entries.remove(idx);
            tracing::info!(
                dataset_id = gone.id(),
                filename = gone.filename(),
                records = gone.total_records(),
                "evicted dataset from history"
            );
            evicted.push(gone.id());
        }

        tracing::info!(
            dataset_id = id,
            filename = stored.filename(),
            records = stored.total_records(),
            retained = history.entries.len(),
            "stored dataset"
        );

        InsertOutcome {
            dataset: stored,
            evicted,
        }
    }

    /// All retained datasets, most recent first.
    pub fn list(&self) -> Vec<Arc<Dataset>> {
        self.inner.read().entries.clone()
    }

    /// The dataset with `id`, or [`PipelineError::NotFound`].
    pub fn get(&self, id: DatasetId) -> PipelineResult<Arc<Dataset>> {
        self.inner
            .read()
            .entries
            .iter()
            .find(|e| e.id() == id)
            .cloned()
            .ok_or(PipelineError::NotFound { id })
    }

    /// Remove the dataset with `id`, returning it. Absent ids are [`PipelineError::NotFound`].
    pub fn delete(&self, id: DatasetId) -> PipelineResult<Arc<Dataset>> {
        let mut history = self.inner.write();
        let idx = history
            .entries
            .iter()
            .position(|e| e.id() == id)
            .ok_or(PipelineError::NotFound { id })?;
        let removed = history.entries.remove(idx);
        tracing::info!(dataset_id = id, filename = removed.filename(), "deleted dataset");
        Ok(removed)
    }
}
