//! Pipeline configuration.
//!
//! [`PipelineOptions::default`] matches the behavior of the hosted service: a five-entry
//! history, a 10 MiB upload limit, `.csv` uploads only and 20 records per report page.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::ingestion::{UploadObserver, UploadSeverity};

/// Default number of datasets kept in history.
pub const DEFAULT_HISTORY_CAP: usize = 5;
/// Default upload size limit (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
/// Default number of records per report page.
pub const DEFAULT_ROWS_PER_PAGE: usize = 20;

/// Options shared by the upload pipeline, the retention store and the report composer.
#[derive(Clone)]
pub struct PipelineOptions {
    /// Maximum number of retained datasets. Values below 1 are treated as 1.
    pub history_cap: usize,
    /// Uploads larger than this are refused before parsing.
    pub max_upload_bytes: usize,
    /// Accepted file extensions (case-insensitive, without the dot).
    pub allowed_extensions: Vec<String>,
    /// Records per page in the report's records table. Values below 1 are treated as 1.
    pub rows_per_page: usize,
    /// Optional observer for upload logging/alerts.
    pub observer: Option<Arc<dyn UploadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: UploadSeverity,
}

impl fmt::Debug for PipelineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineOptions")
            .field("history_cap", &self.history_cap)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("allowed_extensions", &self.allowed_extensions)
            .field("rows_per_page", &self.rows_per_page)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            history_cap: DEFAULT_HISTORY_CAP,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: vec!["csv".to_string()],
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            observer: None,
            alert_at_or_above: UploadSeverity::Critical,
        }
    }
}

impl PipelineOptions {
    /// Defaults overlaid with `EQUIPMENT_HISTORY_CAP`, `EQUIPMENT_MAX_UPLOAD_BYTES` and
    /// `EQUIPMENT_ROWS_PER_PAGE` from the process environment.
    ///
    /// Unparseable values are ignored (with a warning).
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Some(v) = env_parse("EQUIPMENT_HISTORY_CAP") {
            opts.history_cap = v;
        }
        if let Some(v) = env_parse("EQUIPMENT_MAX_UPLOAD_BYTES") {
            opts.max_upload_bytes = v;
        }
        if let Some(v) = env_parse("EQUIPMENT_ROWS_PER_PAGE") {
            opts.rows_per_page = v;
        }
        opts
    }

    /// Builder-style helper to attach an observer.
    pub fn with_observer(mut self, observer: Arc<dyn UploadObserver>) -> Self {
        self.observer = Some(observer);
        self
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable configuration value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PipelineOptions, env_parse};

    #[test]
    fn defaults_match_hosted_service() {
        let opts = PipelineOptions::default();
        assert_eq!(opts.history_cap, 5);
        assert_eq!(opts.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(opts.allowed_extensions, vec!["csv".to_string()]);
        assert_eq!(opts.rows_per_page, 20);
        assert!(opts.observer.is_none());
    }

    #[test]
    fn env_parse_ignores_missing_keys() {
        assert_eq!(env_parse::<usize>("EQUIPMENT_TEST_KEY_THAT_IS_NEVER_SET"), None);
    }
}
