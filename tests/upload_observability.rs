use std::sync::{Arc, Mutex};

use equipment_analytics::PipelineError;
use equipment_analytics::config::PipelineOptions;
use equipment_analytics::ingestion::{
    CompositeObserver, FileObserver, UploadContext, UploadObserver, UploadSeverity, UploadStats, ingest_from_path,
};

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<UploadStats>>,
    failures: Mutex<Vec<UploadSeverity>>,
    alerts: Mutex<Vec<UploadSeverity>>,
}

impl UploadObserver for RecordingObserver {
    fn on_success(&self, _ctx: &UploadContext, stats: UploadStats) {
        self.successes.lock().unwrap().push(stats);
    }

    fn on_failure(&self, _ctx: &UploadContext, severity: UploadSeverity, _error: &PipelineError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &UploadContext, severity: UploadSeverity, _error: &PipelineError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn opts_with(obs: Arc<RecordingObserver>) -> PipelineOptions {
    PipelineOptions {
        observer: Some(obs),
        alert_at_or_above: UploadSeverity::Critical,
        ..Default::default()
    }
}

#[test]
fn observer_receives_failure_and_alert_on_critical_io_error() {
    let obs = Arc::new(RecordingObserver::default());

    let _ = ingest_from_path("tests/fixtures/does_not_exist.csv", &opts_with(obs.clone())).unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![UploadSeverity::Critical]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![UploadSeverity::Critical]);
    assert!(obs.successes.lock().unwrap().is_empty());
}

#[test]
fn observer_receives_failure_without_alert_for_rejected_upload() {
    let obs = Arc::new(RecordingObserver::default());

    let _ = ingest_from_path("tests/fixtures/missing_pressure.csv", &opts_with(obs.clone())).unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![UploadSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn observer_receives_row_counts_on_success() {
    let obs = Arc::new(RecordingObserver::default());

    ingest_from_path("tests/fixtures/bad_flowrate.csv", &opts_with(obs.clone())).unwrap();

    assert_eq!(
        *obs.successes.lock().unwrap(),
        vec![UploadStats {
            accepted: 7,
            rejected: 3
        }]
    );
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn alert_threshold_can_be_lowered() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = PipelineOptions {
        alert_at_or_above: UploadSeverity::Error,
        ..opts_with(obs.clone())
    };

    let _ = ingest_from_path("tests/fixtures/all_invalid.csv", &opts).unwrap_err();

    assert_eq!(*obs.alerts.lock().unwrap(), vec![UploadSeverity::Error]);
}

#[test]
fn composite_and_file_observers_fan_out() {
    let log_path = std::env::temp_dir().join(format!("equipment-upload-{}.log", std::process::id()));
    let _ = std::fs::remove_file(&log_path);

    let recording = Arc::new(RecordingObserver::default());
    let observers: Vec<Arc<dyn UploadObserver>> = vec![
        recording.clone() as Arc<dyn UploadObserver>,
        Arc::new(FileObserver::new(&log_path)),
    ];
    let composite = CompositeObserver::new(observers);
    let opts = PipelineOptions {
        observer: Some(Arc::new(composite)),
        ..Default::default()
    };

    ingest_from_path("tests/fixtures/equipment.csv", &opts).unwrap();
    let _ = ingest_from_path("tests/fixtures/missing_pressure.csv", &opts).unwrap_err();

    assert_eq!(recording.successes.lock().unwrap().len(), 1);
    assert_eq!(recording.failures.lock().unwrap().len(), 1);

    let log = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("ok file=equipment.csv"));
    assert!(lines[0].contains("accepted=10 rejected=0"));
    assert!(lines[1].contains("fail severity=Error file=missing_pressure.csv"));
    assert!(lines[1].contains("missing required columns: Pressure"));

    let _ = std::fs::remove_file(&log_path);
}
