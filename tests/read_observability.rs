use std::sync::{Arc, Mutex};

use machine_readable_data::ingestion::{
    read_from_path, CompositeObserver, JsonLinesObserver, ReadContext, ReadFinding, ReadFormat, ReadObserver,
    ReadOptions, ReadSeverity, ReadStats, XmlOptions,
};
use machine_readable_data::validation::{SchemaDescriptor, Verdict};
use machine_readable_data::FormatError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<usize>>,
    stats: Mutex<Vec<ReadStats>>,
    findings: Mutex<Vec<ReadFinding>>,
    failures: Mutex<Vec<ReadSeverity>>,
    alerts: Mutex<Vec<ReadSeverity>>,
}

impl ReadObserver for RecordingObserver {
    fn on_success(&self, _ctx: &ReadContext, stats: ReadStats) {
        self.successes.lock().unwrap().push(stats.rows);
        self.stats.lock().unwrap().push(stats);
    }

    fn on_finding(&self, _ctx: &ReadContext, finding: &ReadFinding) {
        self.findings.lock().unwrap().push(finding.clone());
    }

    fn on_failure(&self, _ctx: &ReadContext, severity: ReadSeverity, _error: &FormatError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &ReadContext, severity: ReadSeverity, _error: &FormatError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

#[test]
fn observer_receives_failure_and_alert_on_critical_io_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = ReadOptions {
        format: Some(ReadFormat::Csv),
        observer: Some(obs.clone()),
        alert_at_or_above: ReadSeverity::Critical,
        ..Default::default()
    };

    // Missing file -> Io error -> Critical
    let _ = read_from_path("tests/fixtures/does_not_exist.csv", &opts).unwrap_err();

    let failures = obs.failures.lock().unwrap().clone();
    let alerts = obs.alerts.lock().unwrap().clone();
    assert_eq!(failures, vec![ReadSeverity::Critical]);
    assert_eq!(alerts, vec![ReadSeverity::Critical]);
}

#[test]
fn observer_receives_failure_without_alert_for_non_critical_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = ReadOptions {
        format: Some(ReadFormat::Json),
        observer: Some(obs.clone()),
        alert_at_or_above: ReadSeverity::Critical,
        ..Default::default()
    };

    // A CSV file is not JSON -> Error severity (not Critical) -> should not alert
    let _ = read_from_path("tests/fixtures/occurrences.csv", &opts).unwrap_err();

    let failures = obs.failures.lock().unwrap().clone();
    assert_eq!(failures, vec![ReadSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn alert_threshold_can_be_lowered() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = ReadOptions {
        format: Some(ReadFormat::Json),
        observer: Some(obs.clone()),
        alert_at_or_above: ReadSeverity::Error,
        ..Default::default()
    };

    let _ = read_from_path("tests/fixtures/occurrences.csv", &opts).unwrap_err();
    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![ReadSeverity::Error]);
}

#[test]
fn observer_receives_success_with_row_count() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = ReadOptions {
        observer: Some(obs.clone()),
        ..Default::default()
    };

    let out = read_from_path("tests/fixtures/occurrences.csv", &opts).unwrap();
    assert_eq!(out.row_count(), 3);
    assert_eq!(obs.successes.lock().unwrap().clone(), vec![3]);
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn composite_and_json_lines_observers_fan_out() {
    let log = std::env::temp_dir().join(format!(
        "machine-readable-data-observer-{}.jsonl",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let recording = Arc::new(RecordingObserver::default());
    let composite = CompositeObserver::new(vec![recording.clone(), Arc::new(JsonLinesObserver::new(&log))]);
    let opts = ReadOptions {
        observer: Some(Arc::new(composite)),
        ..Default::default()
    };

    read_from_path("tests/fixtures/occurrences.tsv", &opts).unwrap();
    let _ = read_from_path("tests/fixtures/missing.tsv", &opts).unwrap_err();

    assert_eq!(recording.successes.lock().unwrap().clone(), vec![3]);
    assert_eq!(recording.failures.lock().unwrap().clone(), vec![ReadSeverity::Critical]);

    let written = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<serde_json::Value> = written.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["event"], "read");
    assert_eq!(lines[0]["format"], "Tsv");
    assert_eq!(lines[0]["stats"]["rows"], 3);
    assert_eq!(lines[0]["stats"]["tables"], 1);
    assert_eq!(lines[1]["event"], "failure");
    assert_eq!(lines[1]["severity"], "Critical");
    assert_eq!(lines[2]["event"], "alert");
    let _ = std::fs::remove_file(&log);
}

#[test]
fn single_column_read_with_a_foreign_delimiter_is_a_finding() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = ReadOptions {
        observer: Some(obs.clone()),
        ..Default::default()
    };

    let out = read_from_path("tests/fixtures/occurrences_semicolon.csv", &opts).unwrap();
    let findings = obs.findings.lock().unwrap().clone();
    assert_eq!(
        findings,
        vec![ReadFinding::SuspectedDelimiterMismatch { rows: out.row_count() }]
    );
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn schema_violation_is_reported_with_the_verdict() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = ReadOptions {
        observer: Some(obs.clone()),
        xml: XmlOptions {
            schema: Some(SchemaDescriptor::from_path("tests/fixtures/occurrences.xsd").unwrap()),
            ..Default::default()
        },
        ..Default::default()
    };

    read_from_path("tests/fixtures/occurrences_missing.xml", &opts).unwrap();
    assert_eq!(obs.stats.lock().unwrap()[0].verdict, Some(Verdict::NotValid));
    assert_eq!(obs.findings.lock().unwrap().clone(), vec![ReadFinding::SchemaViolation]);

    read_from_path("tests/fixtures/occurrences.xml", &opts).unwrap();
    assert_eq!(obs.stats.lock().unwrap()[1].verdict, Some(Verdict::Valid));
    assert_eq!(obs.findings.lock().unwrap().len(), 1);
}

#[test]
fn per_page_read_reports_pages_and_consumed_rows() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = ReadOptions {
        observer: Some(obs.clone()),
        ..Default::default()
    };

    read_from_path("tests/fixtures/occurrences.txt", &opts).unwrap();
    let stats = obs.stats.lock().unwrap()[0];
    assert_eq!(stats.tables, 3);
    assert_eq!(stats.rows, 3);
    assert_eq!(
        obs.findings.lock().unwrap().clone(),
        vec![ReadFinding::DataRowsTakenAsHeaders { pages: 2 }]
    );
}
