//! Read outcome reporting.
//!
//! Besides success and failure, a read can succeed and still look wrong: a delimited file that
//! collapsed into one column, an XML document that failed its schema, continuation pages whose
//! first data row became a header. Those are reported as [`ReadFinding`]s.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::error::FormatError;
use crate::validation::Verdict;

use super::unified::ReadFormat;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ReadSeverity {
    /// Informational event.
    Info,
    /// The read succeeded but the result is suspect.
    Warning,
    /// The read failed on the content.
    Error,
    /// The read failed on I/O or transport.
    Critical,
}

/// Context about a read attempt.
#[derive(Debug, Clone)]
pub struct ReadContext {
    /// The input path.
    pub path: PathBuf,
    /// Format used for the read.
    pub format: ReadFormat,
}

impl fmt::Display for ReadContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}", self.format, self.path.display())
    }
}

/// What a successful read produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadStats {
    /// Records read (summed over pages/tables; triples for a graph).
    pub rows: usize,
    /// Tables produced: pages for paginated text, tables for DOCX, one for a single table.
    pub tables: usize,
    /// Schema verdict of an XML read with a schema.
    pub verdict: Option<Verdict>,
}

/// A successful read whose result is probably not what the caller wanted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReadFinding {
    /// Every line landed in one column that still contains `;`, tab or `|`.
    SuspectedDelimiterMismatch {
        /// Rows in the collapsed table.
        rows: usize,
    },
    /// The XML document did not conform to the schema it was read with.
    SchemaViolation,
    /// Per-page read where later pages took a data row as their header.
    DataRowsTakenAsHeaders {
        /// Pages whose header differs from the first page's.
        pages: usize,
    },
}

impl ReadFinding {
    /// Findings never fail a read.
    pub fn severity(&self) -> ReadSeverity {
        ReadSeverity::Warning
    }
}

impl fmt::Display for ReadFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadFinding::SuspectedDelimiterMismatch { rows } => {
                write!(f, "{rows} rows in one column holding a delimiter; wrong delimiter?")
            }
            ReadFinding::SchemaViolation => f.write_str("document is not valid against its schema"),
            ReadFinding::DataRowsTakenAsHeaders { pages } => {
                write!(f, "{pages} continuation pages used a data row as header; stitch the pages")
            }
        }
    }
}

/// Observer interface for read outcomes.
pub trait ReadObserver: Send + Sync {
    /// Called when a read succeeds.
    fn on_success(&self, _ctx: &ReadContext, _stats: ReadStats) {}

    /// Called after [`Self::on_success`] for each suspect trait of the result.
    fn on_finding(&self, _ctx: &ReadContext, _finding: &ReadFinding) {}

    /// Called when a read fails.
    fn on_failure(&self, _ctx: &ReadContext, _severity: ReadSeverity, _error: &FormatError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &ReadContext, severity: ReadSeverity, error: &FormatError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ReadObserver>>,
}

impl CompositeObserver {
    /// Create a composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn ReadObserver>>) -> Self {
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

impl ReadObserver for CompositeObserver {
    fn on_success(&self, ctx: &ReadContext, stats: ReadStats) {
        self.observers.iter().for_each(|o| o.on_success(ctx, stats));
    }

    fn on_finding(&self, ctx: &ReadContext, finding: &ReadFinding) {
        self.observers.iter().for_each(|o| o.on_finding(ctx, finding));
    }

    fn on_failure(&self, ctx: &ReadContext, severity: ReadSeverity, error: &FormatError) {
        self.observers.iter().for_each(|o| o.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &ReadContext, severity: ReadSeverity, error: &FormatError) {
        self.observers.iter().for_each(|o| o.on_alert(ctx, severity, error));
    }
}

/// Emits read events as `tracing` events under the `machine_readable_data::read` target.
///
/// Successes are `info`, findings and failures `warn` (`error` for [`ReadSeverity::Critical`]),
/// alerts `error`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl ReadObserver for TracingObserver {
    fn on_success(&self, ctx: &ReadContext, stats: ReadStats) {
        tracing::info!(
            target: "machine_readable_data::read",
            format = ?ctx.format,
            path = %ctx.path.display(),
            rows = stats.rows,
            tables = stats.tables,
            verdict = ?stats.verdict,
            "read succeeded"
        );
    }

    fn on_finding(&self, ctx: &ReadContext, finding: &ReadFinding) {
        tracing::warn!(
            target: "machine_readable_data::read",
            format = ?ctx.format,
            path = %ctx.path.display(),
            %finding,
            "read result is suspect"
        );
    }

    fn on_failure(&self, ctx: &ReadContext, severity: ReadSeverity, error: &FormatError) {
        if severity >= ReadSeverity::Critical {
            tracing::error!(
                target: "machine_readable_data::read",
                format = ?ctx.format,
                path = %ctx.path.display(),
                ?severity,
                %error,
                "read failed"
            );
        } else {
            tracing::warn!(
                target: "machine_readable_data::read",
                format = ?ctx.format,
                path = %ctx.path.display(),
                ?severity,
                %error,
                "read failed"
            );
        }
    }

    fn on_alert(&self, ctx: &ReadContext, severity: ReadSeverity, error: &FormatError) {
        tracing::error!(
            target: "machine_readable_data::read",
            format = ?ctx.format,
            path = %ctx.path.display(),
            ?severity,
            %error,
            alert = true,
            "read failed"
        );
    }
}

/// One line of a [`JsonLinesObserver`] log.
#[derive(Debug, Serialize)]
struct LogLine<'a> {
    ts: u64,
    event: &'a str,
    format: ReadFormat,
    path: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<ReadStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    finding: Option<&'a ReadFinding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    severity: Option<ReadSeverity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> LogLine<'a> {
    fn new(event: &'a str, ctx: &'a ReadContext) -> Self {
        Self {
            ts: unix_ts(),
            event,
            format: ctx.format,
            path: &ctx.path,
            stats: None,
            finding: None,
            severity: None,
            error: None,
        }
    }
}

/// Appends one JSON object per read event to a log file, for audit trails over batch reads.
///
/// Writes are best-effort; failures to open or write the log are ignored.
#[derive(Debug)]
pub struct JsonLinesObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonLinesObserver {
    /// Append events to `path`, creating it if needed.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append(&self, line: &LogLine<'_>) {
        let Ok(json) = serde_json::to_string(line) else {
            return;
        };
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{json}");
        }
    }
}

impl ReadObserver for JsonLinesObserver {
    fn on_success(&self, ctx: &ReadContext, stats: ReadStats) {
        self.append(&LogLine {
            stats: Some(stats),
            ..LogLine::new("read", ctx)
        });
    }

    fn on_finding(&self, ctx: &ReadContext, finding: &ReadFinding) {
        self.append(&LogLine {
            finding: Some(finding),
            severity: Some(finding.severity()),
            ..LogLine::new("finding", ctx)
        });
    }

    fn on_failure(&self, ctx: &ReadContext, severity: ReadSeverity, error: &FormatError) {
        self.append(&LogLine {
            severity: Some(severity),
            error: Some(error.to_string()),
            ..LogLine::new("failure", ctx)
        });
    }

    fn on_alert(&self, ctx: &ReadContext, severity: ReadSeverity, error: &FormatError) {
        self.append(&LogLine {
            severity: Some(severity),
            error: Some(error.to_string()),
            ..LogLine::new("alert", ctx)
        });
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
