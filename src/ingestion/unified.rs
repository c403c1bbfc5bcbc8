//! Unified read entrypoint.
//!
//! Most callers should use [`read_from_path`], which picks the adapter for a file and returns
//! its output as a [`ReadOutput`].
//!
//! - If [`ReadOptions::format`] is `None`, the format is inferred from the file extension.
//! - If a [`super::observability::ReadObserver`] is provided, success, findings, failures and
//!   alerts are reported to it.

use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{FormatError, FormatResult};
use crate::types::{Record, RecordSet};
use crate::validation::Verdict;

use super::docx::{self, DocxContent};
use super::json::{self, JsonOptions, JsonOrient};
use super::observability::{ReadContext, ReadFinding, ReadObserver, ReadSeverity, ReadStats};
use super::paginated::{self, PaginatedOptions};
use super::rdf::{self, Graph};
use super::xml::{self, XmlOptions, XmlTable};
use super::{delimited, parquet, DelimitedOptions};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadFormat {
    /// Comma-separated values.
    Csv,
    /// Tab-separated values.
    Tsv,
    /// JSON array-of-objects, NDJSON, or a raw tree.
    Json,
    /// XML, one record per row element.
    Xml,
    /// Word document (paragraphs and tables).
    Docx,
    /// Paginated text layer (PDF-like).
    Paginated,
    /// RDF serializations.
    Rdf,
    /// Apache Parquet.
    Parquet,
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Excel,
}

impl ReadFormat {
    /// Parse a format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "tsv" | "tab" => Some(Self::Tsv),
            "json" | "ndjson" => Some(Self::Json),
            "xml" => Some(Self::Xml),
            "docx" => Some(Self::Docx),
            "txt" => Some(Self::Paginated),
            "ttl" | "nt" | "nq" | "trig" | "n3" | "rdf" | "owl" => Some(Self::Rdf),
            "parquet" | "pq" => Some(Self::Parquet),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// How to choose sheet(s) when reading an Excel workbook.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExcelSheetSelection {
    /// Read the first sheet (default).
    #[default]
    First,
    /// Read a single named sheet.
    Sheet(String),
    /// Read all sheets and concatenate rows.
    AllSheets,
    /// Read only the listed sheets (in order) and concatenate rows.
    Sheets(Vec<String>),
}

/// Options controlling a unified read.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct ReadOptions {
    /// If `None`, detect the format from the file extension.
    pub format: Option<ReadFormat>,
    /// CSV/TSV options.
    pub delimited: DelimitedOptions,
    /// JSON options.
    pub json: JsonOptions,
    /// XML options.
    pub xml: XmlOptions,
    /// Paginated text options.
    pub paginated: PaginatedOptions,
    /// Excel-specific options.
    pub excel_sheet_selection: ExcelSheetSelection,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn ReadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: ReadSeverity,
}

impl fmt::Debug for ReadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOptions")
            .field("format", &self.format)
            .field("delimited", &self.delimited)
            .field("json", &self.json)
            .field("xml", &self.xml)
            .field("paginated", &self.paginated)
            .field("excel_sheet_selection", &self.excel_sheet_selection)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            format: None,
            delimited: DelimitedOptions::default(),
            json: JsonOptions::default(),
            xml: XmlOptions::default(),
            paginated: PaginatedOptions::default(),
            excel_sheet_selection: ExcelSheetSelection::default(),
            observer: None,
            alert_at_or_above: ReadSeverity::Critical,
        }
    }
}

/// What an adapter produced.
#[derive(Debug, Clone)]
pub enum ReadOutput {
    /// One table (CSV, TSV, JSON records, Parquet, Excel).
    Records(RecordSet),
    /// One table per page (paginated text).
    Pages(Vec<RecordSet>),
    /// Paragraphs and tables (DOCX).
    Document(DocxContent),
    /// A raw JSON tree ([`JsonOrient::Raw`]).
    Tree(serde_json::Value),
    /// An RDF graph.
    Graph(Graph),
    /// XML records plus the optional verdict.
    Xml(XmlTable),
}

impl ReadOutput {
    /// Records across all tables; triples for a graph; top-level entries for a JSON tree.
    pub fn row_count(&self) -> usize {
        match self {
            ReadOutput::Records(rs) => rs.row_count(),
            ReadOutput::Pages(pages) => pages.iter().map(RecordSet::row_count).sum(),
            ReadOutput::Document(doc) => doc.tables.iter().map(RecordSet::row_count).sum(),
            ReadOutput::Tree(serde_json::Value::Array(items)) => items.len(),
            ReadOutput::Tree(serde_json::Value::Object(map)) => map.len(),
            ReadOutput::Tree(_) => 1,
            ReadOutput::Graph(g) => g.len(),
            ReadOutput::Xml(t) => t.records.row_count(),
        }
    }

    /// Tables held: pages, DOCX tables, or one for a single table. A tree or a graph has none.
    pub fn table_count(&self) -> usize {
        match self {
            ReadOutput::Records(_) | ReadOutput::Xml(_) => 1,
            ReadOutput::Pages(pages) => pages.len(),
            ReadOutput::Document(doc) => doc.tables.len(),
            ReadOutput::Tree(_) | ReadOutput::Graph(_) => 0,
        }
    }

    /// What an observer is told about this output.
    pub fn stats(&self) -> ReadStats {
        ReadStats {
            rows: self.row_count(),
            tables: self.table_count(),
            verdict: match self {
                ReadOutput::Xml(t) => t.verdict,
                _ => None,
            },
        }
    }

    /// The single table, if this output is one.
    pub fn into_records(self) -> Option<RecordSet> {
        match self {
            ReadOutput::Records(rs) => Some(rs),
            ReadOutput::Xml(t) => Some(t.records),
            _ => None,
        }
    }

    /// Flatten every record of every table, in order.
    pub fn all_records(&self) -> Vec<&Record> {
        let tables: Vec<&RecordSet> = match self {
            ReadOutput::Records(rs) => vec![rs],
            ReadOutput::Pages(pages) => pages.iter().collect(),
            ReadOutput::Document(doc) => doc.tables.iter().collect(),
            ReadOutput::Xml(t) => vec![&t.records],
            ReadOutput::Tree(_) | ReadOutput::Graph(_) => Vec::new(),
        };
        tables.into_iter().flat_map(|t| t.records()).collect()
    }
}

/// Unified read entry point for path-based sources.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with row, table and verdict stats
/// - `on_finding` after a success, for each suspect trait of the result
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```no_run
/// use machine_readable_data::ingestion::{read_from_path, ReadOptions};
///
/// # fn main() -> Result<(), machine_readable_data::FormatError> {
/// // Uses `.csv` to select the delimited adapter.
/// let out = read_from_path("occurrences.csv", &ReadOptions::default())?;
/// println!("rows={}", out.row_count());
/// # Ok(())
/// # }
/// ```
///
/// Semicolon-delimited files need the delimiter set explicitly; otherwise every line lands in one
/// column without an error:
///
/// ```no_run
/// use machine_readable_data::ingestion::{read_from_path, DelimitedOptions, ReadFormat, ReadOptions};
///
/// # fn main() -> Result<(), machine_readable_data::FormatError> {
/// let opts = ReadOptions {
///     format: Some(ReadFormat::Csv),
///     delimited: DelimitedOptions::with_delimiter(b';'),
///     ..Default::default()
/// };
/// let out = read_from_path("occurrences_semicolon.csv", &opts)?;
/// println!("rows={}", out.row_count());
/// # Ok(())
/// # }
/// ```
pub fn read_from_path(path: impl AsRef<Path>, options: &ReadOptions) -> FormatResult<ReadOutput> {
    let path = path.as_ref();
    let fmt = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };

    let ctx = ReadContext {
        path: path.to_path_buf(),
        format: fmt,
    };

    let result = match fmt {
        ReadFormat::Csv => delimited::read_csv_from_path(path, &options.delimited).map(ReadOutput::Records),
        ReadFormat::Tsv => delimited::read_tsv_from_path(path, &options.delimited).map(ReadOutput::Records),
        ReadFormat::Json => match options.json.orient {
            JsonOrient::Records => json::read_json_records_from_path(path).map(ReadOutput::Records),
            JsonOrient::Raw => json::load_json_from_path(path).map(ReadOutput::Tree),
        },
        ReadFormat::Xml => xml::read_xml_from_path(path, &options.xml).map(ReadOutput::Xml),
        ReadFormat::Docx => docx::read_docx_from_path(path).map(ReadOutput::Document),
        ReadFormat::Paginated => paginated::read_pages_from_path(path, &options.paginated).map(ReadOutput::Pages),
        ReadFormat::Rdf => rdf::read_graph_from_path(path).map(ReadOutput::Graph),
        ReadFormat::Parquet => parquet::read_parquet_from_path(path).map(ReadOutput::Records),
        ReadFormat::Excel => read_excel_dispatch(path, &options.excel_sheet_selection).map(ReadOutput::Records),
    };

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(out) => {
                obs.on_success(&ctx, out.stats());
                for finding in findings(fmt, out) {
                    obs.on_finding(&ctx, &finding);
                }
            }
            Err(e) => {
                let sev = severity_for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}

/// Suspect traits of a successful read.
fn findings(fmt: ReadFormat, out: &ReadOutput) -> Vec<ReadFinding> {
    let mut found = Vec::new();
    match out {
        ReadOutput::Records(rs)
            if matches!(fmt, ReadFormat::Csv | ReadFormat::Tsv) && delimited::suspected_delimiter_mismatch(rs) =>
        {
            found.push(ReadFinding::SuspectedDelimiterMismatch { rows: rs.row_count() });
        }
        ReadOutput::Xml(t) if t.verdict == Some(Verdict::NotValid) => {
            found.push(ReadFinding::SchemaViolation);
        }
        ReadOutput::Pages(pages) => {
            let first = pages.first().and_then(|p| p.header_row.as_deref());
            let taken = pages
                .iter()
                .skip(1)
                .filter(|p| !same_header(p.header_row.as_deref(), first))
                .count();
            if taken > 0 {
                found.push(ReadFinding::DataRowsTakenAsHeaders { pages: taken });
            }
        }
        _ => {}
    }
    found
}

fn same_header(a: Option<&[String]>, b: Option<&[String]>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.trim() == y.trim()),
        (None, None) => true,
        _ => false,
    }
}

fn severity_for_error(e: &FormatError) -> ReadSeverity {
    match e {
        FormatError::Io(_) => ReadSeverity::Critical,
        FormatError::Parquet(err) => {
            if error_chain_contains_io(err) {
                ReadSeverity::Critical
            } else {
                ReadSeverity::Error
            }
        }
        FormatError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => ReadSeverity::Critical,
            _ => ReadSeverity::Error,
        },
        FormatError::Zip(::zip::result::ZipError::Io(_)) => ReadSeverity::Critical,
        FormatError::Rdf(oxrdfio::RdfParseError::Io(_)) => ReadSeverity::Critical,
        #[cfg(feature = "remote")]
        FormatError::Http(_) => ReadSeverity::Critical,
        _ => ReadSeverity::Error,
    }
}

fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}

fn infer_format_from_path(path: &Path) -> FormatResult<ReadFormat> {
    let ext = path.extension().and_then(|s| s.to_str()).ok_or_else(|| {
        FormatError::schema_mismatch(format!(
            "cannot infer format: path has no extension ({})",
            path.display()
        ))
    })?;

    ReadFormat::from_extension(ext).ok_or_else(|| {
        FormatError::schema_mismatch(format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ))
    })
}

fn read_excel_dispatch(path: &Path, sel: &ExcelSheetSelection) -> FormatResult<RecordSet> {
    let _ = (path, sel);

    #[cfg(feature = "excel")]
    {
        use super::excel;

        match sel {
            ExcelSheetSelection::First => excel::read_excel_from_path(path, None),
            ExcelSheetSelection::Sheet(name) => excel::read_excel_from_path(path, Some(name.as_str())),
            ExcelSheetSelection::AllSheets => excel::read_excel_workbook_from_path(path, None),
            ExcelSheetSelection::Sheets(names) => {
                let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
                excel::read_excel_workbook_from_path(path, Some(refs.as_slice()))
            }
        }
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(FormatError::schema_mismatch(
            "excel reading not enabled (enable cargo feature 'excel')",
        ))
    }
}

/// An owned read request, for callers that queue reads.
#[derive(Debug, Clone)]
pub struct ReadRequest {
    /// Path to the input file.
    pub path: PathBuf,
    /// Options controlling the read.
    pub options: ReadOptions,
}

impl ReadRequest {
    /// Execute the request by calling [`read_from_path`].
    pub fn run(&self) -> FormatResult<ReadOutput> {
        read_from_path(&self.path, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_inference_covers_every_family() {
        assert_eq!(ReadFormat::from_extension("TSV"), Some(ReadFormat::Tsv));
        assert_eq!(ReadFormat::from_extension("txt"), Some(ReadFormat::Paginated));
        assert_eq!(ReadFormat::from_extension("ttl"), Some(ReadFormat::Rdf));
        assert_eq!(ReadFormat::from_extension("docx"), Some(ReadFormat::Docx));
        assert_eq!(ReadFormat::from_extension("pdf"), None);
    }

    #[test]
    fn missing_file_is_critical() {
        let err = FormatError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(severity_for_error(&err), ReadSeverity::Critical);
        assert_eq!(
            severity_for_error(&FormatError::schema_mismatch("x")),
            ReadSeverity::Error
        );
    }
}
