//! Extract → normalize → export as one owned request.

use std::path::PathBuf;

use crate::error::{FormatError, FormatResult};
use crate::export::{self, ExportOptions};
use crate::ingestion::{read_from_path, ReadOptions, ReadOutput};
use crate::normalize::{self, NormalizeOptions};
use crate::types::RecordSet;

/// A full conversion from one file to another.
///
/// ```no_run
/// use machine_readable_data::ingestion::{PageScope, PaginatedOptions, ReadOptions};
/// use machine_readable_data::pipeline::ConversionRequest;
///
/// # fn main() -> Result<(), machine_readable_data::FormatError> {
/// let request = ConversionRequest {
///     read: ReadOptions {
///         paginated: PaginatedOptions {
///             scope: PageScope::WholeDocument,
///             ..Default::default()
///         },
///         ..Default::default()
///     },
///     ..ConversionRequest::new("report.txt", "report.csv")
/// };
/// let summary = request.run()?;
/// println!("{} rows written", summary.rows_written);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Input file.
    pub source: PathBuf,
    /// Output file; the format comes from its extension unless `export.format` is set.
    pub destination: PathBuf,
    /// Read options.
    pub read: ReadOptions,
    /// Normalizer options.
    pub normalize: NormalizeOptions,
    /// Export options.
    pub export: ExportOptions,
}

/// Counts reported by [`ConversionRequest::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConversionSummary {
    /// Records produced by the adapter (after page stitching).
    pub rows_read: usize,
    /// Records the normalizer dropped as repeated headers.
    pub header_rows_dropped: usize,
    /// Records written.
    pub rows_written: usize,
}

impl ConversionRequest {
    /// A request with default options.
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            read: ReadOptions::default(),
            normalize: NormalizeOptions::default(),
            export: ExportOptions::default(),
        }
    }

    /// Read, normalize and write.
    pub fn run(&self) -> FormatResult<ConversionSummary> {
        let output = read_from_path(&self.source, &self.read)?;
        let table = tabulate(output)?;
        let rows_read = table.row_count();

        let (table, report) = normalize::normalize_with_report(table, &self.normalize)?;
        let rows_written = export::write_to_path(&table, &self.destination, &self.export)?;

        let summary = ConversionSummary {
            rows_read,
            header_rows_dropped: report.header_rows_dropped,
            rows_written,
        };
        tracing::info!(
            source = %self.source.display(),
            destination = %self.destination.display(),
            ?summary,
            "conversion finished"
        );
        Ok(summary)
    }
}

/// Reduce an adapter output to one table.
///
/// Pages are stitched onto the first page's header; a DOCX contributes its first table.
pub fn tabulate(output: ReadOutput) -> FormatResult<RecordSet> {
    match output {
        ReadOutput::Records(rs) => Ok(rs),
        ReadOutput::Xml(table) => Ok(table.records),
        ReadOutput::Pages(pages) => {
            let header = pages
                .first()
                .and_then(|p| p.header_row.clone())
                .unwrap_or_default();
            Ok(normalize::stitch_pages(pages, &header))
        }
        ReadOutput::Document(doc) => doc
            .tables
            .into_iter()
            .next()
            .ok_or_else(|| FormatError::schema_mismatch("document has no table")),
        ReadOutput::Tree(_) => Err(FormatError::schema_mismatch(
            "a raw JSON tree is not a table; read with JsonOrient::Records",
        )),
        ReadOutput::Graph(_) => Err(FormatError::schema_mismatch(
            "an RDF graph is not a table; query it and export the solutions",
        )),
    }
}
