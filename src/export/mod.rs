//! Exporters: serialize a [`RecordSet`] to CSV, TSV, JSON, fixed-width text or XML.
//!
//! Cells are written in column order; a record lacking a column writes it as empty (`null` in
//! JSON).

mod delimited;
mod json;
mod text;
mod xml;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FormatError, FormatResult};
use crate::normalize::strip_line_breaks;
use crate::types::{RecordSet, Value};

pub use xml::sanitize_element_name;

/// Output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    /// Comma-separated values.
    Csv,
    /// Tab-separated values.
    Tsv,
    /// JSON array of objects.
    Json,
    /// Fixed-width text, columns separated by at least two spaces.
    Txt,
    /// `<data><row><column>value</column>...</row></data>`.
    Xml,
}

impl ExportFormat {
    /// Guess the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "tsv" | "tab" => Some(Self::Tsv),
            "json" => Some(Self::Json),
            "txt" => Some(Self::Txt),
            "xml" => Some(Self::Xml),
            _ => None,
        }
    }

    /// Guess the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|s| s.to_str())
            .and_then(Self::from_extension)
    }
}

/// What to do with a line terminator inside a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineBreakPolicy {
    /// Keep it; delimited output quotes the field.
    #[default]
    Quote,
    /// Replace CR/LF sequences with one space.
    Strip,
}

/// What to do with a column name that is not a valid XML element name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ElementNamePolicy {
    /// Rewrite it with [`sanitize_element_name`].
    #[default]
    Sanitize,
    /// Fail with [`FormatError::InvalidName`].
    Reject,
}

/// Exporter options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Output format; inferred from the destination extension when `None`.
    pub format: Option<ExportFormat>,
    /// Embedded line terminator handling.
    pub line_breaks: LineBreakPolicy,
    /// XML element name handling.
    pub element_names: ElementNamePolicy,
    /// XML root element.
    pub xml_root: String,
    /// XML per-record element.
    pub xml_row: String,
    /// TXT: start a new page (form feed plus repeated header) every N rows.
    pub txt_page_rows: Option<usize>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: None,
            line_breaks: LineBreakPolicy::Quote,
            element_names: ElementNamePolicy::Sanitize,
            xml_root: "data".to_string(),
            xml_row: "row".to_string(),
            txt_page_rows: None,
        }
    }
}

impl ExportOptions {
    /// Options with a fixed format.
    pub fn for_format(format: ExportFormat) -> Self {
        Self {
            format: Some(format),
            ..Default::default()
        }
    }

    pub(crate) fn cell_text(&self, v: Option<&Value>) -> String {
        let s = v.map(Value::to_string).unwrap_or_default();
        match self.line_breaks {
            LineBreakPolicy::Quote => s,
            LineBreakPolicy::Strip => strip_line_breaks(&s),
        }
    }
}

/// Write `rs` to `destination`. Returns the number of records written.
pub fn write_to_path(
    rs: &RecordSet,
    destination: impl AsRef<Path>,
    options: &ExportOptions,
) -> FormatResult<usize> {
    let destination = destination.as_ref();
    let format = options
        .format
        .or_else(|| ExportFormat::from_path(destination))
        .ok_or_else(|| {
            FormatError::schema_mismatch(format!(
                "cannot infer export format from path ({})",
                destination.display()
            ))
        })?;
    let mut out = BufWriter::new(File::create(destination)?);
    let rows = write_to_writer(rs, &mut out, format, options)?;
    out.flush()?;
    tracing::debug!(path = %destination.display(), ?format, rows, "exported record set");
    Ok(rows)
}

/// Write `rs` in `format` to any writer. Returns the number of records written.
pub fn write_to_writer<W: Write>(
    rs: &RecordSet,
    writer: W,
    format: ExportFormat,
    options: &ExportOptions,
) -> FormatResult<usize> {
    match format {
        ExportFormat::Csv => delimited::write_delimited(rs, writer, b',', options),
        ExportFormat::Tsv => delimited::write_delimited(rs, writer, b'\t', options),
        ExportFormat::Json => json::write_json(rs, writer, options),
        ExportFormat::Txt => text::write_fixed_width(rs, writer, options),
        ExportFormat::Xml => xml::write_xml(rs, writer, options),
    }
}

/// Render `rs` in `format` into a string.
pub fn write_to_string(rs: &RecordSet, format: ExportFormat, options: &ExportOptions) -> FormatResult<String> {
    let mut buf = Vec::new();
    write_to_writer(rs, &mut buf, format, options)?;
    String::from_utf8(buf).map_err(|e| FormatError::invalid_document(e.to_string()))
}
