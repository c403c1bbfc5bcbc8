//! Delimited text (CSV/TSV) adapter.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FormatResult;
use crate::types::{unique_labels, Record, RecordSet, Value};

/// Options for delimited text reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelimitedOptions {
    /// Field delimiter. `None` uses the format default: `,` for CSV, tab for TSV.
    ///
    /// A semicolon-delimited file read with `,` does not fail: every line folds into one column.
    pub delimiter: Option<u8>,
    /// Whether the first line is a header. When `false`, columns are labelled `"0".."N-1"`.
    pub has_header: bool,
    /// Quote character.
    pub quote: u8,
}

impl Default for DelimitedOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            quote: b'"',
        }
    }
}

impl DelimitedOptions {
    /// Options for an explicit delimiter, everything else default.
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            delimiter: Some(delimiter),
            ..Self::default()
        }
    }

    /// Build a flexible `csv` reader for these options.
    ///
    /// `default_delimiter` applies when [`Self::delimiter`] is `None`.
    pub fn reader_builder(&self, default_delimiter: u8) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(self.delimiter.unwrap_or(default_delimiter))
            .quote(self.quote)
            .has_headers(self.has_header)
            .flexible(true);
        builder
    }
}

/// Read a comma-separated file (delimiter overridable through `options`).
pub fn read_csv_from_path(path: impl AsRef<Path>, options: &DelimitedOptions) -> FormatResult<RecordSet> {
    let mut rdr = options.reader_builder(b',').from_path(path)?;
    read_delimited_from_reader(&mut rdr, options.has_header)
}

/// Read a tab-separated file (delimiter overridable through `options`).
pub fn read_tsv_from_path(path: impl AsRef<Path>, options: &DelimitedOptions) -> FormatResult<RecordSet> {
    let mut rdr = options.reader_builder(b'\t').from_path(path)?;
    read_delimited_from_reader(&mut rdr, options.has_header)
}

/// Read delimited text held in memory with a `,` default delimiter.
pub fn read_csv_from_str(input: &str, options: &DelimitedOptions) -> FormatResult<RecordSet> {
    let mut rdr = options.reader_builder(b',').from_reader(input.as_bytes());
    read_delimited_from_reader(&mut rdr, options.has_header)
}

/// Read delimited data from an existing `csv` reader.
///
/// Rules:
///
/// - Cells are kept as exact text ([`Value::Utf8`]); empty cells are [`Value::Null`].
/// - `has_header` must match how `rdr` was built. Without a header, columns are labelled by
///   zero-based position and the first line stays a data row.
/// - Ragged rows are kept when the reader is flexible: fields past the header are labelled by
///   position, missing trailing fields are absent from the record.
pub fn read_delimited_from_reader<R: Read>(
    rdr: &mut csv::Reader<R>,
    has_header: bool,
) -> FormatResult<RecordSet> {
    let header_cells: Option<Vec<String>> = if has_header {
        Some(rdr.headers()?.iter().map(str::to_owned).collect())
    } else {
        None
    };
    // Fields past the header are labelled by position, deduplicated together with the header.
    let mut raw_labels = header_cells.clone().unwrap_or_default();
    let mut labels = unique_labels(&raw_labels);

    let mut out = RecordSet::with_columns(labels.clone());
    for result in rdr.records() {
        let row = result?;
        if row.len() > raw_labels.len() {
            raw_labels.extend((raw_labels.len()..row.len()).map(|idx| idx.to_string()));
            labels = unique_labels(&raw_labels);
        }
        let mut record = Record::new();
        for (label, cell) in labels.iter().zip(row.iter()) {
            record.insert(label.clone(), Value::text(cell));
        }
        out.push(record);
    }

    if let Some(cells) = header_cells {
        out = out.with_header_row(cells);
    }
    warn_on_suspected_delimiter_mismatch(&out);
    Ok(out)
}

/// Returns `true` when a read produced one column whose text still carries `;`, tab or `|`,
/// which usually means the file was read with the wrong delimiter.
pub(crate) fn suspected_delimiter_mismatch(rs: &RecordSet) -> bool {
    if rs.columns().len() != 1 {
        return false;
    }
    rs.columns()
        .iter()
        .map(String::as_str)
        .chain(rs.records().iter().flat_map(|r| r.values().filter_map(Value::as_str)))
        .any(|s| s.contains([';', '\t', '|']))
}

fn warn_on_suspected_delimiter_mismatch(rs: &RecordSet) {
    if suspected_delimiter_mismatch(rs) {
        tracing::warn!(
            rows = rs.row_count(),
            "single-column delimited read contains ';', tab or '|'; delimiter is probably wrong"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_rows_get_positional_labels_past_the_header() {
        let rs = read_csv_from_str("a,b\n1,2,3\n4\n", &DelimitedOptions::default()).unwrap();
        assert_eq!(rs.columns(), ["a", "b", "2"]);
        assert_eq!(rs.records()[0].get("2"), Some(&Value::from("3")));
        assert!(!rs.records()[1].contains("b"));
    }

    #[test]
    fn extra_fields_never_overwrite_a_header_label() {
        let rs = read_csv_from_str("a,2\nx,y,z\n", &DelimitedOptions::default()).unwrap();
        assert_eq!(rs.columns(), ["a", "2", "2.1"]);
        let record = &rs.records()[0];
        assert_eq!(record.get("2"), Some(&Value::from("y")));
        assert_eq!(record.get("2.1"), Some(&Value::from("z")));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn duplicate_headers_are_made_unique() {
        let rs = read_csv_from_str("x,x\n1,2\n", &DelimitedOptions::default()).unwrap();
        assert_eq!(rs.columns(), ["x", "x.1"]);
        assert_eq!(rs.header_row.as_deref(), Some(&["x".to_string(), "x".to_string()][..]));
    }
}
