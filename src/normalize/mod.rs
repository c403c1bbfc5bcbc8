//! Record Set repair.
//!
//! Adapters return what the source literally contains. The normalizer undoes the usual damage:
//! header lines split over several rows, header rows repeated on every page, line terminators and
//! control characters inside cells, ragged key sets and numbers stored as text.

mod cells;
mod headers;
mod typing;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::FormatResult;
use crate::types::{unique_labels, Record, RecordSet, Schema, Value};

pub use cells::{strip_control_chars, strip_line_breaks};
pub use headers::{compose_header, stitch_pages};
pub use typing::{apply_schema, infer_types};

/// Normalizer switches, applied in field order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Fold the first N records into the column labels.
    pub merge_header_rows: usize,
    /// Replace CR/LF sequences in values and labels with one space.
    pub strip_line_breaks: bool,
    /// Replace tabs with a space and drop other control characters. Off by default: a tab is
    /// legitimate cell content.
    pub strip_control_chars: bool,
    /// Drop records that repeat the header (whole or in fragments).
    pub drop_repeated_headers: bool,
    /// Header tokens to detect repeated headers against. Defaults to the record set's columns
    /// when it was read with a header row; otherwise no record is treated as a header.
    pub header_tokens: Option<Vec<String>>,
    /// Coerce listed columns to declared types.
    pub schema: Option<Schema>,
    /// Turn all-numeric / all-boolean text columns into typed columns.
    pub infer_types: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            merge_header_rows: 0,
            strip_line_breaks: true,
            strip_control_chars: false,
            drop_repeated_headers: true,
            header_tokens: None,
            schema: None,
            infer_types: false,
        }
    }
}

/// What [`normalize_with_report`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizeReport {
    /// Records folded into labels by `merge_header_rows`.
    pub header_rows_merged: usize,
    /// Records dropped as repeated headers.
    pub header_rows_dropped: usize,
    /// Cells (labels included) rewritten by the cleanup step.
    pub cells_cleaned: usize,
    /// Missing keys filled with `Null`.
    pub cells_filled: usize,
}

/// Normalize a record set. See [`NormalizeOptions`] for the steps.
pub fn normalize(rs: RecordSet, options: &NormalizeOptions) -> FormatResult<RecordSet> {
    normalize_with_report(rs, options).map(|(rs, _)| rs)
}

/// Like [`normalize`], also returning what was changed.
pub fn normalize_with_report(
    rs: RecordSet,
    options: &NormalizeOptions,
) -> FormatResult<(RecordSet, NormalizeReport)> {
    let mut report = NormalizeReport::default();

    let merged_from = rs.row_count();
    let rs = headers::merge_leading_rows(rs, options.merge_header_rows);
    report.header_rows_merged = merged_from - rs.row_count();

    let (rs, cleaned) = clean(rs, options);
    report.cells_cleaned = cleaned;

    // Without a source header row the column labels are positions or keys, not header text.
    let tokens = match &options.header_tokens {
        Some(tokens) => Some(tokens.clone()),
        None => rs.header_row.as_ref().map(|_| rs.columns().to_vec()),
    };
    let rs = match tokens {
        Some(tokens) if options.drop_repeated_headers => {
            let (rs, dropped) = drop_repeated_headers(rs, &tokens);
            report.header_rows_dropped = dropped;
            rs
        }
        _ => rs,
    };

    let (mut rs, filled) = fill_missing(rs);
    report.cells_filled = filled;

    if let Some(schema) = &options.schema {
        apply_schema(&mut rs, schema)?;
    }
    if options.infer_types {
        infer_types(&mut rs);
    }

    tracing::debug!(
        rows = rs.row_count(),
        merged = report.header_rows_merged,
        dropped = report.header_rows_dropped,
        cleaned = report.cells_cleaned,
        filled = report.cells_filled,
        "normalized record set"
    );
    Ok((rs, report))
}

fn clean_text(s: &str, options: &NormalizeOptions) -> Option<String> {
    if !cells::needs_cleanup(s, options.strip_line_breaks, options.strip_control_chars) {
        return None;
    }
    let mut out = s.to_string();
    if options.strip_line_breaks {
        out = strip_line_breaks(&out);
    }
    if options.strip_control_chars {
        out = strip_control_chars(&out);
    }
    Some(out)
}

fn clean(rs: RecordSet, options: &NormalizeOptions) -> (RecordSet, usize) {
    if !options.strip_line_breaks && !options.strip_control_chars {
        return (rs, 0);
    }
    let mut cleaned = 0;
    let rewritten: Vec<String> = rs
        .columns()
        .iter()
        .map(|c| match clean_text(c, options) {
            Some(s) => {
                cleaned += 1;
                s
            }
            None => c.clone(),
        })
        .collect();
    // Two labels may clean to the same text; keep them apart.
    let labels = unique_labels(&rewritten);
    let renamed: HashMap<String, String> = rs.columns().iter().cloned().zip(labels.iter().cloned()).collect();

    let header_row = rs.header_row.clone();
    let mut out = RecordSet::with_columns(labels);
    out.header_row = header_row;

    for record in rs.into_records() {
        let record: Record = record
            .into_iter()
            .map(|(k, v)| {
                let k = match renamed.get(&k) {
                    Some(label) => label.clone(),
                    None => clean_text(&k, options).unwrap_or(k),
                };
                let v = match v {
                    Value::Utf8(s) => match clean_text(&s, options) {
                        Some(c) => {
                            cleaned += 1;
                            Value::text(c)
                        }
                        None => Value::Utf8(s),
                    },
                    other => other,
                };
                (k, v)
            })
            .collect();
        out.push(record);
    }
    (out, cleaned)
}

fn drop_repeated_headers(rs: RecordSet, tokens: &[String]) -> (RecordSet, usize) {
    let columns = rs.columns().to_vec();
    let mut out = RecordSet::with_columns(columns.clone());
    out.header_row = rs.header_row.clone();
    let mut dropped = 0;
    for (row, record) in rs.into_records().into_iter().enumerate() {
        if headers::is_header_row(&record, &columns, tokens) {
            tracing::debug!(row, "dropped repeated header row");
            dropped += 1;
        } else {
            out.push(record);
        }
    }
    (out, dropped)
}

fn fill_missing(rs: RecordSet) -> (RecordSet, usize) {
    let columns = rs.columns().to_vec();
    let mut out = RecordSet::with_columns(columns.clone());
    out.header_row = rs.header_row.clone();
    let mut filled = 0;
    for mut record in rs.into_records() {
        let mut uniform = Record::new();
        for c in &columns {
            match record.get_mut(c) {
                Some(v) => {
                    uniform.insert(c.clone(), std::mem::replace(v, Value::Null));
                }
                None => {
                    filled += 1;
                    uniform.insert(c.clone(), Value::Null);
                }
            }
        }
        out.push(uniform);
    }
    (out, filled)
}
