//! Header repair: multi-line headers, repeated header rows, per-page stitching.

use crate::types::{unique_labels, Record, RecordSet, Value};

/// Merge several physical header rows column-wise into one composite header.
///
/// Non-empty fragments of a column are joined by a single space, top to bottom.
pub fn compose_header(rows: &[Vec<String>]) -> Vec<String> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    (0..width)
        .map(|col| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.trim())
                .filter(|cell| !cell.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// Fold the first `n` records into the column labels.
///
/// Used when a multi-line header was read as one header line plus `n` data rows.
pub(crate) fn merge_leading_rows(rs: RecordSet, n: usize) -> RecordSet {
    if n == 0 || rs.is_empty() {
        return rs;
    }
    let columns = rs.columns().to_vec();
    let mut records = rs.into_records().into_iter();

    let mut header_rows: Vec<Vec<String>> = vec![columns.clone()];
    for r in records.by_ref().take(n) {
        header_rows.push(columns.iter().map(|c| cell_text(r.get(c))).collect());
    }
    let header = compose_header(&header_rows);
    let labels = unique_labels(&header);

    let mut out = RecordSet::with_columns(labels.clone()).with_header_row(header);
    for r in records {
        out.push(rekey(&r, &columns, &labels));
    }
    out
}

/// Returns `true` if every non-empty cell equals, or is a run of whole words of, the header
/// token of its column, and at least one cell is non-empty.
pub(crate) fn is_header_row(record: &Record, columns: &[String], tokens: &[String]) -> bool {
    let mut non_empty = 0;
    for (column, token) in columns.iter().zip(tokens) {
        let cell = cell_text(record.get(column));
        let cell = cell.trim();
        if cell.is_empty() {
            continue;
        }
        non_empty += 1;
        if !is_word_fragment(cell, token) {
            return false;
        }
    }
    non_empty > 0
}

fn is_word_fragment(cell: &str, token: &str) -> bool {
    let cell_words: Vec<&str> = cell.split_whitespace().collect();
    let token_words: Vec<&str> = token.split_whitespace().collect();
    !cell_words.is_empty()
        && token_words
            .windows(cell_words.len())
            .any(|w| w.iter().zip(&cell_words).all(|(a, b)| a.eq_ignore_ascii_case(b)))
}

/// Join per-page record sets into one, re-keyed onto the known `header`.
///
/// A page whose consumed header row is not the known header had its first data row taken as the
/// header; that row is restored as the page's first record.
pub fn stitch_pages(pages: Vec<RecordSet>, header: &[String]) -> RecordSet {
    let labels = unique_labels(header);
    let mut out = RecordSet::with_columns(labels.clone()).with_header_row(header.to_vec());
    let mut restored = 0usize;

    for page in pages {
        let page_columns = page.columns().to_vec();
        if let Some(raw) = page.header_row.as_ref() {
            let is_known_header = raw.len() == header.len()
                && raw.iter().zip(header).all(|(a, b)| a.trim() == b.trim());
            if !is_known_header {
                let record: Record = labels
                    .iter()
                    .zip(raw)
                    .map(|(label, cell)| (label.clone(), Value::text(cell.clone())))
                    .collect();
                out.push(record);
                restored += 1;
            }
        }
        for r in page.records() {
            out.push(rekey(r, &page_columns, &labels));
        }
    }

    if restored > 0 {
        tracing::debug!(restored, "restored data rows consumed as page headers");
    }
    out
}

/// Map `record` from `from` columns onto `to` labels by position.
fn rekey(record: &Record, from: &[String], to: &[String]) -> Record {
    from.iter()
        .zip(to)
        .filter_map(|(f, t)| record.get(f).map(|v| (t.clone(), v.clone())))
        .collect()
}

fn cell_text(v: Option<&Value>) -> String {
    v.map(Value::to_string).unwrap_or_default()
}
