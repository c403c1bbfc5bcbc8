#![cfg(feature = "excel")]

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::{FormatError, FormatResult};
use crate::types::{unique_labels, Record, RecordSet, Value};

/// Read one sheet of a workbook (`.xlsx`, `.xls`, `.ods`, etc.).
///
/// Behavior:
/// - Picks `sheet_name` if provided; otherwise uses the first sheet in the workbook
/// - Uses the first non-empty row as the header row
/// - Reads remaining rows, one record per row; empty cells are `Null`
pub fn read_excel_from_path(path: impl AsRef<Path>, sheet_name: Option<&str>) -> FormatResult<RecordSet> {
    let sheets: Option<Vec<&str>> = sheet_name.map(|s| vec![s]);
    read_excel_workbook_from_path(path, sheets.as_deref())
}

/// Read multiple sheets of a workbook and concatenate all rows into one [`RecordSet`].
///
/// - If `sheet_names` is `None`, reads **all sheets** in workbook order.
/// - If `sheet_names` is `Some(&[...])`, reads only those sheets (in the provided order).
///
/// Sheets are expected to share a header; differing headers widen the column set.
pub fn read_excel_workbook_from_path(
    path: impl AsRef<Path>,
    sheet_names: Option<&[&str]>,
) -> FormatResult<RecordSet> {
    let mut workbook = open_workbook_auto(path)?;

    let sheets: Vec<String> = match sheet_names {
        Some(names) => names.iter().map(|s| s.to_string()).collect(),
        None => workbook.sheet_names().to_vec(),
    };
    if sheets.is_empty() {
        return Err(FormatError::schema_mismatch("workbook has no sheets"));
    }

    let mut out = RecordSet::default();
    for sheet in sheets {
        let range = workbook.worksheet_range(&sheet)?;
        let (header, records) = read_sheet_range(&range)
            .map_err(|e| wrap_schema_err_with_sheet(&sheet, e))?;
        if out.header_row.is_none() {
            out = RecordSet::with_columns(unique_labels(&header)).with_header_row(header);
        }
        for r in records {
            out.push(r);
        }
    }

    Ok(out)
}

fn read_sheet_range(range: &calamine::Range<Data>) -> FormatResult<(Vec<String>, Vec<Record>)> {
    let mut rows = range.rows().skip_while(|row| row.iter().all(|c| matches!(c, Data::Empty)));
    let header: Vec<String> = rows
        .next()
        .ok_or_else(|| FormatError::schema_mismatch("sheet has no non-empty rows (no header row found)"))?
        .iter()
        .map(cell_to_header_string)
        .collect();
    let labels = unique_labels(&header);

    let records = rows
        .map(|row| {
            labels
                .iter()
                .zip(row.iter())
                .map(|(label, cell)| (label.clone(), convert_cell(cell)))
                .collect::<Record>()
        })
        .collect();
    Ok((header, records))
}

fn wrap_schema_err_with_sheet(sheet: &str, err: FormatError) -> FormatError {
    match err {
        FormatError::SchemaMismatch { message } => FormatError::SchemaMismatch {
            message: format!("sheet '{sheet}': {message}"),
        },
        other => other,
    }
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(f) => f.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => "".to_string(),
    }
}

fn convert_cell(c: &Data) -> Value {
    match c {
        Data::Empty => Value::Null,
        Data::String(s) => Value::text(s.clone()),
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) => Value::Float64(*f),
        Data::Bool(b) => Value::Bool(*b),
        other => Value::Utf8(cell_to_header_string(other)),
    }
}
