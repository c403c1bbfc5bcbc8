//! Schema coercion and per-column type inference.

use crate::error::{FormatError, FormatResult};
use crate::types::{DataType, RecordSet, Schema, Value};

/// Coerce the columns listed in `schema` to their declared types.
///
/// Columns absent from the record set are skipped. `row` in a parse error is the zero-based
/// record index.
pub fn apply_schema(rs: &mut RecordSet, schema: &Schema) -> FormatResult<()> {
    let columns: Vec<(String, DataType)> = schema
        .fields
        .iter()
        .filter(|f| rs.columns().contains(&f.name))
        .map(|f| (f.name.clone(), f.data_type.clone()))
        .collect();

    for (row, record) in rs.records_mut().iter_mut().enumerate() {
        for (column, data_type) in &columns {
            if let Some(cell) = record.get_mut(column) {
                *cell = coerce(row, column, data_type, cell)?;
            }
        }
    }
    Ok(())
}

/// Turn text columns into `Int64`, `Float64` or `Bool` when every non-null cell parses.
///
/// Integer is preferred over float, float over bool. All-null columns stay as they are.
pub fn infer_types(rs: &mut RecordSet) {
    let columns = rs.columns().to_vec();
    for column in &columns {
        let Some(data_type) = infer_column(rs, column) else {
            continue;
        };
        tracing::trace!(column = %column, ?data_type, "inferred column type");
        for (row, record) in rs.records_mut().iter_mut().enumerate() {
            if let Some(cell) = record.get_mut(column) {
                if let Ok(v) = coerce(row, column, &data_type, cell) {
                    *cell = v;
                }
            }
        }
    }
}

fn infer_column(rs: &RecordSet, column: &str) -> Option<DataType> {
    let texts: Vec<&str> = rs
        .column_values(column)
        .flatten()
        .filter(|v| !v.is_null())
        .map(|v| v.as_str())
        .collect::<Option<Vec<_>>>()?;
    if texts.is_empty() {
        return None;
    }
    let all = |f: fn(&str) -> bool| texts.iter().all(|t| f(t.trim()));
    if all(|t| t.parse::<i64>().is_ok()) {
        Some(DataType::Int64)
    } else if all(|t| t.parse::<f64>().is_ok()) {
        Some(DataType::Float64)
    } else if all(|t| parse_bool(t).is_ok()) {
        Some(DataType::Bool)
    } else {
        None
    }
}

fn coerce(row: usize, column: &str, data_type: &DataType, cell: &Value) -> FormatResult<Value> {
    match (data_type, cell) {
        (_, Value::Null)
        | (DataType::Int64, Value::Int64(_))
        | (DataType::Float64, Value::Float64(_))
        | (DataType::Bool, Value::Bool(_)) => Ok(cell.clone()),
        (DataType::Float64, Value::Int64(v)) => Ok(Value::Float64(*v as f64)),
        (DataType::Utf8, other) => Ok(Value::Utf8(other.to_string())),
        (_, other) => parse_typed_value(row, column, data_type, &other.to_string()),
    }
}

fn parse_typed_value(row: usize, column: &str, data_type: &DataType, raw: &str) -> FormatResult<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }

    let parse_error = |message: String| FormatError::ParseError {
        row,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message,
    };
    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(trimmed.to_owned())),
        DataType::Int64 => trimmed
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Float64 => trimmed
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Bool => parse_bool(trimmed).map(Value::Bool).map_err(parse_error),
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
    }
}
