//! JSON adapter.
//!
//! Supported inputs for [`JsonOrient::Records`]:
//! - A JSON array of flat objects: `[{"a":1}, {"a":2}]`
//! - A single object (one record)
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//!
//! [`JsonOrient::Raw`] returns the parsed tree unchanged for direct key-based traversal.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FormatError, FormatResult};
use crate::types::{Record, RecordSet, Value};

/// How a JSON document maps to rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JsonOrient {
    /// Array of flat objects, one record per object.
    #[default]
    Records,
    /// Keep the parsed `serde_json::Value` tree.
    Raw,
}

/// Options for JSON reads.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonOptions {
    /// Row orientation.
    pub orient: JsonOrient,
}

/// Read a JSON file in records orientation.
pub fn read_json_records_from_path(path: impl AsRef<Path>) -> FormatResult<RecordSet> {
    let text = fs::read_to_string(path)?;
    read_json_records_from_str(&text)
}

/// Load a JSON file as a raw tree.
pub fn load_json_from_path(path: impl AsRef<Path>) -> FormatResult<serde_json::Value> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Read JSON text in records orientation.
///
/// The column set is the union of keys across all objects, in first-seen order. Objects lacking
/// a key simply do not carry it; the normalizer fills those cells with `Null`.
pub fn read_json_records_from_str(input: &str) -> FormatResult<RecordSet> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(FormatError::schema_mismatch("json input is empty"));
    }

    // First try parsing as a single JSON value (array or object).
    let single = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(v) => v,
        Err(_) if looks_like_ndjson(trimmed) => return read_ndjson(trimmed),
        Err(e) => return Err(FormatError::Json(e)),
    };
    match single {
        serde_json::Value::Array(items) => records_from_values(&items),
        serde_json::Value::Object(_) => records_from_values(std::slice::from_ref(&single)),
        _ => Err(FormatError::schema_mismatch(
            "json must be an object, an array of objects, or NDJSON",
        )),
    }
}

/// NDJSON has several non-empty lines and the first one is a complete value on its own.
fn looks_like_ndjson(input: &str) -> bool {
    let mut lines = input.lines().map(str::trim).filter(|l| !l.is_empty());
    let Some(first) = lines.next() else {
        return false;
    };
    lines.next().is_some() && serde_json::from_str::<serde_json::Value>(first).is_ok()
}

fn read_ndjson(input: &str) -> FormatResult<RecordSet> {
    let mut values = Vec::new();
    for (i, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let v = serde_json::from_str::<serde_json::Value>(line).map_err(|e| {
            FormatError::schema_mismatch(format!("invalid ndjson at line {}: {}", i + 1, e))
        })?;
        values.push(v);
    }
    records_from_values(&values)
}

fn records_from_values(values: &[serde_json::Value]) -> FormatResult<RecordSet> {
    let mut out = RecordSet::default();
    for (idx0, v) in values.iter().enumerate() {
        let row_num = idx0 + 1;
        let obj = v
            .as_object()
            .ok_or_else(|| FormatError::schema_mismatch(format!("row {row_num} is not a json object")))?;

        let record: Record = obj
            .iter()
            .map(|(k, jv)| (k.clone(), scalar_from_json(jv)))
            .collect();
        out.push(record);
    }
    tracing::debug!(rows = out.row_count(), columns = out.columns().len(), "read json records");
    Ok(out)
}

/// Convert a JSON value into a cell. Nested arrays/objects keep their JSON text.
pub(crate) fn scalar_from_json(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int64(i)
            } else {
                // u64 beyond i64::MAX and real numbers.
                n.as_f64().map(Value::Float64).unwrap_or(Value::Null)
            }
        }
        serde_json::Value::String(s) => Value::Utf8(s.clone()),
        nested => Value::Utf8(nested.to_string()),
    }
}
