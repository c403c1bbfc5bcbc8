use std::io::Write;

use serde_json::{Map, Value as JsonValue};

use crate::error::FormatResult;
use crate::export::{ExportOptions, LineBreakPolicy};
use crate::types::{RecordSet, Value};

/// Pretty-printed array of objects, keys in column order.
pub(crate) fn write_json<W: Write>(rs: &RecordSet, mut writer: W, options: &ExportOptions) -> FormatResult<usize> {
    let rows: Vec<JsonValue> = rs
        .records()
        .iter()
        .map(|record| {
            let object: Map<String, JsonValue> = rs
                .columns()
                .iter()
                .map(|c| (c.clone(), to_json(record.get(c), options)))
                .collect();
            JsonValue::Object(object)
        })
        .collect();
    serde_json::to_writer_pretty(&mut writer, &rows)?;
    writer.write_all(b"\n")?;
    Ok(rows.len())
}

fn to_json(v: Option<&Value>, options: &ExportOptions) -> JsonValue {
    match v {
        None | Some(Value::Null) => JsonValue::Null,
        Some(Value::Int64(i)) => JsonValue::from(*i),
        Some(Value::Float64(f)) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Some(Value::Bool(b)) => JsonValue::Bool(*b),
        Some(Value::Utf8(_)) if options.line_breaks == LineBreakPolicy::Strip => {
            JsonValue::String(options.cell_text(v))
        }
        Some(Value::Utf8(s)) => JsonValue::String(s.clone()),
    }
}
