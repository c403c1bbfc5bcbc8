//! Parquet adapter.
//!
//! The columnar layout is transparent: the result is the same [`RecordSet`] a row-oriented read
//! would produce.

use std::collections::HashSet;
use std::path::Path;

use parquet::file::reader::{ChunkReader, FileReader};
use parquet::file::serialized_reader::SerializedFileReader;
use parquet::record::Field;

use crate::error::{FormatError, FormatResult};
use crate::types::{Record, RecordSet, Value};

/// Read every column of a Parquet file.
pub fn read_parquet_from_path(path: impl AsRef<Path>) -> FormatResult<RecordSet> {
    read_parquet_columns_from_path(path, None)
}

/// Read a Parquet file, optionally projecting to `columns` (in the requested order).
///
/// Notes:
/// - Validates that every requested column exists as a Parquet leaf column (by column path string)
/// - Uses the Parquet record API (`RowIter`)
pub fn read_parquet_columns_from_path(
    path: impl AsRef<Path>,
    columns: Option<&[&str]>,
) -> FormatResult<RecordSet> {
    let reader = SerializedFileReader::try_from(path.as_ref())?;

    let available_columns = parquet_leaf_column_paths(&reader);
    if let Some(wanted) = columns {
        for name in wanted {
            if !available_columns.contains(*name) {
                return Err(FormatError::schema_mismatch(format!(
                    "missing required column '{name}'"
                )));
            }
        }
    }

    let mut out = match columns {
        Some(wanted) => RecordSet::with_columns(wanted.iter().map(|s| s.to_string()).collect()),
        None => RecordSet::default(),
    };
    for row_res in reader.into_iter() {
        let row = row_res?;
        let mut record = Record::new();
        match columns {
            Some(wanted) => {
                for name in wanted {
                    let value = row
                        .get_column_iter()
                        .find(|(n, _)| n.as_str() == *name)
                        .map(|(_, f)| value_from_field(f))
                        .unwrap_or(Value::Null);
                    record.insert(*name, value);
                }
            }
            None => {
                for (name, field) in row.get_column_iter() {
                    record.insert(name.as_str(), value_from_field(field));
                }
            }
        }
        out.push(record);
    }

    tracing::debug!(rows = out.row_count(), "read parquet");
    Ok(out)
}

fn parquet_leaf_column_paths<R: ChunkReader + 'static>(
    reader: &SerializedFileReader<R>,
) -> HashSet<String> {
    reader
        .metadata()
        .file_metadata()
        .schema_descr()
        .columns()
        .iter()
        .map(|c| c.path().string())
        .collect()
}

fn value_from_field(f: &Field) -> Value {
    match f {
        Field::Null => Value::Null,
        Field::Bool(b) => Value::Bool(*b),
        Field::Byte(v) => Value::Int64(i64::from(*v)),
        Field::Short(v) => Value::Int64(i64::from(*v)),
        Field::Int(v) => Value::Int64(i64::from(*v)),
        Field::Long(v) => Value::Int64(*v),
        Field::UByte(v) => Value::Int64(i64::from(*v)),
        Field::UShort(v) => Value::Int64(i64::from(*v)),
        Field::UInt(v) => Value::Int64(i64::from(*v)),
        Field::ULong(v) => i64::try_from(*v)
            .map(Value::Int64)
            .unwrap_or(Value::Float64(*v as f64)),
        Field::Float(v) => Value::Float64(f64::from(*v)),
        Field::Double(v) => Value::Float64(*v),
        Field::Str(s) => Value::Utf8(s.clone()),
        Field::Bytes(b) => Value::Utf8(String::from_utf8_lossy(b.data()).into_owned()),
        // Dates, timestamps, decimals and nested groups keep their display form.
        other => Value::Utf8(other.to_string()),
    }
}
