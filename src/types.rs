//! Core data model types.
//!
//! Adapters produce a [`RecordSet`]: an ordered sequence of [`Record`]s, each an ordered mapping
//! from column name to a scalar [`Value`]. An optional [`Schema`] (a list of typed [`Field`]s) is
//! used by the normalizer to coerce text cells into typed values.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Logical data type for a schema field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// A list of fields describing the expected types of columns.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A single scalar cell value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// Build a text value, mapping the empty string to [`Value::Null`].
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            Self::Null
        } else {
            Self::Utf8(s)
        }
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the string payload of a [`Value::Utf8`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Renders the cell the way exporters write it (`Null` is the empty string).
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Utf8(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Utf8(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Utf8(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// One row: an insertion-ordered mapping from column name to [`Value`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a cell. New columns are appended at the end.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(column.into(), value.into())
    }

    /// Look up a cell by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// Mutable lookup by column name.
    pub fn get_mut(&mut self, column: &str) -> Option<&mut Value> {
        self.fields.get_mut(column)
    }

    /// Returns `true` if the record has a cell for `column`.
    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// Column names in record order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    /// Values in record order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.values()
    }

    /// `(column, value)` pairs in record order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no cells.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

/// In-memory tabular dataset: ordered records plus the ordered column list.
///
/// `columns` is the union of record keys in first-seen order (for adapters that consume a header
/// row, the header order). After normalization every record carries exactly these keys; raw
/// adapter output may not.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordSet {
    columns: Vec<String>,
    records: Vec<Record>,
    /// Raw header cells as they appeared in the source, when the adapter consumed a row as the
    /// header. Kept so the normalizer can restore a mis-classified data row.
    pub header_row: Option<Vec<String>>,
}

impl RecordSet {
    /// Create an empty record set with a declared column order.
    pub fn with_columns(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
            header_row: None,
        }
    }

    /// Build a record set from records; columns are the union of keys in first-seen order.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut out = Self::default();
        for r in records {
            out.push(r);
        }
        out
    }

    /// Attach the raw header cells consumed by the adapter.
    pub fn with_header_row(mut self, header_row: Vec<String>) -> Self {
        self.header_row = Some(header_row);
        self
    }

    /// Append a record, extending the column list with any unseen keys.
    pub fn push(&mut self, record: Record) {
        for key in record.keys() {
            if !self.columns.iter().any(|c| c == key) {
                self.columns.push(key.to_owned());
            }
        }
        self.records.push(record);
    }

    /// Ordered column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Records in order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Mutable access to the records. Cells may be changed in place; key sets should not.
    pub(crate) fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    /// Consume the set, returning its records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Number of records.
    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns `true` if every record has exactly the column list as its key set.
    pub fn is_uniform(&self) -> bool {
        self.records.iter().all(|r| {
            r.len() == self.columns.len() && self.columns.iter().all(|c| r.contains(c))
        })
    }

    /// Iterate the cells of one column (`None` for records lacking the key).
    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = Option<&'a Value>> {
        self.records.iter().map(move |r| r.get(column))
    }
}

/// Make header labels unique and non-empty.
///
/// Empty labels become their zero-based position; the second occurrence of `a` becomes `a.1`,
/// the third `a.2`, and so on.
pub fn unique_labels(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for (idx, label) in raw.iter().enumerate() {
        let base = if label.trim().is_empty() {
            idx.to_string()
        } else {
            label.clone()
        };
        let mut candidate = base.clone();
        let mut n = 0;
        while out.contains(&candidate) {
            n += 1;
            candidate = format!("{base}.{n}");
        }
        out.push(candidate);
    }
    out
}
