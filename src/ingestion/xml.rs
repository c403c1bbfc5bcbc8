//! XML adapter.
//!
//! Each child element of the root (or each element named [`XmlOptions::row_tag`]) is one record.
//! Attributes of the row element come first, then leaf child elements in document order. Nested
//! child elements are flattened with dot paths (`location.country`).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FormatResult;
use crate::markup::{self, Element};
use crate::types::{Record, RecordSet, Value};
use crate::validation::{self, SchemaDescriptor, Verdict};

/// Options for XML reads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct XmlOptions {
    /// Local name of the row element. `None` uses every child of the root.
    pub row_tag: Option<String>,
    /// Schema descriptor checked before, and independently of, the structural read.
    pub schema: Option<SchemaDescriptor>,
}

/// Records read from an XML document plus the validation verdict, when a schema was supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlTable {
    /// Records, one per row element.
    pub records: RecordSet,
    /// `Some` when [`XmlOptions::schema`] was set.
    pub verdict: Option<Verdict>,
}

/// Read an XML file.
pub fn read_xml_from_path(path: impl AsRef<Path>, options: &XmlOptions) -> FormatResult<XmlTable> {
    let text = fs::read_to_string(path)?;
    read_xml_from_str(&text, options)
}

/// Read XML text.
///
/// A failed validation does not stop the read: the verdict is reported next to the records.
pub fn read_xml_from_str(input: &str, options: &XmlOptions) -> FormatResult<XmlTable> {
    let verdict = options
        .schema
        .as_ref()
        .map(|schema| validation::validate(input, schema))
        .transpose()?;

    let doc = markup::parse_document(input)?;
    let rows: Vec<&Element> = match options.row_tag.as_deref() {
        Some(tag) => doc.root.descendants_named(tag),
        None => doc.root.children.iter().collect(),
    };

    let mut records = RecordSet::default();
    for row in rows {
        let mut record = Record::new();
        for (key, value) in &row.attributes {
            if key.starts_with("xmlns") {
                continue;
            }
            record.insert(markup::local(key), Value::text(value.trim()));
        }
        flatten_children(row, None, &mut record);
        records.push(record);
    }

    tracing::debug!(rows = records.row_count(), ?verdict, "read xml");
    Ok(XmlTable { records, verdict })
}

fn flatten_children(el: &Element, prefix: Option<&str>, record: &mut Record) {
    for child in &el.children {
        let key = match prefix {
            Some(p) => format!("{p}.{}", child.local_name()),
            None => child.local_name().to_string(),
        };
        if child.is_leaf() {
            record.insert(key, Value::text(child.trimmed_text()));
        } else {
            flatten_children(child, Some(&key), record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_then_children_with_dot_paths() {
        let xml = r#"<data>
  <row id="o1"><name>Parus major</name><location><country>NL</country></location></row>
  <row id="o2"><name>Sitta europaea</name></row>
</data>"#;
        let table = read_xml_from_str(xml, &XmlOptions::default()).unwrap();
        assert_eq!(table.verdict, None);
        assert_eq!(table.records.columns(), ["id", "name", "location.country"]);
        assert_eq!(
            table.records.records()[0].get("location.country"),
            Some(&Value::from("NL"))
        );
        assert!(!table.records.records()[1].contains("location.country"));
    }

    #[test]
    fn row_tag_selects_nested_rows() {
        let xml = "<doc><meta><title>x</title></meta><rows><r><a>1</a></r><r><a>2</a></r></rows></doc>";
        let options = XmlOptions {
            row_tag: Some("r".to_string()),
            ..Default::default()
        };
        let table = read_xml_from_str(xml, &options).unwrap();
        assert_eq!(table.records.row_count(), 2);
        assert_eq!(table.records.columns(), ["a"]);
    }
}
