use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{FormatError, FormatResult};
use crate::export::{ElementNamePolicy, ExportOptions};
use crate::types::{unique_labels, RecordSet, Value};

/// Rewrite `name` into a valid XML element name.
///
/// Whitespace and characters outside letters, digits, `_`, `-` and `.` become `_`. A name that
/// does not start with a letter or `_`, or starts with `xml` in any case, gets a `_` prefix. The
/// empty name becomes `_`.
pub fn sanitize_element_name(name: &str) -> String {
    let mut out: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let bad_start = out
        .chars()
        .next()
        .is_none_or(|c| !(c.is_alphabetic() || c == '_'));
    if bad_start || out.to_ascii_lowercase().starts_with("xml") {
        out.insert(0, '_');
    }
    out
}

fn element_name(name: &str, policy: ElementNamePolicy) -> FormatResult<String> {
    let sanitized = sanitize_element_name(name);
    match policy {
        ElementNamePolicy::Sanitize => Ok(sanitized),
        ElementNamePolicy::Reject if sanitized == name => Ok(sanitized),
        ElementNamePolicy::Reject => Err(FormatError::InvalidName {
            name: name.to_string(),
        }),
    }
}

/// `<root><row><column>value</column>...</row>...</root>`, indented by two spaces.
///
/// A null or missing cell is written as an empty element.
pub(crate) fn write_xml<W: Write>(rs: &RecordSet, writer: W, options: &ExportOptions) -> FormatResult<usize> {
    let root = element_name(&options.xml_root, options.element_names)?;
    let row = element_name(&options.xml_row, options.element_names)?;
    let names: Vec<String> = rs
        .columns()
        .iter()
        .map(|c| element_name(c, options.element_names))
        .collect::<FormatResult<_>>()?;
    // Distinct columns can sanitize to the same name.
    let names = unique_labels(&names);

    let mut w = Writer::new_with_indent(writer, b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    w.write_event(Event::Start(BytesStart::new(root.as_str())))?;
    for record in rs.records() {
        w.write_event(Event::Start(BytesStart::new(row.as_str())))?;
        for (column, name) in rs.columns().iter().zip(&names) {
            match record.get(column) {
                None | Some(Value::Null) => {
                    w.write_event(Event::Empty(BytesStart::new(name.as_str())))?;
                }
                v => {
                    let text = options.cell_text(v);
                    w.write_event(Event::Start(BytesStart::new(name.as_str())))?;
                    w.write_event(Event::Text(BytesText::new(&text)))?;
                    w.write_event(Event::End(BytesEnd::new(name.as_str())))?;
                }
            }
        }
        w.write_event(Event::End(BytesEnd::new(row.as_str())))?;
    }
    w.write_event(Event::End(BytesEnd::new(root.as_str())))?;
    let mut inner = w.into_inner();
    inner.write_all(b"\n")?;
    Ok(rs.row_count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_rewrites_invalid_names() {
        assert_eq!(sanitize_element_name("scientificName"), "scientificName");
        assert_eq!(sanitize_element_name("Individual count"), "Individual_count");
        assert_eq!(sanitize_element_name("2021"), "_2021");
        assert_eq!(sanitize_element_name("xmlns"), "_xmlns");
        assert_eq!(sanitize_element_name("a/b"), "a_b");
        assert_eq!(sanitize_element_name(""), "_");
    }

    #[test]
    fn reject_policy_fails_on_invalid_name() {
        let err = element_name("Individual count", ElementNamePolicy::Reject).unwrap_err();
        assert!(matches!(err, FormatError::InvalidName { name } if name == "Individual count"));
    }
}
