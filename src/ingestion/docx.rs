//! DOCX adapter.
//!
//! Reads `word/document.xml` out of the ZIP container and extracts paragraphs and tables
//! separately, in body order.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use crate::error::{FormatError, FormatResult};
use crate::markup::{self, Element};
use crate::types::{unique_labels, Record, RecordSet, Value};

const DOCUMENT_PART: &str = "word/document.xml";

/// Content extracted from a DOCX body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocxContent {
    /// Non-empty body paragraphs in order (table cells excluded).
    pub paragraphs: Vec<String>,
    /// One record set per table, first row used as the header.
    pub tables: Vec<RecordSet>,
}

/// Read a `.docx` file.
pub fn read_docx_from_path(path: impl AsRef<Path>) -> FormatResult<DocxContent> {
    let file = File::open(path)?;
    read_docx_from_reader(file)
}

/// Read a DOCX container from any seekable reader.
pub fn read_docx_from_reader<R: Read + Seek>(reader: R) -> FormatResult<DocxContent> {
    let mut archive = zip::ZipArchive::new(reader)?;
    let mut xml = String::new();
    archive.by_name(DOCUMENT_PART)?.read_to_string(&mut xml)?;
    read_document_xml(&xml)
}

/// Extract paragraphs and tables from the text of `word/document.xml`.
pub fn read_document_xml(xml: &str) -> FormatResult<DocxContent> {
    let doc = markup::parse_document(xml)?;
    let body = doc
        .root
        .child("body")
        .ok_or_else(|| FormatError::invalid_document("word/document.xml has no w:body"))?;

    let mut content = DocxContent::default();
    for block in &body.children {
        match block.local_name() {
            "p" => {
                let text = paragraph_text(block);
                if !text.trim().is_empty() {
                    content.paragraphs.push(text);
                }
            }
            "tbl" => content.tables.push(table_records(block)),
            _ => {}
        }
    }
    tracing::debug!(
        paragraphs = content.paragraphs.len(),
        tables = content.tables.len(),
        "read docx"
    );
    Ok(content)
}

/// Zip the first row (header) against every following row.
///
/// Rows shorter than the header produce records with fewer keys; extra cells are dropped.
fn table_records(tbl: &Element) -> RecordSet {
    let mut rows = tbl
        .children_named("tr")
        .map(|tr| tr.children_named("tc").map(cell_text).collect::<Vec<String>>());

    let Some(header) = rows.next() else {
        return RecordSet::default();
    };
    let labels = unique_labels(&header);
    let mut out = RecordSet::with_columns(labels.clone()).with_header_row(header);
    for cells in rows {
        let record: Record = labels
            .iter()
            .zip(cells)
            .map(|(label, cell)| (label.clone(), Value::text(cell)))
            .collect();
        out.push(record);
    }
    out
}

/// Paragraphs of a cell joined with `\n`.
fn cell_text(tc: &Element) -> String {
    tc.children_named("p")
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
}

fn paragraph_text(p: &Element) -> String {
    let mut out = String::new();
    push_run_text(p, &mut out);
    out
}

fn push_run_text(el: &Element, out: &mut String) {
    for child in &el.children {
        match child.local_name() {
            "t" => out.push_str(&child.text),
            "tab" => out.push('\t'),
            "br" | "cr" => out.push('\n'),
            // Tracked deletions are not part of the visible text.
            "del" => {}
            _ => push_run_text(child, out),
        }
    }
}
