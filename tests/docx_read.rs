use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use machine_readable_data::ingestion::docx::read_docx_from_path;
use machine_readable_data::ingestion::{read_from_path, ReadOptions, ReadOutput};
use machine_readable_data::pipeline::tabulate;
use machine_readable_data::types::Value;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

fn tmp_file(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("machine-readable-data-{name}-{nanos}.docx"))
}

const DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Spring bird survey</w:t></w:r></w:p>
    <w:tbl>
      <w:tr>
        <w:tc><w:p><w:r><w:t>Species</w:t></w:r></w:p></w:tc>
        <w:tc><w:p><w:r><w:t>Count</w:t></w:r></w:p></w:tc>
      </w:tr>
      <w:tr>
        <w:tc><w:p><w:r><w:t>Parus major</w:t></w:r></w:p></w:tc>
        <w:tc><w:p><w:r><w:t>4</w:t></w:r></w:p></w:tc>
      </w:tr>
      <w:tr>
        <w:tc><w:p><w:r><w:t>Sitta</w:t></w:r></w:p><w:p><w:r><w:t>europaea</w:t></w:r></w:p></w:tc>
        <w:tc><w:p><w:r><w:t>12</w:t></w:r></w:p></w:tc>
      </w:tr>
    </w:tbl>
    <w:p><w:r><w:t>Counts are individuals.</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

fn write_docx(path: &PathBuf, document_xml: &str) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
        .unwrap();
    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(document_xml.as_bytes()).unwrap();
    zip.finish().unwrap();
}

#[test]
fn paragraphs_and_tables_are_separated() {
    let path = tmp_file("survey");
    write_docx(&path, DOCUMENT_XML);

    let content = read_docx_from_path(&path).unwrap();
    assert_eq!(
        content.paragraphs,
        vec!["Spring bird survey".to_string(), "Counts are individuals.".to_string()]
    );
    assert_eq!(content.tables.len(), 1);

    let table = &content.tables[0];
    assert_eq!(table.columns(), ["Species", "Count"]);
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.records()[1].get("Species"), Some(&Value::from("Sitta\neuropaea")));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn unified_read_and_tabulate_use_the_first_table() {
    let path = tmp_file("unified");
    write_docx(&path, DOCUMENT_XML);

    let out = read_from_path(&path, &ReadOptions::default()).unwrap();
    assert!(matches!(out, ReadOutput::Document(_)));
    assert_eq!(out.row_count(), 2);

    let table = tabulate(out).unwrap();
    assert_eq!(table.records()[0].get("Count"), Some(&Value::from("4")));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn container_without_document_part_is_an_error() {
    let path = tmp_file("empty");
    let file = File::create(&path).unwrap();
    let mut zip = ZipWriter::new(file);
    zip.start_file("readme.txt", SimpleFileOptions::default()).unwrap();
    zip.write_all(b"not a word document").unwrap();
    zip.finish().unwrap();

    assert!(read_docx_from_path(&path).is_err());
    let _ = std::fs::remove_file(&path);
}
