use machine_readable_data::ingestion::{
    read_from_path, DelimitedOptions, ReadFormat, ReadOptions, ReadOutput, ReadRequest,
};
use machine_readable_data::types::Value;

#[test]
fn format_is_inferred_from_the_extension() {
    for (path, rows) in [
        ("tests/fixtures/occurrences.csv", 3),
        ("tests/fixtures/occurrences.tsv", 3),
        ("tests/fixtures/occurrences.json", 3),
        ("tests/fixtures/occurrences.xml", 2),
        ("tests/fixtures/occurrences.ttl", 8),
    ] {
        let out = read_from_path(path, &ReadOptions::default()).unwrap();
        assert_eq!(out.row_count(), rows, "{path}");
    }
}

#[test]
fn explicit_format_overrides_the_extension() {
    let opts = ReadOptions {
        format: Some(ReadFormat::Csv),
        delimited: DelimitedOptions::with_delimiter(b'\t'),
        ..Default::default()
    };
    let rs = read_from_path("tests/fixtures/occurrences.tsv", &opts)
        .unwrap()
        .into_records()
        .unwrap();
    assert_eq!(rs.columns().len(), 5);
}

#[test]
fn unknown_extension_is_a_schema_mismatch() {
    let err = read_from_path("tests/fixtures/occurrences.pdf", &ReadOptions::default()).unwrap_err();
    assert!(err.to_string().contains("cannot infer format from extension 'pdf'"));

    let err = read_from_path("tests/fixtures/occurrences", &ReadOptions::default()).unwrap_err();
    assert!(err.to_string().contains("path has no extension"));
}

#[cfg(not(feature = "excel"))]
#[test]
fn excel_requires_the_feature() {
    let err = read_from_path("tests/fixtures/occurrences.xlsx", &ReadOptions::default()).unwrap_err();
    assert!(err.to_string().contains("enable cargo feature 'excel'"));
}

#[test]
fn all_records_flattens_pages() {
    let out = read_from_path("tests/fixtures/occurrences.txt", &ReadOptions::default()).unwrap();
    assert!(matches!(out, ReadOutput::Pages(ref pages) if pages.len() == 3));
    let records = out.all_records();
    let species: Vec<&Value> = records.iter().filter_map(|r| r.get("Species")).collect();
    assert_eq!(species, vec![&Value::from("Parus major"), &Value::from("Sitta europaea")]);
}

#[test]
fn read_request_runs_the_unified_read() {
    let req = ReadRequest {
        path: "tests/fixtures/occurrences.json".into(),
        options: ReadOptions::default(),
    };
    let rs = req.run().unwrap().into_records().unwrap();
    assert_eq!(rs.records()[1].get("country"), Some(&Value::from("BE")));
}
