use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use machine_readable_data::ingestion::delimited::read_csv_from_path;
use machine_readable_data::ingestion::parquet::{read_parquet_columns_from_path, read_parquet_from_path};
use machine_readable_data::ingestion::{read_from_path, DelimitedOptions, ReadOptions};
use machine_readable_data::normalize::{normalize, NormalizeOptions};
use machine_readable_data::types::Value;
use parquet::column::writer::ColumnWriter;
use parquet::data_type::ByteArray;
use parquet::file::properties::WriterProperties;
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::parser::parse_message_type;

fn tmp_file(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("machine-readable-data-{name}-{nanos}.parquet"))
}

fn write_occurrences_parquet(path: &PathBuf) {
    let schema_str = r#"
    message schema {
      REQUIRED BINARY occurrenceID (UTF8);
      REQUIRED BINARY scientificName (UTF8);
      REQUIRED INT64 individualCount;
      REQUIRED BOOLEAN verified;
    }
    "#;
    let schema = Arc::new(parse_message_type(schema_str).unwrap());
    let props = Arc::new(WriterProperties::builder().build());
    let file = File::create(path).unwrap();

    let mut writer = SerializedFileWriter::new(file, schema, props).unwrap();
    let mut rg = writer.next_row_group().unwrap();

    let mut col_idx: usize = 0;
    while let Some(mut col) = rg.next_column().unwrap() {
        match col.untyped() {
            ColumnWriter::ByteArrayColumnWriter(w) => {
                // col0=occurrenceID, col1=scientificName
                let values: Vec<ByteArray> = if col_idx == 0 {
                    vec!["o1".into(), "o2".into(), "o3".into()]
                } else {
                    vec![
                        "Parus major".into(),
                        "Sitta europaea".into(),
                        "Erithacus rubecula".into(),
                    ]
                };
                w.write_batch(&values, None, None).unwrap();
            }
            ColumnWriter::Int64ColumnWriter(w) => {
                w.write_batch(&[4_i64, 12_i64, 1_i64], None, None).unwrap();
            }
            ColumnWriter::BoolColumnWriter(w) => {
                w.write_batch(&[true, false, true], None, None).unwrap();
            }
            _ => panic!("unexpected column writer in test"),
        }
        col.close().unwrap();
        col_idx += 1;
    }
    rg.close().unwrap();
    writer.close().unwrap();
}

#[test]
fn parquet_reads_into_the_same_record_shape() {
    let path = tmp_file("occurrences");
    write_occurrences_parquet(&path);

    let rs = read_parquet_from_path(&path).unwrap();
    assert_eq!(rs.row_count(), 3);
    assert_eq!(
        rs.columns(),
        ["occurrenceID", "scientificName", "individualCount", "verified"]
    );
    assert_eq!(rs.records()[1].get("scientificName"), Some(&Value::from("Sitta europaea")));
    assert_eq!(rs.records()[1].get("individualCount"), Some(&Value::Int64(12)));
    assert_eq!(rs.records()[1].get("verified"), Some(&Value::Bool(false)));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn columnar_layout_is_transparent() {
    let path = tmp_file("transparent");
    write_occurrences_parquet(&path);

    let from_parquet = read_from_path(&path, &ReadOptions::default())
        .unwrap()
        .into_records()
        .unwrap();
    let from_csv = read_csv_from_path("tests/fixtures/occurrences.csv", &DelimitedOptions::default()).unwrap();
    let from_csv = normalize(
        from_csv,
        &NormalizeOptions {
            infer_types: true,
            ..Default::default()
        },
    )
    .unwrap();

    let ids = |rs: &machine_readable_data::types::RecordSet, col: &str| -> Vec<Value> {
        rs.column_values(col).map(|v| v.cloned().unwrap_or(Value::Null)).collect()
    };
    assert_eq!(ids(&from_parquet, "occurrenceID"), ids(&from_csv, "occurrenceID"));
    assert_eq!(ids(&from_parquet, "individualCount"), ids(&from_csv, "individualCount"));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn projection_keeps_requested_order() {
    let path = tmp_file("projection");
    write_occurrences_parquet(&path);

    let rs = read_parquet_columns_from_path(&path, Some(&["individualCount", "occurrenceID"])).unwrap();
    assert_eq!(rs.columns(), ["individualCount", "occurrenceID"]);
    assert_eq!(rs.records()[2].len(), 2);

    let err = read_parquet_columns_from_path(&path, Some(&["country"])).unwrap_err();
    assert!(err.to_string().contains("missing required column 'country'"));

    let _ = std::fs::remove_file(&path);
}
