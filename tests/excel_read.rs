#![cfg(feature = "excel_test_writer")]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use machine_readable_data::ingestion::excel::{read_excel_from_path, read_excel_workbook_from_path};
use machine_readable_data::ingestion::{read_from_path, ExcelSheetSelection, ReadOptions};
use machine_readable_data::types::Value;

fn tmp_file(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("machine-readable-data-{name}-{nanos}.xlsx"))
}

fn write_occurrences_xlsx(path: &PathBuf) {
    use rust_xlsxwriter::Workbook;

    let mut wb = Workbook::new();

    // Sheet1: 2 rows
    let ws1 = wb.add_worksheet();
    ws1.set_name("Spring").unwrap();
    ws1.write_string(0, 0, "scientificName").unwrap();
    ws1.write_string(0, 1, "individualCount").unwrap();
    ws1.write_string(0, 2, "verified").unwrap();
    ws1.write_string(1, 0, "Parus major").unwrap();
    ws1.write_number(1, 1, 4).unwrap();
    ws1.write_boolean(1, 2, true).unwrap();
    ws1.write_string(2, 0, "Sitta europaea").unwrap();
    ws1.write_number(2, 1, 12).unwrap();
    ws1.write_boolean(2, 2, false).unwrap();

    // Sheet2: 1 row, count left empty
    let ws2 = wb.add_worksheet();
    ws2.set_name("Autumn").unwrap();
    ws2.write_string(0, 0, "scientificName").unwrap();
    ws2.write_string(0, 1, "individualCount").unwrap();
    ws2.write_string(0, 2, "verified").unwrap();
    ws2.write_string(1, 0, "Erithacus rubecula").unwrap();
    ws2.write_boolean(1, 2, true).unwrap();

    wb.save(path).unwrap();
}

#[test]
fn first_sheet_by_default() {
    let path = tmp_file("first");
    write_occurrences_xlsx(&path);

    let rs = read_excel_from_path(&path, None).unwrap();
    assert_eq!(rs.row_count(), 2);
    assert_eq!(rs.columns(), ["scientificName", "individualCount", "verified"]);
    assert_eq!(rs.records()[0].get("scientificName"), Some(&Value::from("Parus major")));
    assert_eq!(rs.records()[1].get("individualCount"), Some(&Value::Float64(12.0)));
    assert_eq!(rs.records()[1].get("verified"), Some(&Value::Bool(false)));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn all_sheets_concatenate_rows() {
    let path = tmp_file("all");
    write_occurrences_xlsx(&path);

    let rs = read_excel_workbook_from_path(&path, None).unwrap();
    assert_eq!(rs.row_count(), 3);
    assert_eq!(rs.records()[2].get("scientificName"), Some(&Value::from("Erithacus rubecula")));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn unified_read_selects_a_named_sheet() {
    let path = tmp_file("named");
    write_occurrences_xlsx(&path);

    let options = ReadOptions {
        excel_sheet_selection: ExcelSheetSelection::Sheet("Autumn".to_string()),
        ..Default::default()
    };
    let rs = read_from_path(&path, &options).unwrap().into_records().unwrap();
    assert_eq!(rs.row_count(), 1);
    assert_eq!(rs.records()[0].get("verified"), Some(&Value::Bool(true)));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn unknown_sheet_is_an_error() {
    let path = tmp_file("unknown");
    write_occurrences_xlsx(&path);

    assert!(read_excel_from_path(&path, Some("Winter")).is_err());
    let _ = std::fs::remove_file(&path);
}
