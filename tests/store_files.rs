use std::io::ErrorKind;

use rowfile::{CursorBuilder, FaultCategory, RowCursor, RowfileError, Settings};

#[test]
fn loads_a_semicolon_latin1_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("latin1.txt");
    // "Zürich" and "Genève" in ISO-8859-1
    let mut bytes = b"city;zip\n".to_vec();
    bytes.extend_from_slice(b"Z\xfcrich;8001\nGen\xe8ve;1201\n");
    std::fs::write(&path, bytes).expect("seed file");

    let mut cursor = RowCursor::builder()
        .delimiter(';')
        .encoding("latin1")
        .load(&path)
        .expect("cursor");
    assert_eq!(cursor.encoding(), "windows-1252");
    assert_eq!(cursor.metadata().column_name(1).unwrap(), "city");
    assert!(cursor.next().unwrap());
    assert_eq!(cursor.get_string("city").unwrap(), "Zürich");
    assert!(cursor.next().unwrap());
    assert_eq!(cursor.get_string(1).unwrap(), "Genève");
    assert_eq!(cursor.get_int("zip").unwrap(), 1201);

    cursor.update_string(1, "Genf").unwrap();
    cursor.update_row().unwrap();
    cursor.close().unwrap();
    let written = std::fs::read(&path).unwrap();
    assert_eq!(written, b"city;zip\nZ\xfcrich;8001\nGenf;1201\n".to_vec());
}

#[test]
fn header_only_file_has_no_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("header.csv");
    std::fs::write(&path, "x,y\n").expect("seed file");
    let mut cursor = RowCursor::load(&path).expect("cursor");
    assert_eq!(cursor.row_count(), 0);
    assert_eq!(cursor.metadata().column_count(), 2);
    assert!(!cursor.next().unwrap());
}

#[test]
fn missing_and_empty_files_are_io_faults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = RowCursor::load(dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, RowfileError::Io(ref e) if e.kind() == ErrorKind::NotFound));
    assert_eq!(err.category(), FaultCategory::Environment);

    let empty = dir.path().join("empty.csv");
    std::fs::write(&empty, "").expect("seed file");
    let err = RowCursor::load(&empty).unwrap_err();
    assert!(matches!(err, RowfileError::Io(ref e) if e.kind() == ErrorKind::InvalidData));
}

#[test]
fn unknown_encoding_is_a_config_fault() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = RowCursor::builder()
        .encoding("klingon-8")
        .create(dir.path().join("x.csv"), ["a"])
        .unwrap_err();
    assert!(matches!(err, RowfileError::Config(_)));
    assert!(!dir.path().join("x.csv").exists());
}

#[test]
fn create_replaces_and_reloads() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("fresh.csv");
    std::fs::write(&path, "old,stuff\n1,2\n").expect("seed file");
    let mut cursor = RowCursor::create(&path, ["when", "what"]).expect("cursor");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "when,what\n");
    cursor.move_to_insert_row().unwrap();
    cursor.update_string("what", "line one\nline two").unwrap();
    cursor.insert_row().unwrap();
    cursor.close().unwrap();

    let mut reopened = RowCursor::load(&path).expect("reopen");
    assert!(reopened.first().unwrap());
    assert_eq!(reopened.get_string("what").unwrap(), "line one\nline two");
    assert_eq!(reopened.get_string("when").unwrap(), "");
}

#[test]
fn settings_feed_the_builder() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tabbed.tsv");
    std::fs::write(&path, "a\tb\n1\t2\n").expect("seed file");
    let settings = Settings {
        delimiter: '\t',
        encoding: "utf-8".to_owned(),
        ..Settings::default()
    };
    let mut cursor = CursorBuilder::with_settings(&settings).load(&path).expect("cursor");
    assert_eq!(cursor.encoding(), "UTF-8");
    assert!(cursor.last().unwrap());
    assert_eq!(cursor.get_int("b").unwrap(), 2);
}
