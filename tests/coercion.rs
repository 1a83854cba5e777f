use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rowfile::{FaultCategory, RowCursor, RowfileError, Value};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use url::Url;

fn setup() -> (TempDir, RowCursor) {
    let dir = tempfile::tempdir().expect("tempdir");
    let cursor = RowCursor::create(dir.path().join("typed.csv"), ["a", "b", "c"]).expect("cursor");
    (dir, cursor)
}

// commits one row holding the given texts and parks the cursor on it
fn commit(cursor: &mut RowCursor, texts: [&str; 3]) {
    cursor.move_to_insert_row().unwrap();
    for (i, text) in texts.iter().enumerate() {
        cursor.update_text(i + 1, *text).unwrap();
    }
    cursor.insert_row().unwrap();
    cursor.move_to_current_row().unwrap();
    assert!(cursor.last().unwrap());
}

#[test]
fn booleans_follow_numeric_truthiness() {
    let (_dir, mut cursor) = setup();
    commit(&mut cursor, ["0", "2", "foo"]);
    assert!(!cursor.get_boolean(1).unwrap());
    assert!(cursor.get_boolean(2).unwrap());
    assert!(!cursor.get_boolean(3).unwrap());
    cursor.update_boolean(3, true).unwrap();
    assert_eq!(cursor.get_string(3).unwrap(), "1");
    assert!(cursor.get_boolean(3).unwrap());
}

#[test]
fn numbers_round_trip() {
    let (_dir, mut cursor) = setup();
    cursor.move_to_insert_row().unwrap();
    cursor.update_byte(1, -128).unwrap();
    assert_eq!(cursor.get_byte(1).unwrap(), -128);
    cursor.update_short(1, 31_000).unwrap();
    assert_eq!(cursor.get_short(1).unwrap(), 31_000);
    cursor.update_int(1, -2_000_000_000).unwrap();
    assert_eq!(cursor.get_int(1).unwrap(), -2_000_000_000);
    cursor.update_long(1, i64::MAX).unwrap();
    assert_eq!(cursor.get_long(1).unwrap(), i64::MAX);
    cursor.update_float(2, 0.1f32).unwrap();
    assert_eq!(cursor.get_float(2).unwrap(), 0.1f32);
    cursor.update_double(2, 1.0 / 3.0).unwrap();
    assert_eq!(cursor.get_double(2).unwrap(), 1.0 / 3.0);
    let decimal = BigDecimal::from_str("12345678901234567890.123456789").unwrap();
    cursor.update_decimal(3, decimal.clone()).unwrap();
    assert_eq!(cursor.get_decimal(3).unwrap(), decimal);
}

#[test]
fn malformed_numbers_are_data_faults() {
    let (_dir, mut cursor) = setup();
    commit(&mut cursor, ["12x", "", "1e400"]);
    let err = cursor.get_int(1).unwrap_err();
    assert!(matches!(err, RowfileError::ConversionFailed { ref text, target: "i32", .. } if text == "12x"));
    assert_eq!(err.category(), FaultCategory::Data);
    assert!(cursor.get_long(2).is_err());
    assert!(cursor.get_decimal(1).is_err());
    // overflows to infinity rather than failing
    assert!(cursor.get_double(3).unwrap().is_infinite());
}

#[test]
fn decimals_can_be_scaled() {
    let (_dir, mut cursor) = setup();
    commit(&mut cursor, ["2.345", "2.344", "5"]);
    assert_eq!(cursor.get_decimal_scaled(1, 2).unwrap().to_string(), "2.35");
    assert_eq!(cursor.get_decimal_scaled(2, 2).unwrap().to_string(), "2.34");
    assert_eq!(cursor.get_decimal_scaled(3, 2).unwrap().to_string(), "5.00");
}

#[test]
fn bytes_are_stored_as_base64() {
    let (_dir, mut cursor) = setup();
    cursor.move_to_insert_row().unwrap();
    let raw = [0xde, 0xad, 0xbe, 0xef, 0x00, 0x2c];
    cursor.update_bytes(1, &raw).unwrap();
    assert_eq!(cursor.get_string(1).unwrap(), "3q2+7wAs");
    assert_eq!(cursor.get_bytes(1).unwrap(), raw.to_vec());
    cursor.update_text(2, "%%%").unwrap();
    assert!(cursor.get_bytes(2).is_err());
}

#[test]
fn dates_times_and_timestamps_round_trip() {
    let (_dir, mut cursor) = setup();
    cursor.move_to_insert_row().unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    cursor.update_date(1, date).unwrap();
    assert_eq!(cursor.get_string(1).unwrap(), "2024-02-29");
    assert_eq!(cursor.get_date(1).unwrap(), date);

    let time = NaiveTime::from_hms_opt(23, 59, 58).unwrap();
    cursor.update_time(2, time).unwrap();
    assert_eq!(cursor.get_string(2).unwrap(), "23:59:58");
    assert_eq!(cursor.get_time(2).unwrap(), time);

    let base = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
    for micros in [0, 100_000, 123_456] {
        let stamp = NaiveDateTime::new(
            base,
            NaiveTime::from_hms_micro_opt(8, 30, 15, micros).unwrap(),
        );
        cursor.update_timestamp(3, stamp).unwrap();
        assert_eq!(cursor.get_timestamp(3).unwrap(), stamp);
    }
    cursor.update_text(3, "1999-12-31 08:30:15.5").unwrap();
    assert_eq!(
        cursor.get_timestamp(3).unwrap(),
        NaiveDateTime::new(base, NaiveTime::from_hms_milli_opt(8, 30, 15, 500).unwrap())
    );
    cursor.update_text(1, "31/12/1999").unwrap();
    assert!(matches!(
        cursor.get_date(1).unwrap_err(),
        RowfileError::ConversionFailed { target: "Date", .. }
    ));
}

#[test]
fn urls_parse_or_fail() {
    let (_dir, mut cursor) = setup();
    commit(&mut cursor, ["https://example.org/x?y=1", "::nope::", ""]);
    let url = cursor.get_url(1).unwrap();
    assert_eq!(url, Url::parse("https://example.org/x?y=1").unwrap());
    assert!(cursor.get_url(2).is_err());
    cursor.update_url(3, url.clone()).unwrap();
    assert_eq!(cursor.get_url(3).unwrap(), url);
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Cell {
    state: u8,
    neighbours: Vec<(i32, i32)>,
}

#[test]
fn generic_reads_always_see_text() {
    let (_dir, mut cursor) = setup();
    cursor.move_to_insert_row().unwrap();
    cursor.update_value(1, 42i32).unwrap();
    assert_eq!(cursor.get_value(1).unwrap(), "42");
    cursor.update_value(2, Value::Boolean(false)).unwrap();
    assert_eq!(cursor.get_value(2).unwrap(), "0");

    let cell = Cell { state: 1, neighbours: vec![(0, 1), (1, 0)] };
    cursor.update_object(3, &cell).unwrap();
    let text = cursor.get_value(3).unwrap();
    assert!(!text.contains("neighbours"));
    let back: Cell = cursor.get_object_as(3).unwrap();
    assert_eq!(back, cell);

    cursor.update_value(3, serde_json::json!({"k": [1, 2]})).unwrap();
    let json: serde_json::Value = cursor.get_object_as(3).unwrap();
    assert_eq!(json["k"][1], 2);
}
