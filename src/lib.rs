//! Rowfile – a scrollable, updatable row cursor over a flat delimited text file.
//!
//! A rowfile store is a header line of column names followed by one line per
//! row, every field kept as *canonical text*. There is no external database:
//! the file is loaded into memory, edited through a cursor, and written back.
//!
//! ## Modules
//! * [`catalog`] – Column names and their 1-based ordinals, resolved either way.
//! * [`datatype`] – The [`datatype::DataType`] trait: how each logical type
//!   (numbers, decimals, bytes, dates, times, timestamps, URLs, text) reads from
//!   and writes to canonical text, plus the generic [`datatype::Value`].
//! * [`store`] – The [`store::RowStore`] owning the backing file.
//! * [`overlay`] – Staged edits that shadow stored fields, and the insert row buffer.
//! * [`cursor`] – The [`cursor::RowCursor`] state machine and its builder.
//! * [`settings`] – Delimiter, encoding and mode flags read with the `config` crate.
//!
//! ## Cursor positions
//! A cursor is before the first row, on a row, after the last row, or on the
//! insert row. Only "on a row" has a row number; everything else reports 0.
//! `ForwardOnly` cursors may only call `next` (and `previous` from after the
//! last row); `ReadOnly` cursors may not stage or commit anything. Breaking
//! either rule is an [`RowfileError::IllegalCursorOperation`].
//!
//! ## Quick Start
//! ```
//! use rowfile::RowCursor;
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("people.csv");
//! let mut cursor = RowCursor::create(&path, ["name", "age"]).unwrap();
//! cursor.move_to_insert_row().unwrap();
//! cursor.update_string("name", "Alice").unwrap();
//! cursor.update_int("age", 41).unwrap();
//! cursor.insert_row().unwrap();
//! cursor.move_to_current_row().unwrap();
//! assert!(cursor.last().unwrap());
//! assert_eq!(cursor.get_int(2).unwrap(), 41);
//! cursor.close().unwrap();
//! ```

pub mod accessors;
pub mod catalog;
pub mod cursor;
pub mod datatype;
pub mod error;
pub mod overlay;
pub mod settings;
pub mod store;

pub use catalog::{Column, ColumnCatalog, ColumnIndex, ColumnRef};
pub use cursor::{ConcurrencyMode, CursorBuilder, Position, RowCursor, ScrollSensitivity};
pub use datatype::{Bytes, DataType, Value};
pub use error::{FaultCategory, Restriction, Result, RowfileError};
pub use settings::Settings;
