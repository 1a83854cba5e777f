//! The row cursor: position, mode policy, and the read/write path through staged edits.
//!
//! A [`RowCursor`] is always in exactly one [`Position`]. Scroll sensitivity and
//! concurrency mode are fixed when the cursor is built and never change after.
//!
//! Staged edits belong to the row they were made on. Moving to any other
//! position discards them; only [`RowCursor::update_row`] and
//! [`RowCursor::insert_row`] write staged values to the store.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::catalog::{ColumnCatalog, ColumnIndex};
use crate::datatype::{DataType, Value, decode_object, encode_object};
use crate::error::{Restriction, Result, RowfileError};
use crate::overlay::{Field, InsertRowBuffer, PendingEdits};
use crate::settings::Settings;
use crate::store::{RowStore, StoreFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollSensitivity {
    ForwardOnly,
    #[default]
    Scrollable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyMode {
    ReadOnly,
    #[default]
    Updatable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    BeforeFirst,
    OnRow(usize),
    AfterLast,
    InsertRow,
}

// the insert row remembers where the cursor came from
#[derive(Debug)]
struct InsertSession {
    buffer: InsertRowBuffer,
    return_to: Position,
}

// ------------- CursorBuilder -------------
/// Captures everything about a cursor that is fixed for its lifetime.
#[derive(Debug, Clone)]
pub struct CursorBuilder {
    delimiter: char,
    encoding: String,
    scroll: ScrollSensitivity,
    concurrency: ConcurrencyMode,
}
impl Default for CursorBuilder {
    fn default() -> Self {
        Self::with_settings(&Settings::default())
    }
}
impl CursorBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            delimiter: settings.delimiter,
            encoding: settings.encoding.clone(),
            scroll: settings.scroll,
            concurrency: settings.concurrency,
        }
    }
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }
    /// Any WHATWG encoding label; resolved when the store is opened.
    pub fn encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = label.into();
        self
    }
    pub fn scroll(mut self, scroll: ScrollSensitivity) -> Self {
        self.scroll = scroll;
        self
    }
    pub fn concurrency(mut self, concurrency: ConcurrencyMode) -> Self {
        self.concurrency = concurrency;
        self
    }
    /// Attaches to an existing file, taking the columns from its first line.
    pub fn load(self, path: impl AsRef<Path>) -> Result<RowCursor> {
        let format = self.format()?;
        let store = RowStore::load(path, format)?;
        Ok(RowCursor::new(store, self.scroll, self.concurrency))
    }
    /// Starts a brand-new, header-only file with the given columns.
    pub fn create<I, S>(self, path: impl AsRef<Path>, column_names: I) -> Result<RowCursor>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let format = self.format()?;
        let store = RowStore::create(path, format, column_names)?;
        Ok(RowCursor::new(store, self.scroll, self.concurrency))
    }
    fn format(&self) -> Result<StoreFormat> {
        StoreFormat::default()
            .with_delimiter(self.delimiter)?
            .with_encoding_label(&self.encoding)
    }
}

// ------------- RowCursor -------------
#[derive(Debug)]
pub struct RowCursor {
    store: RowStore,
    scroll: ScrollSensitivity,
    concurrency: ConcurrencyMode,
    position: Position,
    pending: PendingEdits,
    insert: Option<InsertSession>,
}

impl RowCursor {
    fn new(store: RowStore, scroll: ScrollSensitivity, concurrency: ConcurrencyMode) -> Self {
        Self {
            store,
            scroll,
            concurrency,
            position: Position::BeforeFirst,
            pending: PendingEdits::new(),
            insert: None,
        }
    }
    pub fn builder() -> CursorBuilder {
        CursorBuilder::new()
    }
    /// Scrollable, updatable, comma delimited UTF-8.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        CursorBuilder::new().load(path)
    }
    pub fn create<I, S>(path: impl AsRef<Path>, column_names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CursorBuilder::new().create(path, column_names)
    }

    // ------------- metadata -------------
    pub fn metadata(&self) -> &ColumnCatalog {
        self.store.catalog()
    }
    pub fn find_column(&self, label: &str) -> Result<usize> {
        self.store.catalog().resolve_label(label).map(|c| c.ordinal())
    }
    pub fn row_count(&self) -> usize {
        self.store.row_count()
    }
    pub fn scroll_sensitivity(&self) -> ScrollSensitivity {
        self.scroll
    }
    pub fn concurrency(&self) -> ConcurrencyMode {
        self.concurrency
    }
    pub fn encoding(&self) -> &'static str {
        self.store.encoding_name()
    }
    pub fn path(&self) -> &Path {
        self.store.path()
    }
    pub fn position(&self) -> Position {
        self.position
    }
    /// The 1-based current row, or 0 when not on a stored row.
    pub fn get_row(&self) -> usize {
        match self.position {
            Position::OnRow(i) => i,
            _ => 0,
        }
    }
    pub fn is_before_first(&self) -> bool {
        self.row_count() > 0 && self.position == Position::BeforeFirst
    }
    pub fn is_after_last(&self) -> bool {
        self.row_count() > 0 && self.position == Position::AfterLast
    }
    pub fn is_first(&self) -> bool {
        self.position == Position::OnRow(1)
    }
    pub fn is_last(&self) -> bool {
        self.row_count() > 0 && self.position == Position::OnRow(self.row_count())
    }
    pub fn is_closed(&self) -> bool {
        self.store.is_closed()
    }

    // ------------- navigation -------------
    pub fn before_first(&mut self) -> Result<()> {
        self.check_navigation("before_first", true)?;
        self.move_to(Position::BeforeFirst);
        Ok(())
    }
    pub fn after_last(&mut self) -> Result<()> {
        self.check_navigation("after_last", true)?;
        if self.row_count() > 0 {
            self.move_to(Position::AfterLast);
        }
        Ok(())
    }
    pub fn first(&mut self) -> Result<bool> {
        self.check_navigation("first", true)?;
        Ok(self.land(1))
    }
    pub fn last(&mut self) -> Result<bool> {
        self.check_navigation("last", true)?;
        Ok(self.land(self.row_count() as i64))
    }
    pub fn next(&mut self) -> Result<bool> {
        self.check_navigation("next", false)?;
        Ok(match self.position {
            Position::BeforeFirst => self.land(1),
            Position::OnRow(i) => self.land(i as i64 + 1),
            _ => false,
        })
    }
    /// Forward-only cursors may still step back from after the last row.
    pub fn previous(&mut self) -> Result<bool> {
        let scrolls = self.position != Position::AfterLast;
        self.check_navigation("previous", scrolls)?;
        Ok(match self.position {
            Position::AfterLast => self.land(self.row_count() as i64),
            Position::OnRow(i) => self.land(i as i64 - 1),
            _ => false,
        })
    }
    /// Positive counts from the start, negative from the end (`-1` is the last
    /// row), zero goes before the first row.
    pub fn absolute(&mut self, row: i64) -> Result<bool> {
        self.check_navigation("absolute", true)?;
        let n = self.row_count() as i64;
        let target = match row {
            0 => 0,
            k if k > 0 => k,
            k => n + 1 + k,
        };
        Ok(self.land(target))
    }
    /// Moves `rows` away from the current position; before-first counts as
    /// row 0 and after-last as one past the end.
    pub fn relative(&mut self, rows: i64) -> Result<bool> {
        self.check_navigation("relative", true)?;
        let n = self.row_count() as i64;
        let current = match self.position {
            Position::OnRow(i) => i as i64,
            Position::AfterLast => n + 1,
            _ => 0,
        };
        Ok(self.land(current.saturating_add(rows)))
    }
    pub fn move_to_insert_row(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.ensure_updatable("move_to_insert_row")?;
        let column_count = self.metadata().column_count();
        match self.insert.as_mut() {
            Some(session) => session.buffer.reset(),
            None => {
                let return_to = self.position;
                self.move_to(Position::InsertRow);
                self.insert = Some(InsertSession {
                    buffer: InsertRowBuffer::new(column_count),
                    return_to,
                });
            }
        }
        trace!("moved to insert row");
        Ok(())
    }
    /// Leaves the insert row for wherever the cursor was before; otherwise a no-op.
    pub fn move_to_current_row(&mut self) -> Result<()> {
        self.ensure_open()?;
        if let Some(session) = self.insert.take() {
            self.position = session.return_to;
            trace!(position=?self.position, "returned from insert row");
        }
        Ok(())
    }

    // ------------- row commits -------------
    /// Appends the insert row to the store and starts a fresh one. The cursor stays put.
    pub fn insert_row(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.ensure_updatable("insert_row")?;
        let session = self
            .insert
            .as_mut()
            .ok_or_else(|| RowfileError::state("insert_row needs the cursor on the insert row"))?;
        let row = session.buffer.to_row();
        let index = self.store.append(row)?;
        self.store.flush()?;
        session.buffer.reset();
        info!(row = index, "inserted row");
        Ok(())
    }
    /// Writes the staged edits of the current row through to the store.
    pub fn update_row(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.ensure_updatable("update_row")?;
        let index = self.current_row("update_row")?;
        if self.pending.is_empty() {
            return Ok(());
        }
        let persisted = self
            .store
            .row(index)
            .ok_or_else(|| RowfileError::state(format!("Row {} vanished", index)))?;
        let fields = self.pending.apply_to(persisted);
        let changed = self.pending.len();
        self.store.rewrite(index, fields)?;
        self.store.flush()?;
        self.pending.clear();
        info!(row = index, fields = changed, "updated row");
        Ok(())
    }
    pub fn cancel_row_updates(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.ensure_updatable("cancel_row_updates")?;
        self.current_row("cancel_row_updates")?;
        self.pending.clear();
        Ok(())
    }
    /// Drops staged edits so reads see the persisted fields again.
    pub fn refresh_row(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.current_row("refresh_row")?;
        self.pending.clear();
        Ok(())
    }

    // ------------- field access -------------
    /// What a read of `column` sees right now, staged or committed.
    pub fn field<I: ColumnIndex>(&self, column: I) -> Result<Field<'_>> {
        self.ensure_open()?;
        let ordinal = self.store.catalog().resolve(column)?.ordinal();
        match self.position {
            Position::OnRow(i) => {
                let row = self
                    .store
                    .row(i)
                    .ok_or_else(|| RowfileError::state(format!("Row {} vanished", i)))?;
                Ok(self.pending.read(ordinal, &row[ordinal - 1]))
            }
            Position::InsertRow => self
                .insert
                .as_ref()
                .and_then(|session| session.buffer.read(ordinal))
                .ok_or_else(|| {
                    RowfileError::state(format!(
                        "Column {} has not been set on the insert row",
                        ordinal
                    ))
                }),
            Position::BeforeFirst => Err(RowfileError::state("Cursor is before the first row")),
            Position::AfterLast => Err(RowfileError::state("Cursor is after the last row")),
        }
    }
    pub fn get<T: DataType, I: ColumnIndex>(&self, column: I) -> Result<T> {
        T::decode(self.field(column)?.text())
    }
    /// Stages canonical text for `column` on the current row or the insert row.
    pub fn update_text<I: ColumnIndex>(&mut self, column: I, text: impl Into<String>) -> Result<()> {
        self.ensure_open()?;
        let ordinal = self.store.catalog().resolve(column)?.ordinal();
        self.ensure_updatable("update")?;
        let text = text.into();
        match self.position {
            Position::OnRow(_) => self.pending.stage(ordinal, text),
            Position::InsertRow => match self.insert.as_mut() {
                Some(session) => session.buffer.stage(ordinal, text),
                None => return Err(RowfileError::state("Insert row has no buffer")),
            },
            Position::BeforeFirst => {
                return Err(RowfileError::state("Cursor is before the first row"));
            }
            Position::AfterLast => {
                return Err(RowfileError::state("Cursor is after the last row"));
            }
        }
        Ok(())
    }
    pub fn update<T: DataType, I: ColumnIndex>(&mut self, column: I, value: &T) -> Result<()> {
        self.update_text(column, value.encode())
    }
    /// Generic read: always the raw text, whatever was written.
    pub fn get_value<I: ColumnIndex>(&self, column: I) -> Result<String> {
        self.field(column).map(|f| f.text().to_owned())
    }
    /// Generic write: any recognized value is canonicalized to text.
    pub fn update_value<I: ColumnIndex>(&mut self, column: I, value: impl Into<Value>) -> Result<()> {
        let text = value.into().encode()?;
        self.update_text(column, text)
    }
    /// Stores an arbitrary serializable object as base64 encoded JSON.
    pub fn update_object<T: Serialize + ?Sized, I: ColumnIndex>(
        &mut self,
        column: I,
        object: &T,
    ) -> Result<()> {
        let text = encode_object(object)?;
        self.update_text(column, text)
    }
    pub fn get_object_as<T: serde::de::DeserializeOwned, I: ColumnIndex>(
        &self,
        column: I,
    ) -> Result<T> {
        decode_object(self.field(column)?.text())
    }

    /// Flushes and releases the backing file. Safe to call more than once.
    pub fn close(&mut self) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }
        self.pending.clear();
        self.insert = None;
        self.position = Position::BeforeFirst;
        self.store.close()
    }

    // ------------- policy -------------
    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(RowfileError::state("Cursor is closed"));
        }
        Ok(())
    }
    fn ensure_scrollable(&self, operation: &'static str) -> Result<()> {
        if self.scroll == ScrollSensitivity::ForwardOnly {
            return Err(RowfileError::IllegalCursorOperation {
                operation,
                restriction: Restriction::ForwardOnly,
            });
        }
        Ok(())
    }
    fn ensure_updatable(&self, operation: &'static str) -> Result<()> {
        if self.concurrency == ConcurrencyMode::ReadOnly {
            return Err(RowfileError::IllegalCursorOperation {
                operation,
                restriction: Restriction::ReadOnly,
            });
        }
        Ok(())
    }
    fn check_navigation(&self, operation: &'static str, scrolls: bool) -> Result<()> {
        self.ensure_open()?;
        if scrolls {
            self.ensure_scrollable(operation)?;
        }
        if self.position == Position::InsertRow {
            return Err(RowfileError::state(format!(
                "{} is not allowed on the insert row",
                operation
            )));
        }
        Ok(())
    }
    fn current_row(&self, operation: &str) -> Result<usize> {
        match self.position {
            Position::OnRow(i) => Ok(i),
            other => Err(RowfileError::state(format!(
                "{} needs the cursor on a row, not {:?}",
                operation, other
            ))),
        }
    }

    // ------------- movement -------------
    // Settles on row `target` (1-based) or the boundary it falls past.
    fn land(&mut self, target: i64) -> bool {
        let n = self.row_count() as i64;
        let position = if n == 0 || target < 1 {
            Position::BeforeFirst
        } else if target > n {
            Position::AfterLast
        } else {
            Position::OnRow(target as usize)
        };
        self.move_to(position);
        matches!(position, Position::OnRow(_))
    }
    fn move_to(&mut self, position: Position) {
        if position != self.position && !self.pending.is_empty() {
            trace!(discarded = self.pending.len(), "discarding staged edits");
            self.pending.clear();
        }
        trace!(from=?self.position, to=?position, "cursor moved");
        self.position = position;
    }
}
