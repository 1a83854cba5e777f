//! Staged edits that shadow persisted fields until committed or discarded.
//!
//! A cursor holds at most one of these at a time: [`PendingEdits`] while it
//! sits on a stored row, [`InsertRowBuffer`] while it sits on the insert row.

use std::collections::{BTreeMap, BTreeSet};

/// What a read sees for one field: the stored text or a staged replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<'a> {
    Committed(&'a str),
    Pending(&'a str),
}
impl<'a> Field<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            Field::Committed(text) | Field::Pending(text) => text,
        }
    }
    pub fn is_pending(&self) -> bool {
        matches!(self, Field::Pending(_))
    }
}

// ------------- PendingEdits -------------
/// Sparse `ordinal -> text` map attached to the current row.
#[derive(Debug, Default, Clone)]
pub struct PendingEdits {
    edits: BTreeMap<usize, String>,
}
impl PendingEdits {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn stage(&mut self, ordinal: usize, text: String) {
        self.edits.insert(ordinal, text);
    }
    /// Pending text shadows the persisted field.
    pub fn read<'a>(&'a self, ordinal: usize, persisted: &'a str) -> Field<'a> {
        match self.edits.get(&ordinal) {
            Some(text) => Field::Pending(text),
            None => Field::Committed(persisted),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
    pub fn len(&self) -> usize {
        self.edits.len()
    }
    pub fn clear(&mut self) {
        self.edits.clear();
    }
    /// Lays the staged edits over a copy of the persisted row.
    pub fn apply_to(&self, persisted: &[String]) -> Vec<String> {
        let mut row = persisted.to_vec();
        for (&ordinal, text) in &self.edits {
            if let Some(field) = row.get_mut(ordinal - 1) {
                field.clone_from(text);
            }
        }
        row
    }
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.edits.iter().map(|(&o, t)| (o, t.as_str()))
    }
}

// ------------- InsertRowBuffer -------------
/// The insert row: staged values plus which columns were written at least once.
#[derive(Debug, Clone)]
pub struct InsertRowBuffer {
    edits: PendingEdits,
    touched: BTreeSet<usize>,
    column_count: usize,
}
impl InsertRowBuffer {
    pub fn new(column_count: usize) -> Self {
        Self {
            edits: PendingEdits::new(),
            touched: BTreeSet::new(),
            column_count,
        }
    }
    pub fn stage(&mut self, ordinal: usize, text: String) {
        self.touched.insert(ordinal);
        self.edits.stage(ordinal, text);
    }
    pub fn is_touched(&self, ordinal: usize) -> bool {
        self.touched.contains(&ordinal)
    }
    /// `None` until the column has been written on this insert row.
    pub fn read(&self, ordinal: usize) -> Option<Field<'_>> {
        if !self.is_touched(ordinal) {
            return None;
        }
        Some(self.edits.read(ordinal, ""))
    }
    /// Builds the row to append; untouched columns are empty text.
    pub fn to_row(&self) -> Vec<String> {
        self.edits.apply_to(&vec![String::new(); self.column_count])
    }
    pub fn reset(&mut self) {
        self.edits.clear();
        self.touched.clear();
    }
}
