use core::hash::BuildHasherDefault;
use std::collections::HashMap;
use std::fmt;

use seahash::SeaHasher;

use crate::error::{Result, RowfileError};

pub type LabelHasher = BuildHasherDefault<SeaHasher>;

// ------------- Column -------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    ordinal: usize,
}
impl Column {
    // Columns only come out of a catalog, so they stay consistent with it.
    fn new(name: String, ordinal: usize) -> Self {
        Self { name, ordinal }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Labels and names are the same thing for a flat file.
    pub fn label(&self) -> &str {
        &self.name
    }
    /// 1-based position of the column.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }
}
impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.ordinal)
    }
}

// ------------- ColumnRef -------------
/// How a caller names a column: by 1-based ordinal or by label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRef<'a> {
    Ordinal(usize),
    Label(&'a str),
}
/// Anything a column can be named by: `usize` ordinals, labels, or a `ColumnRef`.
pub trait ColumnIndex {
    fn column_ref(&self) -> ColumnRef<'_>;
}
impl ColumnIndex for usize {
    fn column_ref(&self) -> ColumnRef<'_> {
        ColumnRef::Ordinal(*self)
    }
}
impl ColumnIndex for &str {
    fn column_ref(&self) -> ColumnRef<'_> {
        ColumnRef::Label(self)
    }
}
impl ColumnIndex for &String {
    fn column_ref(&self) -> ColumnRef<'_> {
        ColumnRef::Label(self.as_str())
    }
}
impl ColumnIndex for ColumnRef<'_> {
    fn column_ref(&self) -> ColumnRef<'_> {
        *self
    }
}

impl fmt::Display for ColumnRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ColumnRef::Ordinal(o) => write!(f, "#{}", o),
            ColumnRef::Label(l) => write!(f, "'{}'", l),
        }
    }
}

// ------------- ColumnCatalog -------------
#[derive(Debug, Clone)]
pub struct ColumnCatalog {
    columns: Vec<Column>,
    // first occurrence wins when labels repeat
    by_label: HashMap<String, usize, LabelHasher>,
}
impl ColumnCatalog {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut columns = Vec::new();
        let mut by_label = HashMap::<String, usize, LabelHasher>::default();
        for (index, name) in names.into_iter().enumerate() {
            let name = name.into();
            by_label.entry(name.clone()).or_insert(index + 1);
            columns.push(Column::new(name, index + 1));
        }
        Self { columns, by_label }
    }
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }
    pub fn resolve_ordinal(&self, ordinal: usize) -> Result<&Column> {
        if ordinal < 1 || ordinal > self.columns.len() {
            return Err(RowfileError::IndexOutOfRange {
                ordinal,
                column_count: self.columns.len(),
            });
        }
        Ok(&self.columns[ordinal - 1])
    }
    pub fn resolve_label(&self, label: &str) -> Result<&Column> {
        match self.by_label.get(label) {
            Some(&ordinal) => Ok(&self.columns[ordinal - 1]),
            None => Err(RowfileError::UnknownColumn(label.to_owned())),
        }
    }
    pub fn resolve<I: ColumnIndex>(&self, column: I) -> Result<&Column> {
        match column.column_ref() {
            ColumnRef::Ordinal(ordinal) => self.resolve_ordinal(ordinal),
            ColumnRef::Label(label) => self.resolve_label(label),
        }
    }
    pub fn column_name(&self, ordinal: usize) -> Result<&str> {
        self.resolve_ordinal(ordinal).map(Column::name)
    }
    pub fn column_label(&self, ordinal: usize) -> Result<&str> {
        self.resolve_ordinal(ordinal).map(Column::label)
    }
}
