// used for persistence
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use tracing::{debug, trace, warn};

use crate::catalog::ColumnCatalog;
use crate::error::{Result, RowfileError};

pub const DEFAULT_DELIMITER: u8 = b',';

/// How the backing file is laid out: field delimiter and text encoding.
#[derive(Debug, Clone, Copy)]
pub struct StoreFormat {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
}
impl Default for StoreFormat {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            encoding: UTF_8,
        }
    }
}
impl StoreFormat {
    /// Resolves a WHATWG encoding label such as `utf-8`, `latin1` or `utf-16le`.
    pub fn with_encoding_label(mut self, label: &str) -> Result<Self> {
        self.encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| RowfileError::Config(format!("Unknown text encoding '{}'", label)))?;
        Ok(self)
    }
    pub fn with_delimiter(mut self, delimiter: char) -> Result<Self> {
        if !delimiter.is_ascii() || delimiter == '"' || delimiter == '\n' || delimiter == '\r' {
            return Err(RowfileError::Config(format!(
                "Unusable field delimiter {:?}",
                delimiter
            )));
        }
        self.delimiter = delimiter as u8;
        Ok(self)
    }
    fn decode(&self, bytes: &[u8], path: &Path) -> String {
        let (text, used, had_errors) = self.encoding.decode(bytes);
        if had_errors {
            warn!(path=%path.display(), encoding=used.name(), "malformed bytes replaced while decoding");
        }
        text.into_owned()
    }
    // encoding_rs only encodes into UTF-8 for the UTF-16 family, so those are done by hand
    fn encode(&self, text: &str, path: &Path) -> Vec<u8> {
        if self.encoding == UTF_16LE {
            return text.encode_utf16().flat_map(u16::to_le_bytes).collect();
        }
        if self.encoding == UTF_16BE {
            return text.encode_utf16().flat_map(u16::to_be_bytes).collect();
        }
        let (bytes, used, had_unmappable) = self.encoding.encode(text);
        if had_unmappable {
            warn!(path=%path.display(), encoding=used.name(), "unmappable characters written as numeric references");
        }
        bytes.into_owned()
    }
}

// ------------- RowStore -------------
/// Header plus ordered rows, held in memory and mirrored to one delimited file.
#[derive(Debug)]
pub struct RowStore {
    path: PathBuf,
    format: StoreFormat,
    catalog: ColumnCatalog,
    rows: Vec<Vec<String>>,
    // released exactly once, on close
    file: Option<File>,
    dirty: bool,
}

impl RowStore {
    pub fn load(path: impl AsRef<Path>, format: StoreFormat) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new().read(true).write(true).open(&path)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        let text = format.decode(&bytes, &path);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(format.delimiter)
            .has_headers(true)
            .from_reader(text.as_bytes());
        let header = reader.headers()?.clone();
        if header.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{} has no header line", path.display()),
            )
            .into());
        }
        let catalog = ColumnCatalog::new(header.iter());
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_owned).collect());
        }
        debug!(path=%path.display(), columns=catalog.column_count(), rows=rows.len(), encoding=format.encoding.name(), "loaded row store");
        Ok(Self {
            path,
            format,
            catalog,
            rows,
            file: Some(file),
            dirty: false,
        })
    }

    /// Writes a header-only file, replacing whatever was at `path`.
    pub fn create<I, S>(path: impl AsRef<Path>, format: StoreFormat, column_names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path = path.as_ref().to_path_buf();
        let catalog = ColumnCatalog::new(column_names);
        if catalog.column_count() == 0 {
            return Err(RowfileError::Config(
                "A row store needs at least one column".to_owned(),
            ));
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        let mut store = Self {
            path,
            format,
            catalog,
            rows: Vec::new(),
            file: Some(file),
            dirty: true,
        };
        store.flush()?;
        debug!(path=%store.path.display(), columns=store.catalog.column_count(), "created row store");
        Ok(store)
    }

    pub fn catalog(&self) -> &ColumnCatalog {
        &self.catalog
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    pub fn format(&self) -> StoreFormat {
        self.format
    }
    pub fn encoding_name(&self) -> &'static str {
        self.format.encoding.name()
    }
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
    /// Persisted fields of the 1-based row `index`.
    pub fn row(&self, index: usize) -> Option<&[String]> {
        index
            .checked_sub(1)
            .and_then(|i| self.rows.get(i))
            .map(Vec::as_slice)
    }
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    /// Adds a row after the last one and returns its 1-based index.
    pub fn append(&mut self, row: Vec<String>) -> Result<usize> {
        self.ensure_open()?;
        self.check_width(&row)?;
        self.rows.push(row);
        self.dirty = true;
        trace!(row = self.rows.len(), "appended row");
        Ok(self.rows.len())
    }

    pub fn rewrite(&mut self, index: usize, fields: Vec<String>) -> Result<()> {
        self.ensure_open()?;
        self.check_width(&fields)?;
        let row_count = self.rows.len();
        let slot = index
            .checked_sub(1)
            .and_then(|i| self.rows.get_mut(i))
            .ok_or_else(|| {
                RowfileError::state(format!("No row {} to rewrite ({} rows)", index, row_count))
            })?;
        *slot = fields;
        self.dirty = true;
        trace!(row = index, "rewrote row");
        Ok(())
    }

    /// Materializes the in-memory rows to the backing file; a clean store is left alone.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let bytes = self.render()?;
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| RowfileError::state("Row store is closed"))?;
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&bytes)?;
        file.flush()?;
        self.dirty = false;
        debug!(path=%self.path.display(), rows=self.rows.len(), bytes=bytes.len(), "flushed row store");
        Ok(())
    }

    /// Flushes and releases the file; later calls do nothing.
    pub fn close(&mut self) -> Result<()> {
        if self.file.is_none() {
            return Ok(());
        }
        let flushed = self.flush();
        self.file = None;
        debug!(path=%self.path.display(), "closed row store");
        flushed
    }

    fn render(&self) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.format.delimiter)
            .from_writer(Vec::new());
        writer.write_record(self.catalog.names())?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        let buffer = writer.into_inner().map_err(|e| RowfileError::Io(e.into_error()))?;
        let text = String::from_utf8(buffer)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(self.format.encode(&text, &self.path))
    }
    fn ensure_open(&self) -> Result<()> {
        if self.file.is_none() {
            return Err(RowfileError::state("Row store is closed"));
        }
        Ok(())
    }
    fn check_width(&self, row: &[String]) -> Result<()> {
        if row.len() != self.catalog.column_count() {
            return Err(RowfileError::state(format!(
                "Row has {} fields but the store has {} columns",
                row.len(),
                self.catalog.column_count()
            )));
        }
        Ok(())
    }
}

impl Drop for RowStore {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(path=%self.path.display(), error=%e, "could not flush row store on drop");
        }
    }
}
