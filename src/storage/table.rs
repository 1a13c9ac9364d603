//! Flat-file record table
//!
//! A [`TableStore`] owns one CSV file (header row plus data rows) and the
//! lock guarding it. Every public operation takes the lock exactly once and
//! does all of its reading and writing inside that scope; the `*_unlocked`
//! helpers are only called with the guard held.

use std::path::{Path, PathBuf};

use tracing::{debug, info, trace};

use crate::error::{PocketError, PocketResult};

use super::file_io::{append_row, read_rows, write_rows_atomic, Row};
use super::lock::{FileLock, DEFAULT_TIMEOUT};
use super::schema::{TableSchema, ID_COLUMN};

/// Header plus data rows, in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Row,
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a table from a header and rows
    pub fn new(header: Row, rows: Vec<Row>) -> Self {
        Self { header, rows }
    }

    /// A table holding only the schema's header
    pub fn empty(schema: &TableSchema) -> Self {
        Self::new(schema.header_row(), Vec::new())
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header followed by the data rows
    pub fn to_records(&self) -> Vec<Row> {
        let mut records = Vec::with_capacity(self.rows.len() + 1);
        records.push(self.header.clone());
        records.extend(self.rows.iter().cloned());
        records
    }

    /// Split raw records into header and rows, checking every width
    ///
    /// Records are numbered from 1 (the header) in errors.
    fn from_records(schema: &TableSchema, records: Vec<Row>) -> PocketResult<Self> {
        let mut iter = records.into_iter();
        let header = iter
            .next()
            .ok_or_else(|| PocketError::malformed(1, format!("{} file has no header", schema.name)))?;
        schema.check_row(1, &header)?;

        let mut rows = Vec::new();
        for (index, row) in iter.enumerate() {
            schema.check_row(index + 2, &row)?;
            rows.push(row);
        }
        Ok(Self { header, rows })
    }
}

/// Highest parseable id plus one, or 1 for a table without data rows
///
/// Cells in the id column that are not integers are skipped.
///
/// # Errors
///
/// [`PocketError::MalformedRow`] when the highest id leaves no room for
/// another one.
pub fn next_id_of(table: &Table) -> PocketResult<u64> {
    let (line, max) = table
        .rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let cell = row.get(ID_COLUMN)?;
            match cell.trim().parse::<u64>() {
                Ok(id) => Some((index + 2, id)),
                Err(_) => {
                    trace!(cell = %cell, "skipping non-numeric id");
                    None
                }
            }
        })
        .max_by_key(|(_, id)| *id)
        .unwrap_or((0, 0));

    max.checked_add(1)
        .ok_or_else(|| PocketError::malformed(line, format!("id {} has no successor", max)))
}

/// Record store backed by one CSV file
pub struct TableStore {
    path: PathBuf,
    schema: &'static TableSchema,
    lock: FileLock,
}

impl TableStore {
    /// Create a store for `path` with the default lock timeout
    pub fn new(path: PathBuf, schema: &'static TableSchema) -> Self {
        let lock = FileLock::for_data_file(&path, DEFAULT_TIMEOUT);
        Self::with_lock(path, schema, lock)
    }

    /// Create a store guarded by a caller-built lock
    pub fn with_lock(path: PathBuf, schema: &'static TableSchema, lock: FileLock) -> Self {
        Self { path, schema, lock }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Schema of this table
    pub fn schema(&self) -> &'static TableSchema {
        self.schema
    }

    /// Lock guarding the backing file
    pub fn lock(&self) -> &FileLock {
        &self.lock
    }

    /// Create the backing file with only a header if it does not exist
    pub fn ensure_initialized(&self) -> PocketResult<()> {
        let _guard = self.lock.acquire()?;
        self.init_unlocked()?;
        Ok(())
    }

    /// Snapshot of the header and all data rows
    pub fn read_all(&self) -> PocketResult<Table> {
        let _guard = self.lock.acquire()?;
        self.init_unlocked()?;
        self.load_unlocked()
    }

    /// Number of data rows
    pub fn count(&self) -> PocketResult<usize> {
        Ok(self.read_all()?.len())
    }

    /// Append one row to the end of the file
    pub fn append(&self, row: Row) -> PocketResult<()> {
        self.schema.check_row(0, &row)?;

        let _guard = self.lock.acquire()?;
        self.init_unlocked()?;
        append_row(&self.path, &row)
    }

    /// Assign the next id and append the row built from it, in one lock scope
    ///
    /// `build` receives the id and must return a full row whose id cell holds
    /// that id.
    pub fn append_with_next_id<F>(&self, build: F) -> PocketResult<u64>
    where
        F: FnOnce(u64) -> Row,
    {
        let _guard = self.lock.acquire()?;
        self.init_unlocked()?;

        let id = next_id_of(&self.load_unlocked()?)?;
        let row = build(id);
        self.schema.check_row(0, &row)?;
        if row[ID_COLUMN] != id.to_string() {
            return Err(PocketError::malformed(
                0,
                format!("id cell is {:?}, expected {}", row[ID_COLUMN], id),
            ));
        }

        append_row(&self.path, &row)?;
        debug!(table = self.schema.name, id, "row appended");
        Ok(id)
    }

    /// Replace the whole file with `table`
    ///
    /// The header must be this schema's header.
    pub fn overwrite_all(&self, table: &Table) -> PocketResult<()> {
        self.schema.check_header(0, &table.header)?;
        for row in &table.rows {
            self.schema.check_row(0, row)?;
        }

        let _guard = self.lock.acquire()?;
        write_rows_atomic(&self.path, &table.to_records())?;
        debug!(table = self.schema.name, rows = table.len(), "table rewritten");
        Ok(())
    }

    /// Remove every row whose key cell equals `key`
    ///
    /// Returns the number of rows removed; no match is not an error.
    pub fn delete_by_key(&self, key: &str) -> PocketResult<usize> {
        let key_column = self.schema.key_column;

        let _guard = self.lock.acquire()?;
        self.init_unlocked()?;

        let mut table = self.load_unlocked()?;
        let before = table.len();
        table.rows.retain(|row| row[key_column] != key);
        let removed = before - table.len();

        if removed > 0 {
            write_rows_atomic(&self.path, &table.to_records())?;
        }
        debug!(table = self.schema.name, key, removed, "delete by key");
        Ok(removed)
    }

    /// Overwrite the named fields of the row whose key cell equals `key`
    ///
    /// Fields not named are left untouched. Returns the updated row.
    ///
    /// # Errors
    ///
    /// [`PocketError::NotFound`] when no row has that key,
    /// [`PocketError::Validation`] when the table does not allow patches or a
    /// field is not patchable.
    pub fn patch_fields(&self, key: &str, updates: &[(&str, String)]) -> PocketResult<Row> {
        if self.schema.patchable.is_empty() {
            return Err(PocketError::Validation(format!(
                "{} rows cannot be patched",
                self.schema.name
            )));
        }
        if updates.is_empty() {
            return Err(PocketError::Validation("no fields to update".into()));
        }

        let mut columns = Vec::with_capacity(updates.len());
        for (field, value) in updates {
            let column = self
                .schema
                .column(field)
                .filter(|_| self.schema.patchable.iter().any(|p| p == field))
                .ok_or_else(|| {
                    PocketError::Validation(format!("field '{}' cannot be updated", field))
                })?;
            columns.push((column, value));
        }

        let key_column = self.schema.key_column;

        let _guard = self.lock.acquire()?;
        self.init_unlocked()?;

        let mut table = self.load_unlocked()?;
        let row = table
            .rows
            .iter_mut()
            .find(|row| row[key_column] == key)
            .ok_or_else(|| PocketError::NotFound {
                entity_type: self.schema.entity,
                identifier: key.to_string(),
            })?;

        for (column, value) in columns {
            row[column] = value.clone();
        }
        let updated = row.clone();

        write_rows_atomic(&self.path, &table.to_records())?;
        debug!(table = self.schema.name, key, fields = updates.len(), "row patched");
        Ok(updated)
    }

    /// Id the next appended row will receive
    pub fn next_id(&self) -> PocketResult<u64> {
        let _guard = self.lock.acquire()?;
        self.init_unlocked()?;
        next_id_of(&self.load_unlocked()?)
    }

    /// Write the header if the file is missing or empty. Lock must be held.
    fn init_unlocked(&self) -> PocketResult<bool> {
        let missing = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };
        if !missing {
            return Ok(false);
        }

        write_rows_atomic(&self.path, &[self.schema.header_row()])?;
        info!(table = self.schema.name, path = %self.path.display(), "created table file");
        Ok(true)
    }

    /// Read and validate the whole file. Lock must be held.
    fn load_unlocked(&self) -> PocketResult<Table> {
        Table::from_records(self.schema, read_rows(&self.path)?)
    }
}
