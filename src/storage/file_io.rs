//! File I/O utilities with atomic writes
//!
//! These are the lock-free primitives underneath the stores. Callers must
//! hold the store's [`FileLock`](super::lock::FileLock) around every call.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::PocketError;

/// One row of a table, cells as stored on disk
pub type Row = Vec<String>;

/// Read JSON from a file, returning a default value if file doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, PocketError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| PocketError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .map_err(|e| PocketError::Json(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write JSON to a file atomically (write to temp, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), PocketError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    write_atomic(path.as_ref(), |writer| {
        serde_json::to_writer_pretty(&mut *writer, data)
            .map_err(|e| PocketError::Json(format!("Failed to serialize data: {}", e)))
    })
}

/// Read every record of a CSV file, header included
///
/// Records are returned as written; the column count is not checked here.
/// Blank lines are skipped.
pub fn read_rows<P: AsRef<Path>>(path: P) -> Result<Vec<Row>, PocketError> {
    let path = path.as_ref();

    let file = File::open(path)
        .map_err(|e| PocketError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record
            .map_err(|e| PocketError::Csv(format!("Failed to read {}: {}", path.display(), e)))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Replace a CSV file with `rows` atomically
pub fn write_rows_atomic<P: AsRef<Path>>(path: P, rows: &[Row]) -> Result<(), PocketError> {
    write_atomic(path.as_ref(), |writer| {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut *writer);
        for row in rows {
            csv_writer.write_record(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    })
}

/// Append one record to the end of a CSV file
pub fn append_row<P: AsRef<Path>>(path: P, row: &[String]) -> Result<(), PocketError> {
    let path = path.as_ref();

    let file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| PocketError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(row)?;
    writer
        .flush()
        .map_err(|e| PocketError::Storage(format!("Failed to flush {}: {}", path.display(), e)))?;

    Ok(())
}

/// `<file>.tmp`, next to the target so the rename stays on one filesystem
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write through a temp sibling, sync, then rename over `path`
///
/// The file is either completely written or not modified at all.
fn write_atomic<F>(path: &Path, fill: F) -> Result<(), PocketError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), PocketError>,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            PocketError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp_path = temp_path_for(path);

    let file = File::create(&temp_path)
        .map_err(|e| PocketError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    let written = fill(&mut writer).and_then(|()| {
        writer
            .flush()
            .map_err(|e| PocketError::Storage(format!("Failed to flush data: {}", e)))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| PocketError::Storage(format!("Failed to sync data: {}", e)))
    });
    if let Err(e) = written {
        drop(writer);
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    drop(writer);

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        PocketError::Storage(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}
