//! Table schemas for the flat-file record stores

use crate::error::{PocketError, PocketResult};

use super::file_io::Row;

/// Column layout of one record table
#[derive(Debug, PartialEq, Eq)]
pub struct TableSchema {
    /// Name used in logs and errors
    pub name: &'static str,
    /// Entity named in "not found" errors
    pub entity: &'static str,
    /// Header row, written once when the file is created
    pub header: &'static [&'static str],
    /// Column matched by keyed deletes and patches
    pub key_column: usize,
    /// Columns that may be changed by a field patch
    pub patchable: &'static [&'static str],
}

/// Column holding the numeric id in every schema
pub const ID_COLUMN: usize = 0;

/// Financial transactions (`data.csv`)
pub static LEDGER_SCHEMA: TableSchema = TableSchema {
    name: "ledger",
    entity: "Entry",
    header: &["id", "date", "event", "amount", "type", "remark", "category"],
    key_column: ID_COLUMN,
    patchable: &[],
};

/// To-do items (`todo_data.csv`), addressed by their external key
pub static TASK_SCHEMA: TableSchema = TableSchema {
    name: "tasks",
    entity: "Task",
    header: &[
        "id",
        "externalKey",
        "title",
        "description",
        "completed",
        "priority",
        "dueDate",
        "category",
        "createdAt",
    ],
    key_column: 1,
    patchable: &[
        "title",
        "description",
        "completed",
        "priority",
        "dueDate",
        "category",
    ],
};

impl TableSchema {
    /// Number of cells in every row
    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Header as an owned row
    pub fn header_row(&self) -> Row {
        self.header.iter().map(|h| h.to_string()).collect()
    }

    /// Name of the key column
    pub fn key_name(&self) -> &'static str {
        self.header[self.key_column]
    }

    /// Index of a column by name
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| *h == name)
    }

    /// Check a row's cell count; `line` is 0 for rows supplied by a caller
    pub fn check_row(&self, line: usize, row: &[String]) -> PocketResult<()> {
        if row.len() != self.width() {
            return Err(PocketError::malformed(
                line,
                format!(
                    "{} row has {} cells, expected {}",
                    self.name,
                    row.len(),
                    self.width()
                ),
            ));
        }
        Ok(())
    }

    /// Check that `header` is exactly this schema's header
    pub fn check_header(&self, line: usize, header: &[String]) -> PocketResult<()> {
        if header.len() != self.width() || header.iter().zip(self.header).any(|(a, b)| a != b) {
            return Err(PocketError::malformed(
                line,
                format!(
                    "{} header is [{}], expected [{}]",
                    self.name,
                    header.join(","),
                    self.header.join(",")
                ),
            ));
        }
        Ok(())
    }
}
