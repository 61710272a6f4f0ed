//! ic-table: long-format time/height tables.
//!
//! The writer only talks to the [`Table`] capability trait; [`FieldTable`]
//! is the in-memory implementation, loaded from CSV by [`csv_io`].

pub mod csv_io;
pub mod derive;
pub mod field_table;
pub mod pivot;
pub mod table;

pub use csv_io::{CsvOptions, load_csv, read_csv};
pub use field_table::FieldTable;
pub use pivot::{DenseGrid, Pivot};
pub use table::Table;

pub type TableResult<T> = Result<T, TableError>;

#[derive(thiserror::Error, Debug)]
pub enum TableError {
    #[error("Column not found: {name}")]
    MissingColumn { name: String },

    #[error("Column {column} has {found} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Table mixes timestamp and elapsed-time keys")]
    MixedTimeKeys,

    #[error("Missing pivot key in column {column} at row {row}")]
    MissingKey { column: String, row: usize },

    #[error("Duplicate entry for ({row_key}={row_value}, {col_key}={col_value})")]
    DuplicateEntry {
        row_key: String,
        row_value: f64,
        col_key: String,
        col_value: f64,
    },

    #[error("Invalid CSV header: {what}")]
    InvalidHeader { what: String },

    #[error("Cannot parse '{value}' in column {column} (line {line})")]
    Parse {
        line: u64,
        column: String,
        value: String,
    },

    #[error("Time error: {0}")]
    Time(#[from] ic_core::CoreError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
