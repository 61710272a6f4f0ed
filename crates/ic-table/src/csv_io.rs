//! CSV loading for long-format datasets.
//!
//! Layout: a header row, one time column, any number of numeric columns.
//! Rows for several heights at the same instant simply repeat the time label.
//!
//! ```text
//! datetime,height,u,v,theta
//! 2013-11-08 00:00:00,10,3.2,-1.1,288.4
//! 2013-11-08 00:00:00,20,4.0,-1.0,288.9
//! ```

use std::io::Read;
use std::path::Path;

use ic_core::{Real, TimeKey, TimeKind};

use crate::field_table::FieldTable;
use crate::table::Table;
use crate::{TableError, TableResult};

/// How to read the time column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvOptions {
    /// Name of the time column; the first column when `None`.
    pub time_column: Option<String>,
    pub time_kind: TimeKind,
}

impl CsvOptions {
    pub fn elapsed() -> Self {
        Self {
            time_kind: TimeKind::Elapsed,
            ..Default::default()
        }
    }
}

const MISSING_MARKERS: &[&str] = &["", "nan", "NaN", "NAN", "NA", "N/A", "null"];

pub fn load_csv(path: &Path, options: &CsvOptions) -> TableResult<FieldTable> {
    let file = std::fs::File::open(path)?;
    let table = read_csv(file, options)?;
    tracing::info!(
        path = %path.display(),
        rows = table.keys().len(),
        "loaded dataset"
    );
    Ok(table)
}

pub fn read_csv<R: Read>(reader: R, options: &CsvOptions) -> TableResult<FieldTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(TableError::InvalidHeader {
            what: "no columns".to_string(),
        });
    }

    let time_idx = match &options.time_column {
        Some(name) => headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| TableError::InvalidHeader {
                what: format!("time column '{name}' not found"),
            })?,
        None => 0,
    };
    for (i, name) in headers.iter().enumerate() {
        if headers[..i].contains(name) {
            return Err(TableError::InvalidHeader {
                what: format!("duplicate column '{name}'"),
            });
        }
    }

    let mut keys = Vec::new();
    let mut columns: Vec<Vec<Option<Real>>> = vec![Vec::new(); headers.len()];

    for record in rdr.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let parse_err = |column: usize, value: &str| TableError::Parse {
            line,
            column: headers[column].clone(),
            value: value.to_string(),
        };

        for (idx, cell) in record.iter().enumerate() {
            if idx == time_idx {
                let key =
                    TimeKey::parse(cell, options.time_kind).map_err(|_| parse_err(idx, cell))?;
                keys.push(key);
            } else if MISSING_MARKERS.contains(&cell) {
                columns[idx].push(None);
            } else {
                let value: Real = cell.parse().map_err(|_| parse_err(idx, cell))?;
                columns[idx].push(Some(value));
            }
        }
    }

    let named = headers
        .into_iter()
        .zip(columns)
        .enumerate()
        .filter(|(idx, _)| *idx != time_idx)
        .map(|(_, pair)| pair);
    FieldTable::from_columns(keys, named)
}
