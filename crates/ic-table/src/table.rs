//! Capability trait consumed by the coupling writer.

use std::ops::RangeInclusive;

use ic_core::{Real, TimeKey, is_missing};

use crate::pivot::{self, Pivot};
use crate::{TableError, TableResult};

/// A labeled 2-D table: one time key per row, named numeric columns.
///
/// Implementations are values, not views. Every transforming method returns a
/// new table and leaves `self` untouched, so a caller's dataset is never
/// modified by the writer that wraps it.
pub trait Table: Clone {
    /// Row time keys, in row order.
    fn keys(&self) -> &[TimeKey];

    /// Column names in a stable order.
    fn column_names(&self) -> Vec<&str>;

    /// Cells of a column, `None` when the column does not exist.
    fn column(&self, name: &str) -> Option<&[Option<Real>]>;

    /// Rows whose key lies in the closed range.
    fn filter_by_key(&self, range: &RangeInclusive<TimeKey>) -> Self;

    /// A copy with `name` set to `values`, replacing any existing column.
    fn with_column(&self, name: &str, values: Vec<Option<Real>>) -> TableResult<Self>;

    fn len(&self) -> usize {
        self.keys().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// A copy where `name` exists, filled with `fill` if it was absent.
    fn with_default_column(&self, name: &str, fill: Real) -> TableResult<Self> {
        if self.has_column(name) {
            return Ok(self.clone());
        }
        self.with_column(name, vec![Some(fill); self.len()])
    }

    /// Indices of rows whose key equals `key` exactly.
    fn rows_at(&self, key: &TimeKey) -> Vec<usize> {
        self.keys()
            .iter()
            .enumerate()
            .filter_map(|(i, k)| (k == key).then_some(i))
            .collect()
    }

    /// Number of missing cells of `field` over `rows`.
    fn missing_count(&self, field: &str, rows: &[usize]) -> TableResult<usize> {
        let cells = self
            .column(field)
            .ok_or_else(|| TableError::MissingColumn {
                name: field.to_string(),
            })?;
        Ok(rows
            .iter()
            .filter(|&&row| cells.get(row).is_none_or(|cell| is_missing(*cell)))
            .count())
    }

    /// True when `field` exists and has no missing cell over `rows`.
    fn is_complete(&self, field: &str, rows: &[usize]) -> bool {
        matches!(self.missing_count(field, rows), Ok(0))
    }

    /// Reshape into one dense `row_key × col_key` grid per field.
    fn pivot(&self, row_key: &str, col_key: &str, fields: &[&str]) -> TableResult<Pivot> {
        pivot::pivot_columns(
            |name| self.column(name),
            self.len(),
            row_key,
            col_key,
            fields,
        )
    }
}
