//! Dense reconstruction of a sparse (row key, column key, field) relation.

use std::collections::BTreeMap;

use ic_core::{Real, position_in_sorted, sorted_unique};

use crate::{TableError, TableResult};

/// Row-major `nrows × ncols` grid of optional cells.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseGrid {
    nrows: usize,
    ncols: usize,
    cells: Vec<Option<Real>>,
}

impl DenseGrid {
    pub fn empty(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            cells: vec![None; nrows * ncols],
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Real> {
        if row >= self.nrows || col >= self.ncols {
            return None;
        }
        self.cells[row * self.ncols + col]
    }

    pub fn row(&self, row: usize) -> &[Option<Real>] {
        let start = row * self.ncols;
        &self.cells[start..start + self.ncols]
    }

    fn set(&mut self, row: usize, col: usize, value: Option<Real>) {
        self.cells[row * self.ncols + col] = value;
    }

    /// Cells that are absent or NaN.
    pub fn missing_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| ic_core::is_missing(**c))
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_count() == 0
    }
}

/// Result of a pivot: shared axes plus one grid per requested field.
#[derive(Debug, Clone, PartialEq)]
pub struct Pivot {
    /// Distinct row-key values, ascending.
    pub row_coords: Vec<Real>,
    /// Distinct column-key values, ascending.
    pub col_coords: Vec<Real>,
    grids: BTreeMap<String, DenseGrid>,
}

impl Pivot {
    pub fn grid(&self, field: &str) -> Option<&DenseGrid> {
        self.grids.get(field)
    }
}

pub(crate) fn pivot_columns<'a, F>(
    column: F,
    nrows: usize,
    row_key: &str,
    col_key: &str,
    fields: &[&str],
) -> TableResult<Pivot>
where
    F: Fn(&str) -> Option<&'a [Option<Real>]>,
{
    let require = |name: &str| {
        column(name).ok_or_else(|| TableError::MissingColumn {
            name: name.to_string(),
        })
    };
    let row_cells = require(row_key)?;
    let col_cells = require(col_key)?;

    let key_values = |cells: &[Option<Real>], name: &str| -> TableResult<Vec<Real>> {
        (0..nrows)
            .map(|row| match cells.get(row).copied().flatten() {
                Some(v) if !v.is_nan() => Ok(v),
                _ => Err(TableError::MissingKey {
                    column: name.to_string(),
                    row,
                }),
            })
            .collect()
    };
    let row_values = key_values(row_cells, row_key)?;
    let col_values = key_values(col_cells, col_key)?;

    let row_coords = sorted_unique(row_values.iter().copied());
    let col_coords = sorted_unique(col_values.iter().copied());

    // Cell position per source row; a second hit on a cell is ambiguous.
    let mut placement = Vec::with_capacity(nrows);
    let mut seen = vec![false; row_coords.len() * col_coords.len()];
    for (row, (&rv, &cv)) in row_values.iter().zip(&col_values).enumerate() {
        let missing_key = |column: &str| TableError::MissingKey {
            column: column.to_string(),
            row,
        };
        let r = position_in_sorted(&row_coords, rv).ok_or_else(|| missing_key(row_key))?;
        let c = position_in_sorted(&col_coords, cv).ok_or_else(|| missing_key(col_key))?;
        let slot = r * col_coords.len() + c;
        if seen[slot] {
            return Err(TableError::DuplicateEntry {
                row_key: row_key.to_string(),
                row_value: rv,
                col_key: col_key.to_string(),
                col_value: cv,
            });
        }
        seen[slot] = true;
        placement.push((r, c));
    }

    let mut grids = BTreeMap::new();
    for &field in fields {
        let cells = require(field)?;
        let mut grid = DenseGrid::empty(row_coords.len(), col_coords.len());
        for (row, &(r, c)) in placement.iter().enumerate() {
            grid.set(r, c, cells.get(row).copied().flatten());
        }
        grids.insert(field.to_string(), grid);
    }

    tracing::debug!(
        rows = row_coords.len(),
        cols = col_coords.len(),
        fields = fields.len(),
        "pivoted {} x {}",
        row_key,
        col_key
    );

    Ok(Pivot {
        row_coords,
        col_coords,
        grids,
    })
}
