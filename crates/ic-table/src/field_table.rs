//! In-memory long-format table.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use ic_core::{Real, TimeKey, TimeKind};

use crate::table::Table;
use crate::{TableError, TableResult};

/// Rows keyed by time, columns keyed by name.
///
/// Rows are kept in ascending key order. Rows that share a key (one per
/// height, typically) keep the order they were given in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldTable {
    keys: Vec<TimeKey>,
    columns: BTreeMap<String, Vec<Option<Real>>>,
}

impl FieldTable {
    /// Build a table from keys and named columns of the same length.
    pub fn from_columns<I, S>(keys: Vec<TimeKey>, columns: I) -> TableResult<Self>
    where
        I: IntoIterator<Item = (S, Vec<Option<Real>>)>,
        S: Into<String>,
    {
        if let Some(first) = keys.first() {
            let kind = first.kind();
            if keys.iter().any(|k| k.kind() != kind) {
                return Err(TableError::MixedTimeKeys);
            }
        }

        let mut map = BTreeMap::new();
        for (name, values) in columns {
            let name = name.into();
            check_len(&name, keys.len(), values.len())?;
            map.insert(name, values);
        }

        let mut order: Vec<usize> = (0..keys.len()).collect();
        order.sort_by_key(|&i| keys[i]);
        let sorted = order.iter().enumerate().all(|(pos, &i)| pos == i);

        let table = Self {
            keys,
            columns: map,
        };
        Ok(if sorted { table } else { table.select(&order) })
    }

    /// Build a table from fully populated columns.
    pub fn from_dense<I, S>(keys: Vec<TimeKey>, columns: I) -> TableResult<Self>
    where
        I: IntoIterator<Item = (S, Vec<Real>)>,
        S: Into<String>,
    {
        Self::from_columns(
            keys,
            columns
                .into_iter()
                .map(|(name, values)| (name, values.into_iter().map(Some).collect())),
        )
    }

    /// Kind of the row keys, `None` for an empty table.
    pub fn time_kind(&self) -> Option<TimeKind> {
        self.keys.first().map(TimeKey::kind)
    }

    pub fn first_key(&self) -> Option<TimeKey> {
        self.keys.first().copied()
    }

    pub fn last_key(&self) -> Option<TimeKey> {
        self.keys.last().copied()
    }

    /// A table made of the given rows, in the given order.
    pub fn select(&self, rows: &[usize]) -> Self {
        Self {
            keys: rows.iter().map(|&i| self.keys[i]).collect(),
            columns: self
                .columns
                .iter()
                .map(|(name, cells)| (name.clone(), rows.iter().map(|&i| cells[i]).collect()))
                .collect(),
        }
    }
}

fn check_len(column: &str, expected: usize, found: usize) -> TableResult<()> {
    if expected != found {
        return Err(TableError::LengthMismatch {
            column: column.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

impl Table for FieldTable {
    fn keys(&self) -> &[TimeKey] {
        &self.keys
    }

    fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    fn column(&self, name: &str) -> Option<&[Option<Real>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    fn filter_by_key(&self, range: &RangeInclusive<TimeKey>) -> Self {
        let rows: Vec<usize> = self
            .keys
            .iter()
            .enumerate()
            .filter_map(|(i, k)| range.contains(k).then_some(i))
            .collect();
        self.select(&rows)
    }

    fn with_column(&self, name: &str, values: Vec<Option<Real>>) -> TableResult<Self> {
        check_len(name, self.keys.len(), values.len())?;
        let mut out = self.clone();
        out.columns.insert(name.to_string(), values);
        Ok(out)
    }
}
