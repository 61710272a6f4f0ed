//! The internal coupling writer.

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use ic_core::{Real, TimeKey, TimeKind, ensure_finite};
use ic_table::{FieldTable, Pivot, Table};

use crate::fields::{IcFields, TimeHeightFields};
use crate::format;
use crate::{SowfaError, SowfaResult};

/// Derived seconds column added to the bound copy.
pub const T_INDEX: &str = "t_index";

/// Height label column.
pub const HEIGHT: &str = "height";

/// How row keys become solver time in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBase {
    /// Seconds since a reference instant; keys are timestamps.
    Reference(NaiveDateTime),
    /// Keys are already elapsed simulation time.
    Elapsed,
}

impl TimeBase {
    fn key_kind(&self) -> TimeKind {
        match self {
            TimeBase::Reference(_) => TimeKind::Timestamp,
            TimeBase::Elapsed => TimeKind::Elapsed,
        }
    }

    /// Solver time of one key, `None` when the key kind does not fit.
    pub fn seconds(&self, key: &TimeKey) -> Option<Real> {
        match self {
            TimeBase::Reference(dateref) => key.seconds_since(*dateref),
            TimeBase::Elapsed => key.elapsed_seconds(),
        }
    }
}

/// Window and time base for a writer. Everything defaults from the data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriterOptions {
    /// Reference instant for solver time zero. Required for timestamp keys,
    /// forbidden for elapsed keys.
    pub dateref: Option<NaiveDateTime>,
    /// Window start; the first key when `None`.
    pub datefrom: Option<TimeKey>,
    /// Window end; the last key when `None`.
    pub dateto: Option<TimeKey>,
}

/// Writes SOWFA-readable input files from one dataset.
///
/// Construction copies the rows inside `[datefrom, dateto]` and attaches the
/// solver time column `t_index`. The export methods borrow `self` immutably;
/// any zero-filled column they need lives in a per-call copy.
#[derive(Debug, Clone)]
pub struct InternalCoupling<T: Table = FieldTable> {
    dpath: PathBuf,
    table: T,
    datefrom: TimeKey,
    dateto: TimeKey,
    time_base: TimeBase,
}

impl<T: Table> InternalCoupling<T> {
    pub fn new(dpath: impl Into<PathBuf>, df: &T, options: WriterOptions) -> SowfaResult<Self> {
        let dpath = dpath.into();
        fs::create_dir_all(&dpath)?;

        let time_base = match options.dateref {
            Some(dateref) => TimeBase::Reference(dateref),
            None => TimeBase::Elapsed,
        };

        let keys = df.keys();
        let (Some(first), Some(last)) = (keys.iter().min(), keys.iter().max()) else {
            return Err(SowfaError::EmptyWindow {
                from: describe(options.datefrom),
                to: describe(options.dateto),
            });
        };
        check_kind(time_base, first, "dataset time labels")?;
        let datefrom = options.datefrom.unwrap_or(*first);
        let dateto = options.dateto.unwrap_or(*last);
        check_kind(time_base, &datefrom, "datefrom")?;
        check_kind(time_base, &dateto, "dateto")?;

        let bound = df.filter_by_key(&(datefrom..=dateto));
        if bound.is_empty() {
            return Err(SowfaError::EmptyWindow {
                from: datefrom.to_string(),
                to: dateto.to_string(),
            });
        }

        // kinds were checked above, so every key converts
        let t_index = bound
            .keys()
            .iter()
            .map(|key| time_base.seconds(key))
            .collect::<Vec<_>>();
        let table = bound.with_column(T_INDEX, t_index)?;

        tracing::info!(
            dpath = %dpath.display(),
            from = %datefrom,
            to = %dateto,
            rows = table.len(),
            "bound dataset for internal coupling"
        );
        tracing::debug!(?time_base, "solver time base");

        Ok(Self {
            dpath,
            table,
            datefrom,
            dateto,
            time_base,
        })
    }

    pub fn dpath(&self) -> &Path {
        &self.dpath
    }

    pub fn datefrom(&self) -> TimeKey {
        self.datefrom
    }

    pub fn dateto(&self) -> TimeKey {
        self.dateto
    }

    pub fn time_base(&self) -> TimeBase {
        self.time_base
    }

    /// The bound copy, including `t_index`.
    pub fn bound(&self) -> &T {
        &self.table
    }

    /// Solver time of every bound row.
    pub fn t_index(&self) -> SowfaResult<Vec<Real>> {
        complete_values(&self.table, T_INDEX, &self.all_rows(), "time window")
    }

    fn all_rows(&self) -> Vec<usize> {
        (0..self.table.len()).collect()
    }

    /// Surface boundary condition table, e.g. for `$startTime/qwall`.
    ///
    /// `fact` scales the field, e.g. `-1.0` to turn an upward heat flux into
    /// OpenFOAM's outward-positive convention.
    pub fn render_bcs(&self, fieldname: &str, fact: Real) -> SowfaResult<String> {
        let fact = ensure_finite(fact, "scale factor")?;
        let rows = self.all_rows();
        let values = complete_values(&self.table, fieldname, &rows, "time window")?;
        let ts = self.t_index()?;

        Ok(format::lines(
            ts.iter()
                .zip(&values)
                .map(|(t, v)| format::row(*t, &[fact * v])),
        ))
    }

    pub fn write_bcs(&self, fname: &str, fieldname: &str, fact: Real) -> SowfaResult<PathBuf> {
        let text = self.render_bcs(fieldname, fact)?;
        self.write_file(fname, &text)
    }

    /// Initial profile at `datefrom`, for setFieldsABL.
    ///
    /// Fields missing from the dataset are written as zeros.
    pub fn render_ics(&self, fields: &IcFields) -> SowfaResult<String> {
        let rows = self.table.rows_at(&self.datefrom);
        if rows.is_empty() {
            return Err(SowfaError::EmptySnapshot {
                at: self.datefrom.to_string(),
            });
        }

        let view = zero_filled(&self.table, &fields.names())?;
        let context = "initial snapshot";
        let zs = complete_values(&*view, HEIGHT, &rows, context)?;
        let xs = complete_values(&*view, &fields.xmom, &rows, context)?;
        let ys = complete_values(&*view, &fields.ymom, &rows, context)?;
        let temps = complete_values(&*view, &fields.temp, &rows, context)?;

        Ok(format::lines(
            (0..rows.len()).map(|i| format::row(zs[i], &[xs[i], ys[i], temps[i]])),
        ))
    }

    pub fn write_ics(&self, fname: &str, fields: &IcFields) -> SowfaResult<PathBuf> {
        let text = self.render_ics(fields)?;
        self.write_file(fname, &text)
    }

    /// Time-height source tables, for `constant/ABLProperties`.
    ///
    /// Writes `sourceHeightsMomentum` and `sourceTableMomentum{X,Y,Z}` when
    /// momentum is requested, `sourceHeightsTemperature` and
    /// `sourceTableTemperature` when temperature is. Fields missing from the
    /// dataset are written as zeros; holes in the time-height grid are errors.
    pub fn render_timeheight(&self, fields: &TimeHeightFields) -> SowfaResult<String> {
        let momentum = fields.momentum()?;
        let temp = fields.temperature();

        let requested: Vec<&str> = momentum
            .iter()
            .flat_map(|m| m.names())
            .chain(temp)
            .collect();
        if requested.is_empty() {
            return Ok(String::new());
        }

        let view = zero_filled(&self.table, &requested)?;
        let rows = self.all_rows();
        // a gap in either axis is a data hole, not a pivot key error
        complete_values(&*view, T_INDEX, &rows, "time-height grid")?;
        complete_values(&*view, HEIGHT, &rows, "time-height grid")?;
        let pivot = view.pivot(T_INDEX, HEIGHT, &requested)?;
        for field in &requested {
            let missing = pivot.grid(field).map_or(0, |g| g.missing_count());
            if missing > 0 {
                return Err(SowfaError::IncompleteData {
                    field: field.to_string(),
                    missing,
                    context: "time-height grid",
                });
            }
        }

        let mut out = String::new();
        if let Some(m) = &momentum {
            out.push_str(&heights_block("sourceHeightsMomentum", &pivot));
            out.push_str(&table_block("sourceTableMomentumX", &pivot, &m.x));
            out.push_str(&table_block("sourceTableMomentumY", &pivot, &m.y));
            out.push_str(&table_block("sourceTableMomentumZ", &pivot, &m.z));
        }
        if let Some(temp) = temp {
            out.push_str(&heights_block("sourceHeightsTemperature", &pivot));
            out.push_str(&table_block("sourceTableTemperature", &pivot, temp));
        }
        Ok(out)
    }

    pub fn write_timeheight(&self, fname: &str, fields: &TimeHeightFields) -> SowfaResult<PathBuf> {
        let text = self.render_timeheight(fields)?;
        self.write_file(fname, &text)
    }

    fn write_file(&self, fname: &str, text: &str) -> SowfaResult<PathBuf> {
        let path = self.dpath.join(fname);
        let mut out = BufWriter::new(File::create(&path)?);
        out.write_all(text.as_bytes())?;
        out.flush()?;

        tracing::info!(
            path = %path.display(),
            lines = text.lines().count(),
            "wrote SOWFA input"
        );
        Ok(path)
    }
}

fn describe(key: Option<TimeKey>) -> String {
    key.map_or_else(|| "unset".to_string(), |k| k.to_string())
}

fn check_kind(time_base: TimeBase, key: &TimeKey, what: &str) -> SowfaResult<()> {
    let expected = time_base.key_kind();
    if key.kind() == expected {
        return Ok(());
    }
    let hint = match time_base {
        TimeBase::Reference(_) => "a reference date needs timestamp labels",
        TimeBase::Elapsed => "timestamp labels need a reference date",
    };
    Err(SowfaError::TimeBaseMismatch {
        what: format!("{what} are {} but {expected} was expected ({hint})", key.kind()),
    })
}

/// `table`, or a copy of it in which every absent field is an all-zero column.
fn zero_filled<'t, T: Table>(table: &'t T, fields: &[&str]) -> SowfaResult<Cow<'t, T>> {
    let mut view = Cow::Borrowed(table);
    for &field in fields {
        if !view.has_column(field) {
            tracing::warn!(field, "field not in dataset, writing zeros");
            view = Cow::Owned(view.with_default_column(field, 0.0)?);
        }
    }
    Ok(view)
}

/// Values of `field` over `rows`, failing on any gap.
fn complete_values<T: Table>(
    table: &T,
    field: &str,
    rows: &[usize],
    context: &'static str,
) -> SowfaResult<Vec<Real>> {
    let Some(cells) = table.column(field) else {
        return Err(SowfaError::MissingField {
            field: field.to_string(),
        });
    };
    if !table.is_complete(field, rows) {
        return Err(SowfaError::IncompleteData {
            field: field.to_string(),
            missing: table.missing_count(field, rows)?,
            context,
        });
    }
    Ok(rows
        .iter()
        .map(|&row| cells[row].unwrap_or(Real::NAN))
        .collect())
}

fn heights_block(name: &str, pivot: &Pivot) -> String {
    format::block(name, pivot.col_coords.iter().map(|z| format::coordinate(*z)))
}

fn table_block(name: &str, pivot: &Pivot, field: &str) -> String {
    let rows = pivot.grid(field).map(|grid| {
        pivot
            .row_coords
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let values: Vec<Real> = grid
                    .row(i)
                    .iter()
                    .map(|cell| cell.unwrap_or(Real::NAN))
                    .collect();
                format::row(*t, &values)
            })
            .collect::<Vec<_>>()
    });
    format::block(name, rows.unwrap_or_default())
}
