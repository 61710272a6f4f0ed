//! Job loading, execution, and dataset introspection.

use std::path::{Path, PathBuf};

use ic_core::{Real, TimeKey, TimeKind, is_missing, sorted_unique};
use ic_project::schema::{DerivedDef, ExportDef, Job};
use ic_project::{ProjectError, parse_window, validate_job};
use ic_sowfa::{HEIGHT, IcFields, InternalCoupling, TimeHeightFields, WriterOptions};
use ic_table::{CsvOptions, FieldTable, Table, derive, load_csv};

use crate::error::{AppError, AppResult};

/// One file written by a job.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    pub filename: String,
    pub kind: &'static str,
    pub path: PathBuf,
}

/// What a job run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub name: String,
    pub output_dir: PathBuf,
    pub datefrom: TimeKey,
    pub dateto: TimeKey,
    /// Rows inside the window.
    pub rows: usize,
    pub exports: Vec<ExportOutcome>,
}

/// Missing-cell count of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub missing: usize,
}

/// Overview of a loaded dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub rows: usize,
    pub time_kind: Option<TimeKind>,
    pub first: Option<TimeKey>,
    pub last: Option<TimeKey>,
    /// Distinct instants.
    pub times: usize,
    /// Distinct heights, ascending; empty without a height column.
    pub heights: Vec<Real>,
    pub columns: Vec<ColumnSummary>,
}

/// Load and validate a job file (YAML, or JSON by extension).
pub fn load_job(path: &Path) -> AppResult<Job> {
    ic_project::load(path).map_err(|err| match err {
        ProjectError::Io(source) => AppError::JobFileRead {
            path: path.to_path_buf(),
            source,
        },
        other => other.into(),
    })
}

/// `path` itself when absolute, otherwise relative to `base_dir`.
pub fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Load the job's dataset and compute its derived columns.
pub fn load_dataset(job: &Job, base_dir: &Path) -> AppResult<FieldTable> {
    let path = resolve_path(base_dir, &job.dataset.path);
    let options = CsvOptions {
        time_column: job.dataset.time_column.clone(),
        time_kind: job.dataset.time_kind,
    };
    let table = load_csv(&path, &options).map_err(|e| AppError::Dataset {
        path: path.clone(),
        message: e.to_string(),
    })?;

    job.derived
        .iter()
        .try_fold(table, |table, def| apply_derived(&table, def))
}

fn apply_derived(table: &FieldTable, def: &DerivedDef) -> AppResult<FieldTable> {
    let table = match def {
        DerivedDef::WindSpeedDirection { u, v, wspd, wdir } => {
            derive::add_wind_speed_direction(table, u, v, wspd, wdir)?
        }
        DerivedDef::VelocityComponents { wspd, wdir, u, v } => {
            derive::add_velocity_components(table, wspd, wdir, u, v)?
        }
        DerivedDef::Theta {
            temperature,
            pressure,
            p0,
            output,
        } => derive::add_potential_temperature(table, temperature, pressure, *p0, output)?,
    };
    tracing::debug!(?def, "derived columns");
    Ok(table)
}

/// Writer window and time base from the job's date fields.
pub fn writer_options(job: &Job) -> AppResult<WriterOptions> {
    let window = parse_window(job)?;
    Ok(WriterOptions {
        dateref: window.dateref,
        datefrom: window.datefrom,
        dateto: window.dateto,
    })
}

/// Run every export of `job` in order. Relative paths resolve against
/// `base_dir`; the first failing export stops the run.
pub fn run_job(job: &Job, base_dir: &Path) -> AppResult<JobReport> {
    validate_job(job)?;
    let table = load_dataset(job, base_dir)?;
    let options = writer_options(job)?;
    let output_dir = resolve_path(base_dir, &job.output_dir);

    let writer = InternalCoupling::new(&output_dir, &table, options)?;
    tracing::info!(job = %job.name, exports = job.exports.len(), "running job");

    let mut exports = Vec::with_capacity(job.exports.len());
    for export in &job.exports {
        let path = run_export(&writer, export).map_err(|e| AppError::Export {
            filename: export.filename().to_string(),
            source: e,
        })?;
        exports.push(ExportOutcome {
            filename: export.filename().to_string(),
            kind: export.kind(),
            path,
        });
    }

    Ok(JobReport {
        name: job.name.clone(),
        output_dir,
        datefrom: writer.datefrom(),
        dateto: writer.dateto(),
        rows: writer.bound().len(),
        exports,
    })
}

/// Load and run a job file; paths in it are relative to its directory.
pub fn run_job_file(path: &Path) -> AppResult<JobReport> {
    let job = load_job(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    run_job(&job, base_dir)
}

fn run_export(
    writer: &InternalCoupling<FieldTable>,
    export: &ExportDef,
) -> ic_sowfa::SowfaResult<PathBuf> {
    match export {
        ExportDef::BoundaryConditions {
            filename,
            field,
            scale,
        } => writer.write_bcs(filename, field, *scale),
        ExportDef::InitialConditions {
            filename,
            xmom,
            ymom,
            temp,
        } => {
            let fields = IcFields {
                xmom: xmom.clone(),
                ymom: ymom.clone(),
                temp: temp.clone(),
            };
            writer.write_ics(filename, &fields)
        }
        ExportDef::TimeHeight {
            filename,
            xmom,
            ymom,
            zmom,
            temp,
        } => {
            let fields = TimeHeightFields {
                xmom: xmom.clone(),
                ymom: ymom.clone(),
                zmom: zmom.clone(),
                temp: temp.clone(),
            };
            writer.write_timeheight(filename, &fields)
        }
    }
}

pub fn inspect_dataset(table: &FieldTable) -> DatasetSummary {
    let heights = table
        .column(HEIGHT)
        .map(|cells| sorted_unique(cells.iter().flatten().copied()))
        .unwrap_or_default();

    let mut times = table.keys().to_vec();
    times.dedup();

    let columns = table
        .column_names()
        .into_iter()
        .map(|name| ColumnSummary {
            name: name.to_string(),
            missing: table
                .column(name)
                .map_or(0, |cells| cells.iter().filter(|c| is_missing(**c)).count()),
        })
        .collect();

    DatasetSummary {
        rows: table.len(),
        time_kind: table.time_kind(),
        first: table.first_key(),
        last: table.last_key(),
        times: times.len(),
        heights,
        columns,
    }
}
