//! Shared application service layer for internal coupling jobs.
//!
//! Loads job files and datasets, runs the exports a job names and
//! summarises datasets for the CLI.

pub mod error;
pub mod job_service;

pub use error::{AppError, AppResult};
pub use job_service::{
    ColumnSummary, DatasetSummary, ExportOutcome, JobReport, inspect_dataset, load_dataset,
    load_job, resolve_path, run_job, run_job_file, writer_options,
};
