//! Error types for the ic-app service layer.

use std::path::PathBuf;

/// Application error type wrapping the backend crates for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Job error: {0}")]
    Job(String),

    #[error("Failed to read job file: {path}")]
    JobFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Job validation failed: {0}")]
    Validation(String),

    #[error("Dataset error in {path}: {message}")]
    Dataset { path: PathBuf, message: String },

    #[error("Table error: {0}")]
    Table(String),

    #[error("Export {filename} failed: {source}")]
    Export {
        filename: String,
        #[source]
        source: ic_sowfa::SowfaError,
    },

    #[error("Writer error: {0}")]
    Writer(#[from] ic_sowfa::SowfaError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ic-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<ic_project::ProjectError> for AppError {
    fn from(err: ic_project::ProjectError) -> Self {
        match err {
            ic_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Job(other.to_string()),
        }
    }
}

impl From<ic_project::ValidationError> for AppError {
    fn from(err: ic_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<ic_table::TableError> for AppError {
    fn from(err: ic_table::TableError) -> Self {
        AppError::Table(err.to_string())
    }
}

impl From<ic_core::CoreError> for AppError {
    fn from(err: ic_core::CoreError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}
