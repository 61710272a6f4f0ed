//! ic-project: coupling job file format and validation.

pub mod schema;
pub mod validate;

pub use schema::*;
pub use validate::{ValidationError, Window, parse_window, validate_job};

pub const LATEST_VERSION: u32 = 1;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &std::path::Path) -> ProjectResult<Job> {
    let content = std::fs::read_to_string(path)?;
    let job: Job = serde_yaml::from_str(&content)?;
    validate_job(&job)?;
    Ok(job)
}

pub fn save_yaml(path: &std::path::Path, job: &Job) -> ProjectResult<()> {
    validate_job(job)?;
    let content = serde_yaml::to_string(job)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ProjectResult<Job> {
    let content = std::fs::read_to_string(path)?;
    let job: Job = serde_json::from_str(&content)?;
    validate_job(&job)?;
    Ok(job)
}

pub fn save_json(path: &std::path::Path, job: &Job) -> ProjectResult<()> {
    validate_job(job)?;
    let content = serde_json::to_string_pretty(job)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load by extension: `.json` is JSON, anything else YAML.
pub fn load(path: &std::path::Path) -> ProjectResult<Job> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_json(path),
        _ => load_yaml(path),
    }
}
