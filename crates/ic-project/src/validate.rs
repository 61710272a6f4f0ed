//! Job validation logic.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use ic_core::{TimeKey, TimeKind, parse_datetime};

use crate::schema::{DerivedDef, ExportDef, Job};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },

    #[error("Job has no exports")]
    NoExports,

    #[error("Duplicate output filename: {filename}")]
    DuplicateFilename { filename: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Need to specify all momentum components in {filename}")]
    PartialMomentum { filename: String },

    #[error("Reference date {dateref} given for an elapsed-time dataset")]
    ReferenceWithElapsed { dateref: String },

    #[error("Timestamp dataset needs a reference date (dateref)")]
    MissingReference,
}

/// Parsed window and time base of a job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub dateref: Option<NaiveDateTime>,
    pub datefrom: Option<TimeKey>,
    pub dateto: Option<TimeKey>,
}

pub fn validate_job(job: &Job) -> Result<(), ValidationError> {
    if job.version > crate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: job.version,
        });
    }
    if job.exports.is_empty() {
        return Err(ValidationError::NoExports);
    }

    let window = parse_window(job)?;
    if let (Some(from), Some(to)) = (window.datefrom, window.dateto)
        && from > to
    {
        return Err(ValidationError::InvalidValue {
            field: "datefrom".to_string(),
            value: from.to_string(),
            reason: format!("after dateto {to}"),
        });
    }

    for derived in &job.derived {
        if let DerivedDef::Theta { p0, .. } = derived
            && !(p0.is_finite() && *p0 > 0.0)
        {
            return Err(ValidationError::InvalidValue {
                field: "p0".to_string(),
                value: p0.to_string(),
                reason: "must be positive".to_string(),
            });
        }
    }

    let mut filenames = HashSet::new();
    for export in &job.exports {
        let filename = export.filename();
        if filename.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "filename".to_string(),
                value: filename.to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if !filenames.insert(filename) {
            return Err(ValidationError::DuplicateFilename {
                filename: filename.to_string(),
            });
        }
        validate_export(export)?;
    }

    Ok(())
}

fn validate_export(export: &ExportDef) -> Result<(), ValidationError> {
    match export {
        ExportDef::BoundaryConditions { scale, .. } if !scale.is_finite() => {
            Err(ValidationError::InvalidValue {
                field: "scale".to_string(),
                value: scale.to_string(),
                reason: "must be finite".to_string(),
            })
        }
        ExportDef::TimeHeight {
            filename,
            xmom,
            ymom,
            zmom,
            ..
        } => {
            let given = [xmom, ymom, zmom].iter().filter(|c| c.is_some()).count();
            if given != 0 && given != 3 {
                return Err(ValidationError::PartialMomentum {
                    filename: filename.clone(),
                });
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Parse `dateref`, `datefrom` and `dateto` against the dataset's time kind.
pub fn parse_window(job: &Job) -> Result<Window, ValidationError> {
    let kind = job.dataset.time_kind;

    let dateref = match (&job.dateref, kind) {
        (Some(text), TimeKind::Timestamp) => Some(
            parse_datetime(text).map_err(|e| invalid_date("dateref", text, e.to_string()))?,
        ),
        (Some(text), TimeKind::Elapsed) => {
            return Err(ValidationError::ReferenceWithElapsed {
                dateref: text.clone(),
            });
        }
        (None, TimeKind::Timestamp) => return Err(ValidationError::MissingReference),
        (None, TimeKind::Elapsed) => None,
    };

    let key = |field: &str, text: &Option<String>| -> Result<Option<TimeKey>, ValidationError> {
        text.as_deref()
            .map(|t| TimeKey::parse(t, kind).map_err(|e| invalid_date(field, t, e.to_string())))
            .transpose()
    };

    Ok(Window {
        dateref,
        datefrom: key("datefrom", &job.datefrom)?,
        dateto: key("dateto", &job.dateto)?,
    })
}

fn invalid_date(field: &str, value: &str, reason: String) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason,
    }
}
