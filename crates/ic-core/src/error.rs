use thiserror::Error;

use crate::time::TimeKind;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Cannot parse '{value}' as {kind} time")]
    InvalidTime { value: String, kind: TimeKind },
}
