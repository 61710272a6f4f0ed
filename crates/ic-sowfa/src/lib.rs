//! ic-sowfa: SOWFA input files for internal (mesoscale-to-microscale) coupling.
//!
//! [`InternalCoupling`] binds a dataset to an output directory and a time
//! window, then writes:
//! - surface boundary conditions (`write_bcs`)
//! - initial profiles for setFieldsABL (`write_ics`)
//! - time-height source tables for ABLProperties (`write_timeheight`)

pub mod fields;
pub mod format;
pub mod writer;

pub use fields::{IcFields, Momentum, TimeHeightFields};
pub use writer::{HEIGHT, InternalCoupling, T_INDEX, TimeBase, WriterOptions};

pub type SowfaResult<T> = Result<T, SowfaError>;

#[derive(thiserror::Error, Debug)]
pub enum SowfaError {
    #[error("No data for requested period of time ({from} to {to})")]
    EmptyWindow { from: String, to: String },

    #[error("Field {field} not in dataset")]
    MissingField { field: String },

    #[error("Field {field} is not complete: {missing} missing value(s) in {context}")]
    IncompleteData {
        field: String,
        missing: usize,
        context: &'static str,
    },

    #[error("Need to specify all momentum components (missing: {missing})")]
    IncompleteMomentumSpec { missing: String },

    #[error("No rows at window start {at}")]
    EmptySnapshot { at: String },

    #[error("Time base mismatch: {what}")]
    TimeBaseMismatch { what: String },

    #[error(transparent)]
    Core(#[from] ic_core::CoreError),

    #[error("Table error: {0}")]
    Table(#[from] ic_table::TableError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
