//! Job file schema definitions.

use std::path::PathBuf;

use ic_core::TimeKind;
use serde::{Deserialize, Serialize};

/// One coupling job: a dataset, a window and the files to write from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub version: u32,
    pub name: String,
    pub dataset: DatasetDef,
    /// Directory the SOWFA input files are written to.
    pub output_dir: PathBuf,
    /// Reference date for solver time zero; timestamp datasets only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dateref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datefrom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dateto: Option<String>,
    /// Columns computed before writing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub derived: Vec<DerivedDef>,
    #[serde(default)]
    pub exports: Vec<ExportDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetDef {
    /// CSV file, relative to the job file.
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_column: Option<String>,
    #[serde(default)]
    pub time_kind: TimeKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum DerivedDef {
    /// `wspd`/`wdir` from `u`/`v`.
    WindSpeedDirection {
        #[serde(default = "default_u")]
        u: String,
        #[serde(default = "default_v")]
        v: String,
        #[serde(default = "default_wspd")]
        wspd: String,
        #[serde(default = "default_wdir")]
        wdir: String,
    },
    /// `u`/`v` from `wspd`/`wdir`.
    VelocityComponents {
        #[serde(default = "default_wspd")]
        wspd: String,
        #[serde(default = "default_wdir")]
        wdir: String,
        #[serde(default = "default_u")]
        u: String,
        #[serde(default = "default_v")]
        v: String,
    },
    /// Potential temperature from temperature [K] and pressure [mbar].
    Theta {
        temperature: String,
        pressure: String,
        #[serde(default = "default_p0")]
        p0: f64,
        #[serde(default = "default_theta")]
        output: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ExportDef {
    /// Surface boundary condition table, e.g. `qwall`.
    BoundaryConditions {
        filename: String,
        field: String,
        #[serde(default = "default_scale")]
        scale: f64,
    },
    /// Initial profile for setFieldsABL.
    InitialConditions {
        filename: String,
        #[serde(default = "default_u")]
        xmom: String,
        #[serde(default = "default_v")]
        ymom: String,
        #[serde(default = "default_theta")]
        temp: String,
    },
    /// Time-height source tables for ABLProperties.
    TimeHeight {
        filename: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        xmom: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ymom: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        zmom: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        temp: Option<String>,
    },
}

impl ExportDef {
    pub fn filename(&self) -> &str {
        match self {
            ExportDef::BoundaryConditions { filename, .. }
            | ExportDef::InitialConditions { filename, .. }
            | ExportDef::TimeHeight { filename, .. } => filename,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ExportDef::BoundaryConditions { .. } => "boundary conditions",
            ExportDef::InitialConditions { .. } => "initial conditions",
            ExportDef::TimeHeight { .. } => "time-height table",
        }
    }
}

fn default_u() -> String {
    "u".to_string()
}

fn default_v() -> String {
    "v".to_string()
}

fn default_wspd() -> String {
    "wspd".to_string()
}

fn default_wdir() -> String {
    "wdir".to_string()
}

fn default_theta() -> String {
    "theta".to_string()
}

fn default_p0() -> f64 {
    1000.0
}

fn default_scale() -> f64 {
    1.0
}
