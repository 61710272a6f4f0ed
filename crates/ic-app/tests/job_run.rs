//! End-to-end job runs against files on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use ic_app::{AppError, load_dataset, load_job, run_job, run_job_file};
use ic_sowfa::SowfaError;
use ic_table::Table;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    fs::create_dir_all(&dir).unwrap();
    dir
}

const PROFILE_CSV: &str = "\
t,height,u,v,w,theta
0,10,1.5,-0.5,0,290
0,20,2.5,-1,0,291
60,10,2,0.25,0.01,290.5
60,20,3,0.5,0.02,291.5
";

fn write_job(dir: &Path, body: &str) -> PathBuf {
    fs::write(dir.join("sim.csv"), PROFILE_CSV).unwrap();
    let path = dir.join("job.yaml");
    fs::write(&path, body).unwrap();
    path
}

const PROFILE_JOB: &str = r#"
version: 1
name: les-forcing
dataset:
  path: sim.csv
  time_kind: elapsed
output_dir: constant
exports:
  - type: InitialConditions
    filename: initialValues
  - type: TimeHeight
    filename: fieldTable
    xmom: u
    ymom: v
    zmom: w
    temp: theta
"#;

#[test]
fn job_file_writes_every_export() {
    let dir = unique_temp_dir("ic_app_job");
    let job_path = write_job(&dir, PROFILE_JOB);

    let report = run_job_file(&job_path).unwrap();
    assert_eq!(report.name, "les-forcing");
    assert_eq!(report.rows, 4);
    assert_eq!(report.output_dir, dir.join("constant"));
    assert_eq!(report.exports.len(), 2);
    assert_eq!(report.exports[0].kind, "initial conditions");
    assert_eq!(report.exports[1].path, dir.join("constant").join("fieldTable"));

    let ics = fs::read_to_string(dir.join("constant/initialValues")).unwrap();
    assert_eq!(ics, "    (10 1.5 -0.5 290)\n    (20 2.5 -1 291)\n");

    let table = fs::read_to_string(dir.join("constant/fieldTable")).unwrap();
    let expected = "\
sourceHeightsMomentum
(
    10
    20
);

sourceTableMomentumX
(
    (0 1.5 2.5)
    (60 2 3)
);

sourceTableMomentumY
(
    (0 -0.5 -1)
    (60 0.25 0.5)
);

sourceTableMomentumZ
(
    (0 0 0)
    (60 0.01 0.02)
);

sourceHeightsTemperature
(
    10
    20
);

sourceTableTemperature
(
    (0 290 291)
    (60 290.5 291.5)
);

";
    assert_eq!(table, expected);
}

#[test]
fn window_start_selects_the_initial_snapshot() {
    let dir = unique_temp_dir("ic_app_window");
    let job_path = write_job(&dir, PROFILE_JOB);
    let mut job = load_job(&job_path).unwrap();
    job.datefrom = Some("00:01:00".to_string());

    let report = run_job(&job, &dir).unwrap();
    assert_eq!(report.rows, 2);

    let ics = fs::read_to_string(dir.join("constant/initialValues")).unwrap();
    assert_eq!(ics, "    (10 2 0.25 290.5)\n    (20 3 0.5 291.5)\n");
}

#[test]
fn derived_columns_are_available_to_exports() {
    let dir = unique_temp_dir("ic_app_derived");
    let job_path = write_job(
        &dir,
        r#"
version: 1
name: derived
dataset:
  path: sim.csv
  time_kind: elapsed
output_dir: out
derived:
  - type: WindSpeedDirection
exports:
  - type: InitialConditions
    filename: speed
    xmom: wspd
    ymom: v
    temp: theta
"#,
    );

    let job = load_job(&job_path).unwrap();
    let table = load_dataset(&job, &dir).unwrap();
    assert!(table.column_names().contains(&"wdir"));

    run_job(&job, &dir).unwrap();
    let text = fs::read_to_string(dir.join("out/speed")).unwrap();
    assert!(text.starts_with("    (10 1.58113883008 -0.5 290)\n"));
}

#[test]
fn failing_export_names_its_file_and_stops_the_run() {
    let dir = unique_temp_dir("ic_app_failing");
    let job_path = write_job(
        &dir,
        r#"
version: 1
name: failing
dataset:
  path: sim.csv
  time_kind: elapsed
output_dir: out
exports:
  - type: BoundaryConditions
    filename: qwall
    field: hflux
  - type: InitialConditions
    filename: initialValues
"#,
    );

    let err = run_job_file(&job_path).unwrap_err();
    assert!(matches!(err, AppError::Export { ref filename, .. } if filename == "qwall"));
    let source = std::error::Error::source(&err).and_then(|e| e.downcast_ref::<SowfaError>());
    assert!(matches!(
        source,
        Some(SowfaError::MissingField { field }) if field == "hflux"
    ));
    assert!(!dir.join("out/initialValues").exists());
}

#[test]
fn missing_job_file_is_a_read_error() {
    let dir = unique_temp_dir("ic_app_missing");
    let err = load_job(&dir.join("nope.yaml")).unwrap_err();
    assert!(matches!(err, AppError::JobFileRead { .. }));
}

#[test]
fn missing_dataset_names_the_path() {
    let dir = unique_temp_dir("ic_app_no_data");
    let job_path = dir.join("job.yaml");
    fs::write(&job_path, PROFILE_JOB).unwrap();

    let err = run_job_file(&job_path).unwrap_err();
    assert!(matches!(err, AppError::Dataset { ref path, .. } if path == &dir.join("sim.csv")));
}
