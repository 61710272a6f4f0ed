use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use ic_core::{Real, TimeKey, parse_datetime};
use ic_sowfa::{
    IcFields, InternalCoupling, Momentum, SowfaError, TimeHeightFields, WriterOptions,
};
use ic_table::{FieldTable, Table};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn secs(values: &[Real]) -> Vec<TimeKey> {
    values
        .iter()
        .map(|s| TimeKey::from_seconds(*s).unwrap())
        .collect()
}

fn stamp(text: &str) -> TimeKey {
    TimeKey::Timestamp(parse_datetime(text).unwrap())
}

/// 2 times x 2 heights, elapsed keys, with `theta` present.
fn two_by_two() -> FieldTable {
    FieldTable::from_dense(
        secs(&[0.0, 0.0, 3600.0, 3600.0]),
        [
            ("height", vec![10.0, 0.0, 0.0, 10.0]),
            ("theta", vec![301.0, 300.0, 302.0, 303.0]),
        ],
    )
    .unwrap()
}

#[test]
fn boundary_conditions_are_scaled() {
    let dir = unique_temp_dir("ic_sowfa_bcs");
    let df = FieldTable::from_dense(
        secs(&[0.0, 1.0, 2.0]),
        [("height", vec![0.0, 0.0, 0.0]), ("q", vec![1.0, -2.0, 3.0])],
    )
    .unwrap();

    let writer = InternalCoupling::new(&dir, &df, WriterOptions::default()).unwrap();
    let path = writer.write_bcs("qwall", "q", -1.0).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, "    (0 -1)\n    (1 2)\n    (2 -3)\n");
    assert_eq!(path, dir.join("qwall"));
}

#[test]
fn boundary_conditions_need_the_field() {
    let dir = unique_temp_dir("ic_sowfa_bcs_missing");
    let df = FieldTable::from_dense(secs(&[0.0]), [("q", vec![1.0])]).unwrap();
    let writer = InternalCoupling::new(&dir, &df, WriterOptions::default()).unwrap();

    let err = writer.write_bcs("qwall", "hflux", 1.0).unwrap_err();
    assert!(matches!(err, SowfaError::MissingField { ref field } if field == "hflux"));
    assert!(!dir.join("qwall").exists());
}

#[test]
fn one_gap_flips_boundary_conditions_to_failing() {
    let dir = unique_temp_dir("ic_sowfa_bcs_gap");
    let complete =
        FieldTable::from_columns(secs(&[0.0, 1.0]), [("q", vec![Some(1.0), Some(2.0)])]).unwrap();
    let holed = complete
        .with_column("q", vec![Some(1.0), None])
        .unwrap();

    let ok = InternalCoupling::new(&dir, &complete, WriterOptions::default()).unwrap();
    assert!(ok.write_bcs("q_ok", "q", 1.0).is_ok());

    let bad = InternalCoupling::new(&dir, &holed, WriterOptions::default()).unwrap();
    let err = bad.write_bcs("q_bad", "q", 1.0).unwrap_err();
    assert!(matches!(err, SowfaError::IncompleteData { missing: 1, .. }));
    assert!(!dir.join("q_bad").exists());
}

#[test]
fn initial_conditions_zero_fill_absent_fields() {
    let dir = unique_temp_dir("ic_sowfa_ics");
    let df = FieldTable::from_dense(
        vec![
            stamp("2013-11-08 00:00:00"),
            stamp("2013-11-08 00:00:00"),
            stamp("2013-11-08 00:00:00"),
            stamp("2013-11-08 01:00:00"),
        ],
        [
            ("height", vec![0.0, 10.0, 20.0, 0.0]),
            ("u", vec![1.0, 2.0, 3.0, 9.0]),
            ("theta", vec![300.0, 299.0, 298.0, 280.0]),
        ],
    )
    .unwrap();
    let options = WriterOptions {
        dateref: parse_datetime("2013-11-08 00:00:00").ok(),
        ..Default::default()
    };

    let writer = InternalCoupling::new(&dir, &df, options).unwrap();
    let path = writer.write_ics("initialValues", &IcFields::default()).unwrap();

    let text = fs::read_to_string(path).unwrap();
    assert_eq!(
        text,
        "    (0 1 0 300)\n    (10 2 0 299)\n    (20 3 0 298)\n"
    );
    // zero filling never leaks into the bound copy
    assert!(!writer.bound().has_column("v"));
}

#[test]
fn initial_conditions_reject_gaps_in_present_fields() {
    let dir = unique_temp_dir("ic_sowfa_ics_gap");
    let df = FieldTable::from_columns(
        secs(&[0.0, 0.0]),
        [
            ("height", vec![Some(0.0), Some(10.0)]),
            ("u", vec![Some(1.0), None]),
        ],
    )
    .unwrap();
    let writer = InternalCoupling::new(&dir, &df, WriterOptions::default()).unwrap();

    let err = writer.write_ics("init", &IcFields::default()).unwrap_err();
    assert!(matches!(err, SowfaError::IncompleteData { ref field, .. } if field == "u"));
}

#[test]
fn initial_conditions_at_explicit_start_without_rows() {
    let dir = unique_temp_dir("ic_sowfa_ics_snapshot");
    let df = FieldTable::from_dense(
        secs(&[0.0, 10.0]),
        [("height", vec![0.0, 0.0]), ("u", vec![1.0, 2.0])],
    )
    .unwrap();
    let options = WriterOptions {
        datefrom: Some(TimeKey::from_seconds(5.0).unwrap()),
        ..Default::default()
    };
    let writer = InternalCoupling::new(&dir, &df, options).unwrap();

    let err = writer.write_ics("init", &IcFields::default()).unwrap_err();
    assert!(matches!(err, SowfaError::EmptySnapshot { .. }));
}

#[test]
fn zero_momentum_tables_without_temperature() {
    let dir = unique_temp_dir("ic_sowfa_th_zero");
    let writer = InternalCoupling::new(&dir, &two_by_two(), WriterOptions::default()).unwrap();

    let fields = TimeHeightFields::new().with_momentum(Momentum::new("U", "V", "W"));
    let path = writer.write_timeheight("fieldTable", &fields).unwrap();
    let text = fs::read_to_string(path).unwrap();

    let mut expected = String::from("sourceHeightsMomentum\n(\n    0\n    10\n);\n\n");
    for axis in ["X", "Y", "Z"] {
        expected.push_str(&format!(
            "sourceTableMomentum{axis}\n(\n    (0 0 0)\n    (3600 0 0)\n);\n\n"
        ));
    }
    assert_eq!(text, expected);
    assert!(!text.contains("Temperature"));
}

#[test]
fn temperature_table_is_ordered_by_height() {
    let dir = unique_temp_dir("ic_sowfa_th_temp");
    let writer = InternalCoupling::new(&dir, &two_by_two(), WriterOptions::default()).unwrap();

    let fields = TimeHeightFields::new().with_temperature("theta");
    let text = writer.render_timeheight(&fields).unwrap();
    assert_eq!(
        text,
        "sourceHeightsTemperature\n(\n    0\n    10\n);\n\n\
         sourceTableTemperature\n(\n    (0 300 301)\n    (3600 302 303)\n);\n\n"
    );
}

#[test]
fn momentum_is_all_or_nothing() {
    let dir = unique_temp_dir("ic_sowfa_th_partial");
    let writer = InternalCoupling::new(&dir, &two_by_two(), WriterOptions::default()).unwrap();

    let partial = [
        (Some("u"), None, None),
        (None, Some("v"), None),
        (None, None, Some("w")),
        (Some("u"), Some("v"), None),
        (Some("u"), None, Some("w")),
        (None, Some("v"), Some("w")),
    ];
    for (x, y, z) in partial {
        let fields = TimeHeightFields {
            xmom: x.map(str::to_string),
            ymom: y.map(str::to_string),
            zmom: z.map(str::to_string),
            temp: Some("theta".to_string()),
        };
        let err = writer.write_timeheight("partial", &fields).unwrap_err();
        assert!(matches!(err, SowfaError::IncompleteMomentumSpec { .. }));
    }
    assert!(!dir.join("partial").exists());

    let none = TimeHeightFields::new().with_temperature("theta");
    assert!(writer.write_timeheight("temp_only", &none).is_ok());
    let all = none.with_momentum(Momentum::new("u", "v", "w"));
    assert!(writer.write_timeheight("all", &all).is_ok());
}

#[test]
fn grid_holes_are_incomplete_even_for_zero_filled_fields() {
    let dir = unique_temp_dir("ic_sowfa_th_hole");
    let df = FieldTable::from_dense(
        secs(&[0.0, 0.0, 3600.0]),
        [("height", vec![0.0, 10.0, 0.0])],
    )
    .unwrap();
    let writer = InternalCoupling::new(&dir, &df, WriterOptions::default()).unwrap();

    let fields = TimeHeightFields::new().with_temperature("theta");
    let err = writer.write_timeheight("holes", &fields).unwrap_err();
    assert!(matches!(err, SowfaError::IncompleteData { missing: 1, .. }));
}

#[test]
fn one_gap_flips_time_height_to_failing() {
    let dir = unique_temp_dir("ic_sowfa_th_flip");
    let fields = TimeHeightFields::new().with_temperature("theta");

    let df = two_by_two();
    let writer = InternalCoupling::new(&dir, &df, WriterOptions::default()).unwrap();
    assert!(writer.write_timeheight("complete", &fields).is_ok());

    let gappy = df
        .with_column("theta", vec![Some(300.0), None, Some(302.0), Some(303.0)])
        .unwrap();
    let writer = InternalCoupling::new(&dir, &gappy, WriterOptions::default()).unwrap();
    let err = writer.write_timeheight("gappy", &fields).unwrap_err();
    assert!(matches!(
        err,
        SowfaError::IncompleteData { ref field, missing: 1, .. } if field == "theta"
    ));
    assert!(!dir.join("gappy").exists());
}

#[test]
fn missing_height_label_is_incomplete_data() {
    let dir = unique_temp_dir("ic_sowfa_th_height_gap");
    let df = FieldTable::from_columns(
        secs(&[0.0, 0.0, 3600.0, 3600.0]),
        [
            ("height", vec![Some(0.0), None, Some(0.0), Some(10.0)]),
            ("theta", vec![Some(300.0), Some(301.0), Some(302.0), Some(303.0)]),
        ],
    )
    .unwrap();
    let writer = InternalCoupling::new(&dir, &df, WriterOptions::default()).unwrap();

    let fields = TimeHeightFields::new().with_temperature("theta");
    let err = writer.write_timeheight("table", &fields).unwrap_err();
    assert!(matches!(
        err,
        SowfaError::IncompleteData { ref field, missing: 1, .. } if field == "height"
    ));
    assert!(!dir.join("table").exists());

    // initial conditions report the same gap the same way
    let ics = IcFields::default();
    let err = writer.render_ics(&ics).unwrap_err();
    assert!(matches!(
        err,
        SowfaError::IncompleteData { ref field, .. } if field == "height"
    ));
}

#[test]
fn momentum_block_shape() {
    let dir = unique_temp_dir("ic_sowfa_th_shape");
    let times = [0.0, 600.0, 1200.0];
    let heights = [5.0, 50.0, 20.0, 100.0];

    let mut keys = Vec::new();
    let mut z = Vec::new();
    let mut u = Vec::new();
    for t in times {
        for h in heights {
            keys.extend(secs(&[t]));
            z.push(h);
            u.push(t + h / 1000.0);
        }
    }
    let df = FieldTable::from_dense(keys, [("height", z), ("u", u)]).unwrap();
    let writer = InternalCoupling::new(&dir, &df, WriterOptions::default()).unwrap();

    let fields = TimeHeightFields::new().with_momentum(Momentum::new("u", "v", "w"));
    let text = writer.render_timeheight(&fields).unwrap();

    let heights_block: Vec<&str> = text
        .split("sourceHeightsMomentum\n(\n")
        .nth(1)
        .and_then(|rest| rest.split(");").next())
        .unwrap()
        .lines()
        .collect();
    assert_eq!(heights_block, vec!["    5", "    20", "    50", "    100"]);

    let x_block: Vec<&str> = text
        .split("sourceTableMomentumX\n(\n")
        .nth(1)
        .and_then(|rest| rest.split(");").next())
        .unwrap()
        .lines()
        .collect();
    assert_eq!(x_block.len(), times.len());
    for line in &x_block {
        let inner = line.trim().trim_start_matches('(').trim_end_matches(')');
        assert_eq!(inner.split(' ').count(), 1 + heights.len());
    }
    assert_eq!(x_block[1], "    (600 600.005 600.02 600.05 600.1)");
}

#[test]
fn window_outside_data_is_empty() {
    let dir = unique_temp_dir("ic_sowfa_window");
    let df = FieldTable::from_dense(secs(&[0.0, 1.0]), [("q", vec![1.0, 2.0])]).unwrap();
    let options = WriterOptions {
        datefrom: Some(TimeKey::from_seconds(10.0).unwrap()),
        dateto: Some(TimeKey::from_seconds(20.0).unwrap()),
        ..Default::default()
    };
    let err = InternalCoupling::new(&dir, &df, options).unwrap_err();
    assert!(matches!(err, SowfaError::EmptyWindow { .. }));
}

#[test]
fn window_selects_closed_interval() {
    let dir = unique_temp_dir("ic_sowfa_window_closed");
    let df = FieldTable::from_dense(
        secs(&[0.0, 1.0, 2.0, 3.0]),
        [("q", vec![1.0, 2.0, 3.0, 4.0])],
    )
    .unwrap();
    let options = WriterOptions {
        datefrom: Some(TimeKey::from_seconds(1.0).unwrap()),
        dateto: Some(TimeKey::from_seconds(2.0).unwrap()),
        ..Default::default()
    };
    let writer = InternalCoupling::new(&dir, &df, options).unwrap();
    let text = writer.render_bcs("q", 1.0).unwrap();
    assert_eq!(text, "    (1 2)\n    (2 3)\n");
}

#[test]
fn both_time_bases_differ_by_a_constant() {
    let dir = unique_temp_dir("ic_sowfa_timebase");
    let start = parse_datetime("2013-11-08 00:00:00").unwrap();
    let offsets = [0.0, 600.0, 1800.0, 7200.0];

    let stamps: Vec<TimeKey> = offsets
        .iter()
        .map(|s| TimeKey::Timestamp(start + chrono::TimeDelta::seconds(*s as i64)))
        .collect();
    let absolute = FieldTable::from_dense(stamps, [("q", vec![0.0; 4])]).unwrap();
    let relative = FieldTable::from_dense(secs(&offsets), [("q", vec![0.0; 4])]).unwrap();

    let dateref = parse_datetime("2013-11-07 22:00:00").unwrap();
    let with_ref = InternalCoupling::new(
        &dir,
        &absolute,
        WriterOptions {
            dateref: Some(dateref),
            ..Default::default()
        },
    )
    .unwrap();
    let without_ref = InternalCoupling::new(&dir, &relative, WriterOptions::default()).unwrap();

    let a = with_ref.t_index().unwrap();
    let b = without_ref.t_index().unwrap();
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x - y, 7200.0);
    }
}

#[test]
fn caller_dataset_is_untouched() {
    let dir = unique_temp_dir("ic_sowfa_untouched");
    let df = two_by_two();
    let before = df.clone();

    let writer = InternalCoupling::new(&dir, &df, WriterOptions::default()).unwrap();
    let fields = TimeHeightFields::new().with_momentum(Momentum::new("u", "v", "w"));
    writer.write_timeheight("a", &fields).unwrap();
    writer.write_timeheight("b", &fields).unwrap();

    assert_eq!(df, before);
    assert!(!writer.bound().has_column("u"));
    assert_eq!(
        fs::read_to_string(dir.join("a")).unwrap(),
        fs::read_to_string(dir.join("b")).unwrap()
    );
}
