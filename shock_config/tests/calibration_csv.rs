use rstest::rstest;
use shock_config::{Calibration, CalibrationRow};
use std::io::Write;

#[rstest]
fn two_point_fit_recovers_gain_and_zero() {
    let rows = [
        CalibrationRow { raw: 100, mm: 0.0 },
        CalibrationRow { raw: 1100, mm: 50.0 },
    ];
    let cal = Calibration::from_rows(&rows).expect("fit");
    assert!((cal.gain_mm_per_count - 0.05).abs() < 1e-6);
    assert_eq!(cal.zero_counts, 100);
}

#[rstest]
fn noisy_points_fit_close_to_truth() {
    // mm = 0.02 * (raw - 200), with sub-count jitter on the readings
    let rows: Vec<CalibrationRow> = (0..10)
        .map(|i| {
            let raw = 200 + i * 400;
            let jitter = if i % 2 == 0 { 0.05 } else { -0.05 };
            CalibrationRow {
                raw,
                mm: 0.02 * (raw - 200) as f32 + jitter,
            }
        })
        .collect();
    let cal = Calibration::from_rows(&rows).expect("fit");
    assert!((cal.gain_mm_per_count - 0.02).abs() < 1e-3);
    assert!((cal.zero_counts - 200).abs() < 10);
}

#[rstest]
fn fewer_than_two_rows_is_rejected() {
    let rows = [CalibrationRow { raw: 5, mm: 1.0 }];
    assert!(Calibration::from_rows(&rows).is_err());
    assert!(Calibration::from_rows(&[]).is_err());
}

#[rstest]
fn duplicate_raw_values_are_rejected() {
    let rows = [
        CalibrationRow { raw: 100, mm: 0.0 },
        CalibrationRow { raw: 100, mm: 10.0 },
    ];
    assert!(Calibration::from_rows(&rows).is_err());
}

#[rstest]
fn flat_response_is_rejected() {
    let rows = [
        CalibrationRow { raw: 100, mm: 5.0 },
        CalibrationRow { raw: 900, mm: 5.0 },
    ];
    assert!(Calibration::from_rows(&rows).is_err());
}

#[rstest]
fn csv_file_loads_with_strict_header() {
    let mut f = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(f, "raw,mm").unwrap();
    writeln!(f, "120,0.0").unwrap();
    writeln!(f, "3980,72.5").unwrap();
    f.flush().unwrap();

    let cal = Calibration::from_csv_path(f.path()).expect("load");
    assert!(cal.gain_mm_per_count > 0.0);
    assert!((cal.zero_counts - 120).abs() < 5);
}

#[rstest]
fn csv_with_wrong_header_is_rejected() {
    let mut f = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(f, "counts,millimeters").unwrap();
    writeln!(f, "120,0.0").unwrap();
    writeln!(f, "3980,72.5").unwrap();
    f.flush().unwrap();

    assert!(Calibration::from_csv_path(f.path()).is_err());
}
