use rstest::rstest;
use shock_config::{Config, load_toml};

#[rstest]
fn empty_toml_yields_defaults() {
    let cfg = load_toml("").expect("empty config should parse");
    assert_eq!(cfg.histogram.bucket_count, 10);
    assert_eq!(cfg.histogram.max_speed_mm_s, 2000);
    assert_eq!(cfg.sampling.rate_hz, 1000);
    assert_eq!(cfg.sampling.multisample_count, 8);
    assert!(cfg.calibration.is_none());
    cfg.validate().expect("defaults must validate");
}

#[rstest]
fn full_config_round_trips() {
    let toml = r#"
        [histogram]
        bucket_count = 20
        max_speed_mm_s = 1500

        [sampling]
        rate_hz = 500
        multisample_count = 4
        report_interval_ticks = 256
        trace_raw = true

        [calibration]
        gain_mm_per_count = 0.018
        zero_counts = 130

        [logging]
        level = "debug"
        rotation = "daily"
    "#;
    let cfg = load_toml(toml).expect("parse");
    cfg.validate().expect("validate");
    assert_eq!(cfg.histogram.bucket_count, 20);
    assert_eq!(cfg.sampling.rate_hz, 500);
    assert!(cfg.sampling.trace_raw);
    let cal = cfg.calibration.expect("calibration present");
    assert_eq!(cal.zero_counts, 130);
    assert_eq!(cfg.logging.level.as_deref(), Some("debug"));
}

#[rstest]
#[case("[histogram]\nbucket_count = 0")]
#[case("[histogram]\nmax_speed_mm_s = -5")]
#[case("[histogram]\nbucket_count = 4096")]
#[case("[sampling]\nmultisample_count = 0")]
#[case("[sampling]\nmultisample_count = 1000")]
#[case("[sampling]\nreport_interval_ticks = 0")]
#[case("[calibration]\ngain_mm_per_count = 0.0")]
#[case("[calibration]\ngain_mm_per_count = -1.0")]
fn invalid_configs_are_rejected(#[case] toml: &str) {
    let cfg = load_toml(toml).expect("parse should succeed");
    assert!(cfg.validate().is_err(), "expected rejection for: {toml}");
}

#[rstest]
fn span_narrower_than_buckets_is_rejected() {
    // 2*3 = 6 mm/s of span cannot fill 16 buckets with width >= 1
    let toml = "[histogram]\nbucket_count = 16\nmax_speed_mm_s = 3";
    let cfg = load_toml(toml).expect("parse");
    assert!(cfg.validate().is_err());
}

#[rstest]
fn unknown_keys_are_tolerated() {
    // forward compatibility: extra sections should not break older binaries
    let cfg = load_toml("[future]\nknob = 1").expect("parse");
    cfg.validate().expect("validate");
}
