mod common;

use common::unit_square;
use tfa_core::{FeatureSet, TfaError};
use tfa_d2::{correlation_curve, estimate, estimate_with, D2Outcome, EstimateOpts};

#[test]
fn estimate_is_deterministic() {
    let features = unit_square(500, 3);
    let first = estimate(&features).expect("first");
    let second = estimate(&features).expect("second");
    assert_eq!(first.value().to_bits(), second.value().to_bits());
    assert_eq!(first.stderr().to_bits(), second.stderr().to_bits());
}

#[test]
fn identical_points_are_degenerate() {
    let rows = vec![[0.5, 0.5]; 50];
    let features = FeatureSet::from_rows(&rows).expect("rows");
    let err = estimate(&features).unwrap_err();
    assert!(matches!(err, TfaError::DegenerateInput(_)));
    assert_eq!(err.info().code, "identical-points");
}

#[test]
fn single_point_is_degenerate() {
    let features = FeatureSet::from_rows(&[[0.2, 0.3]]).expect("rows");
    let err = estimate(&features).unwrap_err();
    assert!(err.is_degenerate());
    assert_eq!(err.info().code, "too-few-points");
}

#[test]
fn mostly_duplicate_points_without_spread_are_degenerate() {
    // Positive distances all equal and the 95th percentile lands on them.
    let mut rows = vec![[0.0, 0.0]; 3];
    rows.push([1.0, 0.0]);
    let features = FeatureSet::from_rows(&rows).expect("rows");
    let err = estimate(&features).unwrap_err();
    assert_eq!(err.info().code, "no-distance-spread");
}

#[test]
fn three_distinct_points_are_insufficient() {
    let features = FeatureSet::from_rows(&[[0.0, 0.0], [0.3, 0.0], [1.0, 1.0]]).expect("rows");
    let outcome = estimate(&features).expect("no error");
    assert!(!outcome.is_valid());
    assert!(outcome.value().is_nan());
    assert!(outcome.stderr().is_nan());
    assert_eq!(
        outcome,
        D2Outcome::InsufficientScalingRegion {
            points: 30,
            levels: 2
        }
    );
}

#[test]
fn duplicates_still_count_towards_correlation_sums() {
    let base = unit_square(100, 9);
    let mut rows: Vec<Vec<f64>> = base.rows().map(|row| row.to_vec()).collect();
    rows.push(rows[0].clone());
    let with_duplicate = FeatureSet::from_rows(&rows).expect("rows");
    let curve = correlation_curve(&with_duplicate, &EstimateOpts::default()).expect("curve");
    let n = curve.n_points as f64;
    // The zero-distance pair is below every radius.
    assert!(curve.sums[0] >= 2.0 / (n * (n - 1.0)));
    assert_eq!(curve.n_pairs, 101 * 100 / 2);
}

#[test]
fn correlation_sums_are_monotone() {
    let curve = correlation_curve(&unit_square(300, 4), &EstimateOpts::default()).expect("curve");
    assert_eq!(curve.radii.len(), 30);
    for pair in curve.sums.windows(2) {
        assert!(pair[0] <= pair[1]);
    }
    assert!(curve.sums.iter().all(|c| (0.0..=1.0).contains(c)));
}

#[test]
fn invalid_options_are_config_errors() {
    let features = unit_square(50, 1);
    let mut opts = EstimateOpts::with_radii(1);
    assert!(matches!(
        estimate_with(&features, &opts).unwrap_err(),
        TfaError::Config(_)
    ));
    opts = EstimateOpts {
        scaling_low: 0.5,
        scaling_high: 0.4,
        ..EstimateOpts::default()
    };
    assert_eq!(
        estimate_with(&features, &opts).unwrap_err().info().code,
        "scaling-range"
    );
}

#[test]
fn outcome_serializes_with_status_tag() {
    let outcome = D2Outcome::InsufficientScalingRegion {
        points: 3,
        levels: 2,
    };
    let json = serde_json::to_string(&outcome).expect("serialize");
    assert_eq!(
        json,
        r#"{"status":"insufficient_scaling_region","points":3,"levels":2}"#
    );
    let valid = estimate(&unit_square(200, 2)).expect("estimate");
    let decoded: D2Outcome =
        serde_json::from_str(&serde_json::to_string(&valid).expect("json")).expect("decode");
    assert_eq!(decoded, valid);
}
