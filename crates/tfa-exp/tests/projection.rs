mod common;

use common::synthetic_events;
use tfa_core::TfaError;
use tfa_exp::{
    normalize_min_max, project, subsample, EventTable, FeatureSpec, Normalization, Transform,
};

#[test]
fn feature_specs_parse_from_cli_syntax() {
    let spec: FeatureSpec = "Dec:sin_degrees".parse().expect("parse");
    assert_eq!(spec, FeatureSpec::new("Dec", Transform::SinDegrees));
    assert_eq!(spec.to_string(), "sin_degrees(Dec)");
    let plain: FeatureSpec = "log10E".parse().expect("parse");
    assert_eq!(plain.transform, Transform::Identity);
    assert!("x:tan".parse::<FeatureSpec>().is_err());
    assert!(":log10".parse::<FeatureSpec>().is_err());
}

#[test]
fn transforms_match_their_definitions() {
    assert!((Transform::Log10.apply(1000.0) - 3.0).abs() < 1e-12);
    assert!((Transform::SinDegrees.apply(30.0) - 0.5).abs() < 1e-12);
    assert!((Transform::CosDegrees.apply(60.0) - 0.5).abs() < 1e-12);
    assert!((Transform::CosRadians.apply(std::f64::consts::PI) + 1.0).abs() < 1e-12);
}

#[test]
fn min_max_maps_onto_unit_interval() {
    let mut values = vec![2.0, 4.0, 3.0];
    normalize_min_max(&mut values, "x");
    assert_eq!(values, vec![0.0, 1.0, 0.5]);

    let mut constant = vec![7.0; 4];
    normalize_min_max(&mut constant, "c");
    assert_eq!(constant, vec![0.0; 4]);
}

#[test]
fn projection_builds_normalized_features() {
    let table = synthetic_events(200, 1);
    let specs = vec![
        FeatureSpec::new("log10E", Transform::Identity),
        FeatureSpec::new("Dec", Transform::SinDegrees),
    ];
    let features = project(&table, &specs, Normalization::MinMax).expect("project");
    assert_eq!(features.len(), 200);
    assert_eq!(features.dim(), 2);
    for axis in 0..2 {
        let column: Vec<f64> = features.rows().map(|row| row[axis]).collect();
        let min = column.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = column.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(min, 0.0);
        assert_eq!(max, 1.0);
    }
}

#[test]
fn log_of_non_positive_values_is_a_data_error() {
    let table = EventTable::new(vec!["E".into()], vec![vec![10.0], vec![0.0]]).expect("table");
    let err = project(&table, &[FeatureSpec::new("E", Transform::Log10)], Normalization::None)
        .unwrap_err();
    assert!(matches!(err, TfaError::Data(_)));
    assert_eq!(err.info().context["row"], "1");
}

#[test]
fn projection_requires_features() {
    let table = synthetic_events(10, 2);
    let err = project(&table, &[], Normalization::MinMax).unwrap_err();
    assert!(matches!(err, TfaError::Config(_)));
}

#[test]
fn subsample_is_seeded_and_order_preserving() {
    let table = synthetic_events(500, 3);
    let a = subsample(&table, 100, 42);
    let b = subsample(&table, 100, 42);
    let c = subsample(&table, 100, 43);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.len(), 100);

    let positions: Vec<usize> = a
        .rows()
        .iter()
        .map(|row| table.rows().iter().position(|r| r == row).expect("present"))
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));

    let small = subsample(&table, 1000, 42);
    assert_eq!(small, table);
}
