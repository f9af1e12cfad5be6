use tfa_core::{FeatureSet, TfaError};

#[test]
fn rejects_ragged_rows() {
    let rows = vec![vec![0.1, 0.2], vec![0.3]];
    let err = FeatureSet::from_rows(&rows).unwrap_err();
    assert!(matches!(err, TfaError::InvalidInput(_)));
    assert_eq!(err.info().code, "ragged-rows");
}

#[test]
fn rejects_non_finite_values() {
    let err = FeatureSet::from_rows(&[[0.1, f64::NAN]]).unwrap_err();
    assert_eq!(err.info().code, "non-finite");
    assert_eq!(err.info().context["column"], "1");
}

#[test]
fn empty_input_is_accepted_but_empty() {
    let rows: Vec<Vec<f64>> = Vec::new();
    let set = FeatureSet::from_rows(&rows).unwrap();
    assert!(set.is_empty());
    assert_eq!(set.rows().len(), 0);
}

#[test]
fn scaling_multiplies_every_coordinate() {
    let set = FeatureSet::from_rows(&[[0.5, 0.25], [1.0, 0.0]]).unwrap();
    let scaled = set.scaled(4.0).unwrap();
    assert_eq!(scaled.as_flat(), &[2.0, 1.0, 4.0, 0.0]);
}

#[test]
fn rows_without_columns_are_rejected() {
    let err = FeatureSet::from_rows(&vec![Vec::<f64>::new(); 5]).unwrap_err();
    assert!(matches!(err, TfaError::InvalidInput(_)));
    assert_eq!(err.info().code, "zero-dimension");
    assert_eq!(err.info().context["rows"], "5");

    let no_columns: &[Vec<f64>] = &[];
    let err = FeatureSet::from_columns(no_columns).unwrap_err();
    assert_eq!(err.info().code, "zero-dimension");

    let err = FeatureSet::from_flat(0, vec![1.0]).unwrap_err();
    assert_eq!(err.info().code, "zero-dimension");
}

#[test]
fn deserialization_validates_the_buffer() {
    let set = FeatureSet::from_rows(&[[0.1, 0.2], [0.3, 0.4]]).unwrap();
    let json = serde_json::to_string(&set).unwrap();
    let restored: FeatureSet = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, set);

    let ragged = serde_json::from_str::<FeatureSet>(r#"{"dim":2,"values":[0.1,0.2,0.3]}"#);
    assert!(ragged.unwrap_err().to_string().contains("ragged-buffer"));
    let flat = serde_json::from_str::<FeatureSet>(r#"{"dim":0,"values":[0.5]}"#);
    assert!(flat.unwrap_err().to_string().contains("zero-dimension"));
}
