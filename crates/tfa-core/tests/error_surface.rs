use tfa_core::errors::{ErrorInfo, TfaError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("points", 1)
        .with_context("reason", "example")
}

#[test]
fn degenerate_error_surface() {
    let err = TfaError::DegenerateInput(sample_info("identical-points", "no spread"));
    assert_eq!(err.info().code, "identical-points");
    assert!(err.is_degenerate());
    assert_eq!(err.info().context.get("points").map(String::as_str), Some("1"));
}

#[test]
fn bootstrap_error_surface() {
    let err = TfaError::AllBootstrapSamplesInvalid(sample_info("no-valid-resample", "empty"));
    assert_eq!(err.info().code, "no-valid-resample");
    assert!(!err.is_degenerate());
}

#[test]
fn display_includes_context_and_hint() {
    let err = TfaError::Config(sample_info("bad-radii", "too few radii").with_hint("use >= 2"));
    let rendered = err.to_string();
    assert!(rendered.starts_with("config error: too few radii (code: bad-radii)"));
    assert!(rendered.contains("points=1"));
    assert!(rendered.contains("hint: use >= 2"));
}

#[test]
fn errors_round_trip_json() {
    let err = TfaError::Data(sample_info("parse", "bad float").with_hint("check delimiter"));
    let json = serde_json::to_string(&err).expect("serialize");
    assert!(json.contains("\"family\":\"Data\""));
    let decoded: TfaError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, err);
}
