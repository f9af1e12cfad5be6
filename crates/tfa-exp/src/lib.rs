//! Caller layer around the D2 estimator: event tables, feature projection,
//! reference comparison, stratified sweeps and report assembly.

#![deny(missing_docs)]

/// Reference values and agreement classification.
pub mod compare;
/// YAML analysis configuration.
pub mod config;
/// Canonical hashing helpers.
pub mod hash;
/// Feature projection, normalization and subsampling.
pub mod project;
/// Analysis pipeline and report rendering.
pub mod report;
/// Canonical JSON and YAML serde helpers.
pub mod serde;
/// Binned sweeps of independent estimates.
pub mod strata;
/// Event file loading.
pub mod table;

pub use compare::{
    closest_reference, compare, compare_all, Agreement, AgreementThresholds, Comparison,
    Measurement, ReferenceValue,
};
pub use config::{load_config, AnalysisConfig};
pub use hash::stable_hash_string;
pub use project::{normalize_min_max, project, subsample, FeatureSpec, Normalization, Transform};
pub use report::{render_text, run_analysis, run_from_config, write_report, AnalysisReport};
pub use crate::serde::{from_json_slice, from_yaml_slice, to_canonical_json_bytes, to_yaml_string};
pub use strata::{
    run_stratum, BinReport, BinSpec, BinStatus, StratumReport, StratumSpec, SweepContext,
};
pub use table::{load_table, resolve_paths, EventTable, TableFormat, TableSpec};
