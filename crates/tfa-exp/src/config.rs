use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tfa_core::errors::{ErrorInfo, TfaError};
use tfa_d2::{BootstrapOpts, EstimateOpts};

use crate::compare::{AgreementThresholds, ReferenceValue};
use crate::project::{FeatureSpec, Normalization};
use crate::serde::from_yaml_slice;
use crate::strata::StratumSpec;
use crate::table::TableSpec;

fn default_sample_seed() -> u64 {
    42
}

/// Full description of a D2 analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Title printed in the report banner.
    pub name: String,
    /// Event files.
    pub data: TableSpec,
    /// Feature axes, in order.
    pub features: Vec<FeatureSpec>,
    /// Axis rescaling.
    #[serde(default)]
    pub normalization: Normalization,
    /// Optional subsample size for the primary estimate.
    #[serde(default)]
    pub sample_size: Option<usize>,
    /// Seed for every subsampling step.
    #[serde(default = "default_sample_seed")]
    pub sample_seed: u64,
    /// Estimator options.
    #[serde(default)]
    pub estimator: EstimateOpts,
    /// Bootstrap options; no bootstrap when absent.
    #[serde(default)]
    pub bootstrap: Option<BootstrapOpts>,
    /// Reference values compared against the measurement.
    #[serde(default)]
    pub references: Vec<ReferenceValue>,
    /// Agreement class limits.
    #[serde(default)]
    pub thresholds: AgreementThresholds,
    /// Stratified sweeps.
    #[serde(default)]
    pub strata: Vec<StratumSpec>,
    /// Directory relative data paths resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl AnalysisConfig {
    /// Checks every nested option block.
    pub fn validate(&self) -> Result<(), TfaError> {
        if self.features.is_empty() {
            return Err(TfaError::Config(
                ErrorInfo::new("no-features", "analysis needs at least one feature axis")
                    .with_context("analysis", &self.name),
            ));
        }
        if matches!(self.sample_size, Some(size) if size < 2) {
            return Err(TfaError::Config(ErrorInfo::new(
                "sample-size",
                "sample size must keep at least two events",
            )));
        }
        self.estimator.validate()?;
        if let Some(bootstrap) = &self.bootstrap {
            bootstrap.validate()?;
        }
        self.thresholds.validate()?;
        for reference in &self.references {
            reference.validate()?;
        }
        for stratum in &self.strata {
            stratum.validate()?;
        }
        Ok(())
    }
}

/// Loads and validates an analysis configuration from YAML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AnalysisConfig, TfaError> {
    let config_path = path.as_ref();
    let bytes = fs::read(config_path).map_err(|err| {
        TfaError::Io(
            ErrorInfo::new("config_read", err.to_string())
                .with_context("file", config_path.display()),
        )
    })?;
    let mut config: AnalysisConfig = from_yaml_slice(&bytes)?;
    config.base_dir = config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    config.validate()?;
    Ok(config)
}
