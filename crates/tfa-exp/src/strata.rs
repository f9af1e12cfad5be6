use serde::{Deserialize, Serialize};
use tfa_core::errors::{ErrorInfo, TfaError};
use tfa_d2::{estimate_with, D2Outcome, EstimateOpts};

use crate::project::{project, subsample, FeatureSpec, Normalization};
use crate::table::EventTable;

fn default_min_events() -> usize {
    1000
}

fn default_sample_size() -> usize {
    5000
}

/// Half-open interval `[lo, hi)` of a stratification column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinSpec {
    /// Inclusive lower edge.
    pub lo: f64,
    /// Exclusive upper edge.
    pub hi: f64,
}

/// Sweep of independent estimates over bins of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratumSpec {
    /// Label used in reports.
    pub name: String,
    /// Column the bins apply to (raw values, before any transform).
    pub column: String,
    /// Bins, estimated independently.
    pub bins: Vec<BinSpec>,
    /// Bins with fewer events are skipped.
    #[serde(default = "default_min_events")]
    pub min_events: usize,
    /// Events per bin are subsampled down to this size.
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
}

impl StratumSpec {
    /// Requires at least one bin, each with `lo < hi`.
    pub fn validate(&self) -> Result<(), TfaError> {
        if self.bins.is_empty() {
            return Err(TfaError::Config(
                ErrorInfo::new("empty-stratum", "stratum needs at least one bin")
                    .with_context("stratum", &self.name),
            ));
        }
        if let Some(bin) = self.bins.iter().find(|bin| !(bin.lo < bin.hi)) {
            return Err(TfaError::Config(
                ErrorInfo::new("bin-range", "bin edges must satisfy lo < hi")
                    .with_context("stratum", &self.name)
                    .with_context("lo", bin.lo)
                    .with_context("hi", bin.hi),
            ));
        }
        if self.sample_size < 2 {
            return Err(TfaError::Config(
                ErrorInfo::new("sample-size", "bins must keep at least two events")
                    .with_context("stratum", &self.name),
            ));
        }
        Ok(())
    }
}

/// What happened to one bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BinStatus {
    /// Fewer events than `min_events`.
    Skipped,
    /// The estimator ran; the outcome may still be an insufficient region.
    Estimated {
        /// Estimator outcome.
        outcome: D2Outcome,
    },
    /// The bin's point cloud was degenerate.
    Failed {
        /// Error description.
        reason: String,
    },
}

/// Result for one bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinReport {
    /// Inclusive lower edge.
    pub lo: f64,
    /// Exclusive upper edge.
    pub hi: f64,
    /// Events in the bin before subsampling.
    pub events: usize,
    /// Bin status.
    pub status: BinStatus,
}

/// Results of a stratified sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratumReport {
    /// Stratum label.
    pub name: String,
    /// Binned column.
    pub column: String,
    /// One entry per configured bin, in order.
    pub bins: Vec<BinReport>,
}

/// Shared projection and estimator settings for a sweep.
#[derive(Debug, Clone, Copy)]
pub struct SweepContext<'a> {
    /// Feature axes.
    pub features: &'a [FeatureSpec],
    /// Normalization applied per bin.
    pub normalization: Normalization,
    /// Estimator options.
    pub estimate_opts: &'a EstimateOpts,
    /// Seed for per-bin subsampling.
    pub seed: u64,
}

/// Estimates D2 in every bin of `spec`, skipping sparse or degenerate bins.
///
/// Each bin is normalized on its own, so estimates compare shapes rather than
/// positions in the full sample.
pub fn run_stratum(
    table: &EventTable,
    spec: &StratumSpec,
    ctx: &SweepContext<'_>,
) -> Result<StratumReport, TfaError> {
    spec.validate()?;
    let mut bins = Vec::with_capacity(spec.bins.len());
    for bin in &spec.bins {
        let subset = table.filter_range(&spec.column, bin.lo, bin.hi)?;
        let events = subset.len();
        let status = if events < spec.min_events {
            log::info!(
                "{} [{}, {}): {} events below minimum {}, skipped",
                spec.name,
                bin.lo,
                bin.hi,
                events,
                spec.min_events
            );
            BinStatus::Skipped
        } else {
            let sampled = subsample(&subset, spec.sample_size, ctx.seed);
            let features = project(&sampled, ctx.features, ctx.normalization)?;
            match estimate_with(&features, ctx.estimate_opts) {
                Ok(outcome) => {
                    if !outcome.is_valid() {
                        log::info!(
                            "{} [{}, {}): insufficient scaling region",
                            spec.name,
                            bin.lo,
                            bin.hi
                        );
                    }
                    BinStatus::Estimated { outcome }
                }
                Err(err) if err.is_degenerate() => {
                    log::info!("{} [{}, {}): {}", spec.name, bin.lo, bin.hi, err);
                    BinStatus::Failed {
                        reason: err.to_string(),
                    }
                }
                Err(err) => return Err(err),
            }
        };
        bins.push(BinReport {
            lo: bin.lo,
            hi: bin.hi,
            events,
            status,
        });
    }
    Ok(StratumReport {
        name: spec.name.clone(),
        column: spec.column.clone(),
        bins,
    })
}
