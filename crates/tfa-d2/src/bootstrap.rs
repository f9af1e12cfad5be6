use rand::RngCore;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tfa_core::errors::{ErrorInfo, TfaError};
use tfa_core::{FeatureSet, RngHandle};

use crate::estimate::{estimate_with, D2Outcome, EstimateOpts};
use crate::radii::percentile;

fn default_iterations() -> usize {
    100
}

fn default_threads() -> usize {
    1
}

fn default_confidence() -> f64 {
    0.95
}

/// Bootstrap resampling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapOpts {
    /// Number of resamples drawn.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Master seed used by [`bootstrap_estimate`].
    #[serde(default)]
    pub seed: u64,
    /// Worker threads; results do not depend on this value.
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Coverage of the percentile confidence interval.
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

impl Default for BootstrapOpts {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            seed: 0,
            threads: default_threads(),
            confidence: default_confidence(),
        }
    }
}

impl BootstrapOpts {
    /// Default options with the given iteration count and seed.
    pub fn new(iterations: usize, seed: u64) -> Self {
        Self {
            iterations,
            seed,
            ..Self::default()
        }
    }

    /// Checks the iteration count and confidence level.
    pub fn validate(&self) -> Result<(), TfaError> {
        if self.iterations == 0 {
            return Err(TfaError::Config(ErrorInfo::new(
                "zero-iterations",
                "bootstrap needs at least one iteration",
            )));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(TfaError::Config(
                ErrorInfo::new("confidence-range", "confidence must lie strictly between 0 and 1")
                    .with_context("confidence", self.confidence),
            ));
        }
        Ok(())
    }
}

/// Aggregate of the retained bootstrap estimates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapSummary {
    /// Arithmetic mean of the retained D2 values.
    pub mean: f64,
    /// Population standard deviation of the retained D2 values.
    pub std_dev: f64,
    /// Lower percentile bound of the confidence interval.
    pub ci_low: f64,
    /// Upper percentile bound of the confidence interval.
    pub ci_high: f64,
    /// Resamples requested.
    pub iterations: usize,
    /// Resamples that produced an estimate.
    pub retained: usize,
    /// Resamples rejected for an insufficient scaling region.
    pub rejected_insufficient: usize,
    /// Resamples rejected as degenerate (for example a single repeated point).
    pub rejected_degenerate: usize,
    /// Retained D2 values in iteration order.
    pub samples: Vec<f64>,
}

impl BootstrapSummary {
    /// Standard error of the bootstrap mean.
    pub fn standard_error(&self) -> f64 {
        self.std_dev / (self.retained as f64).sqrt()
    }
}

enum Draw {
    Retained(f64),
    Insufficient,
    Degenerate,
}

/// Bootstraps D2 with the master seed taken from `opts.seed`.
pub fn bootstrap_estimate(
    features: &FeatureSet,
    opts: &BootstrapOpts,
    estimate_opts: &EstimateOpts,
) -> Result<BootstrapSummary, TfaError> {
    let mut rng = RngHandle::from_seed(opts.seed);
    bootstrap_estimate_with_rng(features, opts, estimate_opts, &mut rng)
}

/// Bootstraps D2 drawing the master seed from `rng`.
///
/// Iteration `i` resamples with its own substream of that master seed, so the
/// ensemble is identical for any `opts.threads`.
pub fn bootstrap_estimate_with_rng<R>(
    features: &FeatureSet,
    opts: &BootstrapOpts,
    estimate_opts: &EstimateOpts,
    rng: &mut R,
) -> Result<BootstrapSummary, TfaError>
where
    R: RngCore + ?Sized,
{
    opts.validate()?;
    estimate_opts.validate()?;
    if features.len() < 2 {
        return Err(TfaError::DegenerateInput(
            ErrorInfo::new("too-few-points", "bootstrap needs at least two points")
                .with_context("points", features.len()),
        ));
    }
    let master_seed = rng.next_u64();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.threads.max(1))
        .build()
        .map_err(|err| TfaError::Config(ErrorInfo::new("thread-pool", err.to_string())))?;

    let draws: Result<Vec<Draw>, TfaError> = pool.install(|| {
        (0..opts.iterations)
            .into_par_iter()
            .map(|iteration| run_iteration(features, estimate_opts, master_seed, iteration))
            .collect()
    });
    summarize(draws?, opts)
}

fn run_iteration(
    features: &FeatureSet,
    estimate_opts: &EstimateOpts,
    master_seed: u64,
    iteration: usize,
) -> Result<Draw, TfaError> {
    let mut rng = RngHandle::substream(master_seed, iteration as u64);
    let sample = features.select(&rng.resample_indices(features.len()))?;
    match estimate_with(&sample, estimate_opts) {
        Ok(D2Outcome::Estimate(estimate)) => Ok(Draw::Retained(estimate.d2)),
        Ok(D2Outcome::InsufficientScalingRegion { .. }) => Ok(Draw::Insufficient),
        Err(err) if err.is_degenerate() => Ok(Draw::Degenerate),
        Err(err) => Err(err),
    }
}

fn summarize(draws: Vec<Draw>, opts: &BootstrapOpts) -> Result<BootstrapSummary, TfaError> {
    let mut samples = Vec::with_capacity(draws.len());
    let mut rejected_insufficient = 0;
    let mut rejected_degenerate = 0;
    for draw in draws {
        match draw {
            Draw::Retained(value) => samples.push(value),
            Draw::Insufficient => rejected_insufficient += 1,
            Draw::Degenerate => rejected_degenerate += 1,
        }
    }
    if samples.is_empty() {
        return Err(TfaError::AllBootstrapSamplesInvalid(
            ErrorInfo::new("no-valid-resample", "every bootstrap resample was rejected")
                .with_context("iterations", opts.iterations)
                .with_context("insufficient", rejected_insufficient)
                .with_context("degenerate", rejected_degenerate)
                .with_hint("use more points or widen the scaling region"),
        ));
    }

    let count = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / count;
    let variance = samples.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / count;
    let mut sorted = samples.clone();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));
    let tail = (1.0 - opts.confidence) / 2.0;

    Ok(BootstrapSummary {
        mean,
        std_dev: variance.sqrt(),
        ci_low: percentile(&sorted, tail),
        ci_high: percentile(&sorted, 1.0 - tail),
        iterations: opts.iterations,
        retained: samples.len(),
        rejected_insufficient,
        rejected_degenerate,
        samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_uses_population_deviation() {
        let draws = vec![
            Draw::Retained(1.0),
            Draw::Insufficient,
            Draw::Retained(3.0),
            Draw::Degenerate,
        ];
        let summary = summarize(draws, &BootstrapOpts::new(4, 0)).unwrap();
        assert_eq!(summary.mean, 2.0);
        assert_eq!(summary.std_dev, 1.0);
        assert_eq!(summary.retained, 2);
        assert_eq!(summary.rejected_insufficient, 1);
        assert_eq!(summary.rejected_degenerate, 1);
        assert!((summary.ci_low - 1.05).abs() < 1e-12);
        assert!((summary.ci_high - 2.95).abs() < 1e-12);
    }

    #[test]
    fn empty_summary_is_an_error() {
        let err = summarize(Vec::new(), &BootstrapOpts::new(1, 0)).unwrap_err();
        assert!(matches!(err, TfaError::AllBootstrapSamplesInvalid(_)));
    }
}
