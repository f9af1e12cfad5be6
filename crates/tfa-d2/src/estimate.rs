use serde::{Deserialize, Serialize};
use tfa_core::errors::{ErrorInfo, TfaError};
use tfa_core::FeatureSet;

use crate::distance::PairwiseDistances;
use crate::fit::fit_line;
use crate::radii::{log_spaced, percentile};

fn config_error(code: &str, message: impl Into<String>) -> TfaError {
    TfaError::Config(ErrorInfo::new(code, message))
}

fn default_n_radii() -> usize {
    30
}

fn default_lower_percentile() -> f64 {
    0.05
}

fn default_upper_percentile() -> f64 {
    0.95
}

fn default_scaling_low() -> f64 {
    0.01
}

fn default_scaling_high() -> f64 {
    0.99
}

fn default_min_scaling_points() -> usize {
    5
}

/// Options controlling a Grassberger-Procaccia estimate.
///
/// The defaults are the reference configuration: 30 radii between the 5th
/// percentile of the positive distances and the 95th percentile of all
/// distances, and a scaling region of `0.01 < C(r) < 0.99`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateOpts {
    /// Number of log-spaced radii in the schedule.
    #[serde(default = "default_n_radii")]
    pub n_radii: usize,
    /// Percentile (0..1) of the strictly positive distances giving the smallest radius.
    #[serde(default = "default_lower_percentile")]
    pub lower_percentile: f64,
    /// Percentile (0..1) of all distances giving the largest radius.
    #[serde(default = "default_upper_percentile")]
    pub upper_percentile: f64,
    /// Exclusive lower bound on the correlation sum inside the scaling region.
    #[serde(default = "default_scaling_low")]
    pub scaling_low: f64,
    /// Exclusive upper bound on the correlation sum inside the scaling region.
    #[serde(default = "default_scaling_high")]
    pub scaling_high: f64,
    /// Minimum number of radii and of distinct correlation-sum levels required for a fit.
    #[serde(default = "default_min_scaling_points")]
    pub min_scaling_points: usize,
}

impl Default for EstimateOpts {
    fn default() -> Self {
        Self {
            n_radii: default_n_radii(),
            lower_percentile: default_lower_percentile(),
            upper_percentile: default_upper_percentile(),
            scaling_low: default_scaling_low(),
            scaling_high: default_scaling_high(),
            min_scaling_points: default_min_scaling_points(),
        }
    }
}

impl EstimateOpts {
    /// Reference options with a custom radius count.
    pub fn with_radii(n_radii: usize) -> Self {
        Self {
            n_radii,
            ..Self::default()
        }
    }

    /// Checks that the options describe a usable schedule and scaling region.
    pub fn validate(&self) -> Result<(), TfaError> {
        if self.n_radii < 2 {
            return Err(TfaError::Config(
                ErrorInfo::new("too-few-radii", "radius schedule needs at least two radii")
                    .with_context("n_radii", self.n_radii),
            ));
        }
        let unit = 0.0..=1.0;
        if !unit.contains(&self.lower_percentile)
            || !unit.contains(&self.upper_percentile)
            || self.lower_percentile >= self.upper_percentile
        {
            return Err(TfaError::Config(
                ErrorInfo::new(
                    "percentile-range",
                    "percentiles must satisfy 0 <= lower < upper <= 1",
                )
                .with_context("lower", self.lower_percentile)
                .with_context("upper", self.upper_percentile),
            ));
        }
        if !unit.contains(&self.scaling_low)
            || !unit.contains(&self.scaling_high)
            || self.scaling_low >= self.scaling_high
        {
            return Err(TfaError::Config(
                ErrorInfo::new(
                    "scaling-range",
                    "scaling bounds must satisfy 0 <= low < high <= 1",
                )
                .with_context("low", self.scaling_low)
                .with_context("high", self.scaling_high),
            ));
        }
        if self.min_scaling_points < 3 {
            return Err(config_error(
                "min-scaling-points",
                "a covariance-bearing fit needs at least three scaling points",
            ));
        }
        Ok(())
    }
}

/// Correlation sum `C(r)` evaluated on the radius schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationCurve {
    /// Number of feature vectors.
    pub n_points: usize,
    /// Number of unordered pairs.
    pub n_pairs: usize,
    /// Log-spaced radii, ascending.
    pub radii: Vec<f64>,
    /// Fraction of pairs closer than each radius.
    pub sums: Vec<f64>,
}

impl CorrelationCurve {
    /// Indices of the radii whose correlation sum lies strictly inside `(low, high)`.
    pub fn scaling_region(&self, low: f64, high: f64) -> Vec<usize> {
        self.sums
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > low && **c < high)
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// Slope of the log-log correlation sum with its fit diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct D2Estimate {
    /// Correlation dimension (slope of ln C against ln r).
    pub d2: f64,
    /// Standard error of the slope.
    pub stderr: f64,
    /// Intercept of the log-log fit.
    pub intercept: f64,
    /// Number of radii inside the scaling region.
    pub scaling_points: usize,
    /// Smallest fitted radius.
    pub r_min: f64,
    /// Largest fitted radius.
    pub r_max: f64,
}

/// Result of a single estimate.
///
/// `InsufficientScalingRegion` is a regular outcome rather than an error so
/// sweeps can skip a subset and continue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum D2Outcome {
    /// A fit over the scaling region.
    Estimate(D2Estimate),
    /// Too few radii (or distinct correlation-sum levels) inside the scaling region.
    InsufficientScalingRegion {
        /// Radii found inside the scaling region.
        points: usize,
        /// Distinct correlation-sum values among them.
        levels: usize,
    },
}

impl D2Outcome {
    /// Whether the outcome carries a numeric estimate.
    pub fn is_valid(&self) -> bool {
        matches!(self, D2Outcome::Estimate(_))
    }

    /// The estimate, if any.
    pub fn estimate(&self) -> Option<&D2Estimate> {
        match self {
            D2Outcome::Estimate(estimate) => Some(estimate),
            D2Outcome::InsufficientScalingRegion { .. } => None,
        }
    }

    /// D2 value, NaN when the scaling region was insufficient.
    pub fn value(&self) -> f64 {
        self.estimate().map(|e| e.d2).unwrap_or(f64::NAN)
    }

    /// Standard error, NaN when the scaling region was insufficient.
    pub fn stderr(&self) -> f64 {
        self.estimate().map(|e| e.stderr).unwrap_or(f64::NAN)
    }
}

/// Builds the correlation-sum curve of `features`.
pub fn correlation_curve(
    features: &FeatureSet,
    opts: &EstimateOpts,
) -> Result<CorrelationCurve, TfaError> {
    opts.validate()?;
    let n = features.len();
    if n < 2 {
        return Err(TfaError::DegenerateInput(
            ErrorInfo::new("too-few-points", "pairwise distances need at least two points")
                .with_context("points", n),
        ));
    }
    let distances = PairwiseDistances::compute(features);
    if distances.positive().is_empty() {
        return Err(TfaError::DegenerateInput(
            ErrorInfo::new("identical-points", "every pairwise distance is zero")
                .with_context("points", n)
                .with_hint("check the feature projection and normalization"),
        ));
    }
    let d_min = percentile(distances.positive(), opts.lower_percentile);
    let d_max = percentile(distances.all(), opts.upper_percentile);
    if d_min >= d_max {
        return Err(TfaError::DegenerateInput(
            ErrorInfo::new("no-distance-spread", "radius schedule collapses to a single value")
                .with_context("points", n)
                .with_context("d_min", d_min)
                .with_context("d_max", d_max),
        ));
    }

    let radii = log_spaced(d_min, d_max, opts.n_radii);
    let norm = n as f64 * (n as f64 - 1.0);
    let sums = radii
        .iter()
        .map(|r| 2.0 * distances.count_below(*r) as f64 / norm)
        .collect();
    Ok(CorrelationCurve {
        n_points: n,
        n_pairs: distances.len(),
        radii,
        sums,
    })
}

/// Estimates D2 with the reference options.
pub fn estimate(features: &FeatureSet) -> Result<D2Outcome, TfaError> {
    estimate_with(features, &EstimateOpts::default())
}

/// Estimates D2 with explicit options.
pub fn estimate_with(features: &FeatureSet, opts: &EstimateOpts) -> Result<D2Outcome, TfaError> {
    let curve = correlation_curve(features, opts)?;
    Ok(fit_curve(&curve, opts))
}

/// Fits the scaling region of an already computed curve.
pub fn fit_curve(curve: &CorrelationCurve, opts: &EstimateOpts) -> D2Outcome {
    let region = curve.scaling_region(opts.scaling_low, opts.scaling_high);
    let mut levels: Vec<f64> = region.iter().map(|&idx| curve.sums[idx]).collect();
    levels.dedup();
    if region.len() < opts.min_scaling_points || levels.len() < opts.min_scaling_points {
        return D2Outcome::InsufficientScalingRegion {
            points: region.len(),
            levels: levels.len(),
        };
    }

    let log_r: Vec<f64> = region.iter().map(|&idx| curve.radii[idx].ln()).collect();
    let log_c: Vec<f64> = region.iter().map(|&idx| curve.sums[idx].ln()).collect();
    match fit_line(&log_r, &log_c) {
        Ok(fit) => D2Outcome::Estimate(D2Estimate {
            d2: fit.slope,
            stderr: fit.slope_stderr(),
            intercept: fit.intercept,
            scaling_points: region.len(),
            r_min: curve.radii[region[0]],
            r_max: curve.radii[region[region.len() - 1]],
        }),
        // Radii are strictly increasing, so only a degenerate region reaches here.
        Err(_) => D2Outcome::InsufficientScalingRegion {
            points: region.len(),
            levels: levels.len(),
        },
    }
}
