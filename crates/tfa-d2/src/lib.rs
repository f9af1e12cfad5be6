//! Grassberger-Procaccia correlation-dimension (D2) estimation with seeded,
//! parallel bootstrap resampling. The estimator is a pure function of its
//! inputs and never logs.

#![deny(missing_docs)]

/// Bootstrap resampling of the estimator.
pub mod bootstrap;
/// Sorted pairwise Euclidean distances.
pub mod distance;
/// Correlation-sum curves and the D2 fit.
pub mod estimate;
/// Least-squares line fit with parameter covariance.
pub mod fit;
/// Percentiles and logarithmic radius schedules.
pub mod radii;

pub use bootstrap::{
    bootstrap_estimate, bootstrap_estimate_with_rng, BootstrapOpts, BootstrapSummary,
};
pub use distance::PairwiseDistances;
pub use estimate::{
    correlation_curve, estimate, estimate_with, fit_curve, CorrelationCurve, D2Estimate,
    D2Outcome, EstimateOpts,
};
pub use fit::{fit_line, LinearFit};
pub use radii::{log_spaced, percentile};
