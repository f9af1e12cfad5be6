#![allow(dead_code)]

use rand::Rng;
use tfa_core::{FeatureSet, RngHandle};
use tfa_d2::EstimateOpts;

pub fn unit_square(n: usize, seed: u64) -> FeatureSet {
    let mut rng = RngHandle::from_seed(seed);
    let rows: Vec<[f64; 2]> = (0..n).map(|_| [rng.gen::<f64>(), rng.gen::<f64>()]).collect();
    FeatureSet::from_rows(&rows).expect("square")
}

pub fn unit_cube(n: usize, seed: u64) -> FeatureSet {
    let mut rng = RngHandle::from_seed(seed);
    let rows: Vec<[f64; 3]> = (0..n)
        .map(|_| [rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>()])
        .collect();
    FeatureSet::from_rows(&rows).expect("cube")
}

/// Uniform points on the unit segment from (0, 0) to (1, 0).
pub fn unit_segment(n: usize, seed: u64) -> FeatureSet {
    let mut rng = RngHandle::from_seed(seed);
    let rows: Vec<[f64; 2]> = (0..n).map(|_| [rng.gen::<f64>(), 0.0]).collect();
    FeatureSet::from_rows(&rows).expect("segment")
}

/// Schedule restricted to small radii, below the scale where the square's
/// edges flatten the correlation sum.
pub fn small_scale_opts() -> EstimateOpts {
    EstimateOpts {
        lower_percentile: 0.001,
        upper_percentile: 0.2,
        scaling_low: 0.0005,
        scaling_high: 0.2,
        ..EstimateOpts::default()
    }
}
