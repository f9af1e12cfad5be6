use tfa_core::FeatureSet;

/// Euclidean distances of every unordered pair `(i, j)` with `i < j`, sorted
/// ascending.
///
/// Zero distances from duplicate points are kept; they still count towards
/// every correlation sum.
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseDistances {
    sorted: Vec<f64>,
    first_positive: usize,
}

impl PairwiseDistances {
    /// Computes the distance set for `features`.
    pub fn compute(features: &FeatureSet) -> Self {
        let n = features.len();
        let mut sorted = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            let a = features.row(i);
            for j in (i + 1)..n {
                sorted.push(euclidean(a, features.row(j)));
            }
        }
        sorted.sort_unstable_by(|a, b| a.total_cmp(b));
        let first_positive = sorted.partition_point(|d| *d <= 0.0);
        Self {
            sorted,
            first_positive,
        }
    }

    /// Number of unordered pairs.
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// Returns true when no pair exists.
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// All distances, ascending.
    pub fn all(&self) -> &[f64] {
        &self.sorted
    }

    /// Strictly positive distances, ascending.
    pub fn positive(&self) -> &[f64] {
        &self.sorted[self.first_positive..]
    }

    /// Number of pairs with distance strictly below `radius`.
    pub fn count_below(&self, radius: f64) -> usize {
        self.sorted.partition_point(|d| *d < radius)
    }
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
