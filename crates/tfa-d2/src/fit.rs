use serde::{Deserialize, Serialize};
use tfa_core::errors::{ErrorInfo, TfaError};

/// Ordinary least-squares line `y = slope * x + intercept` with its parameter
/// covariance.
///
/// The covariance is scaled by `residual_ss / (points - 2)`, so a perfect fit
/// reports zero uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    /// Fitted slope.
    pub slope: f64,
    /// Fitted intercept.
    pub intercept: f64,
    /// Variance of the slope.
    pub slope_variance: f64,
    /// Variance of the intercept.
    pub intercept_variance: f64,
    /// Covariance between slope and intercept.
    pub covariance: f64,
    /// Sum of squared residuals.
    pub residual_ss: f64,
    /// Number of points used in the fit.
    pub points: usize,
}

impl LinearFit {
    /// Standard error of the slope.
    pub fn slope_stderr(&self) -> f64 {
        self.slope_variance.sqrt()
    }
}

/// Fits a first-degree polynomial to `(xs, ys)`.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Result<LinearFit, TfaError> {
    if xs.len() != ys.len() {
        return Err(TfaError::InvalidInput(
            ErrorInfo::new("fit-length-mismatch", "abscissa and ordinate lengths differ")
                .with_context("xs", xs.len())
                .with_context("ys", ys.len()),
        ));
    }
    let points = xs.len();
    if points < 3 {
        return Err(TfaError::InvalidInput(
            ErrorInfo::new("fit-too-few-points", "covariance needs at least three points")
                .with_context("points", points),
        ));
    }
    let m = points as f64;
    let mean_x = xs.iter().sum::<f64>() / m;
    let mean_y = ys.iter().sum::<f64>() / m;
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }
    if sxx <= 0.0 {
        return Err(TfaError::DegenerateInput(
            ErrorInfo::new("constant-abscissa", "all abscissae coincide")
                .with_context("points", points),
        ));
    }
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let residual_ss = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| {
            let r = y - (slope * x + intercept);
            r * r
        })
        .sum::<f64>();
    let scale = residual_ss / (m - 2.0);
    Ok(LinearFit {
        slope,
        intercept,
        slope_variance: scale / sxx,
        intercept_variance: scale * (1.0 / m + mean_x * mean_x / sxx),
        covariance: -scale * mean_x / sxx,
        residual_ss,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_line_has_zero_variance() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x - 1.0).collect();
        let fit = fit_line(&xs, &ys).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept + 1.0).abs() < 1e-12);
        assert!(fit.slope_variance.abs() < 1e-20);
    }

    #[test]
    fn noisy_line_matches_closed_form() {
        // y = x with residuals (+1, -1, -1, +1) around the line.
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 0.0, 1.0, 4.0];
        let fit = fit_line(&xs, &ys).unwrap();
        assert!((fit.slope - 1.0).abs() < 1e-12);
        assert!((fit.intercept - 0.0).abs() < 1e-12);
        assert!((fit.residual_ss - 4.0).abs() < 1e-12);
        // sigma^2 = 4 / 2, Sxx = 5
        assert!((fit.slope_variance - 0.4).abs() < 1e-12);
        assert!((fit.slope_stderr() - 0.4f64.sqrt()).abs() < 1e-12);
        assert!((fit.intercept_variance - 2.0 * (0.25 + 2.25 / 5.0)).abs() < 1e-12);
    }

    #[test]
    fn rejects_short_or_flat_input() {
        assert!(fit_line(&[0.0, 1.0], &[0.0, 1.0]).is_err());
        let err = fit_line(&[1.0, 1.0, 1.0], &[0.0, 1.0, 2.0]).unwrap_err();
        assert!(err.is_degenerate());
    }
}
