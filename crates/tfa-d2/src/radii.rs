/// Linearly interpolated percentile of ascending `values`, `quantile` in [0, 1].
///
/// Position `quantile * (len - 1)` is interpolated between its neighbouring
/// ranks. Returns NaN for an empty slice.
pub fn percentile(values: &[f64], quantile: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let position = quantile * (values.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        values[lower]
    } else {
        let weight = position - lower as f64;
        values[lower] * (1.0 - weight) + values[upper] * weight
    }
}

/// `count` values spaced uniformly in log10 between `start` and `stop`, both
/// included. Both bounds must be positive.
pub fn log_spaced(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let a = start.log10();
            let b = stop.log10();
            let step = (b - a) / (count - 1) as f64;
            let mut values: Vec<f64> = (0..count)
                .map(|idx| 10f64.powf(a + idx as f64 * step))
                .collect();
            values[count - 1] = stop;
            values
        }
    }
}
