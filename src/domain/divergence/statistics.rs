//! Dispersion statistics over numeric samples.
//!
//! Free functions, no state. Undefined results (empty input, a single value
//! for sample variance) come back as `None` rather than NaN.

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance using the unbiased (N-1) estimator.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let squared_deviations: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some(squared_deviations / (values.len() - 1) as f64)
}

/// Sample standard deviation (square root of the sample variance).
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Spread between the largest and smallest value.
pub fn range(values: &[f64]) -> Option<f64> {
    let first = *values.first()?;
    let (min, max) = values
        .iter()
        .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    Some(max - min)
}
