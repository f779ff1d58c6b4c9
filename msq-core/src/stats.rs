//! Small numeric primitives assumed available by spec.md (linear regression,
//! basic descriptive statistics, the normal CDF) and centralized here rather
//! than re-derived at each call site, matching how the teacher centralizes
//! small math helpers in `mzcore::helper_functions` instead of duplicating
//! them per module.

/// Arithmetic mean. Returns `0.0` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation. Returns `0.0` for fewer than two values.
#[must_use]
pub fn stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Median of a slice. Returns `0.0` for an empty slice.
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Fit `y = slope * x` (no intercept) by ordinary least squares.
/// Returns `None` if `xs` and `ys` disagree in length, are empty, or `xs`
/// is all zero (degenerate, undefined slope).
#[must_use]
pub fn linear_regression_no_intercept(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.is_empty() {
        return None;
    }
    let numerator: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();
    let denominator: f64 = xs.iter().map(|x| x * x).sum();
    (denominator > 0.0).then_some(numerator / denominator)
}

/// Fit `y = intercept + slope * x` by ordinary least squares.
/// Returns `None` for fewer than two points or zero variance in `xs`.
#[must_use]
pub fn linear_regression(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mean_x = mean(xs);
    let mean_y = mean(ys);
    let mut cov = 0.0;
    let mut var_x = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
    }
    if var_x == 0.0 {
        return None;
    }
    let slope = cov / var_x;
    let intercept = mean_y - slope * mean_x;
    Some((intercept, slope))
}

/// Pearson correlation coefficient. Returns `0.0` for degenerate input
/// (fewer than two points, or zero variance in either series).
#[must_use]
pub fn pearson_correlation(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() || xs.len() < 2 {
        return 0.0;
    }
    let mean_x = mean(xs);
    let mean_y = mean(ys);
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

/// Standard normal cumulative distribution function, via the Abramowitz &
/// Stegun rational approximation (accurate to ~1e-7).
#[must_use]
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

fn erf(x: f64) -> f64 {
    // Abramowitz & Stegun formula 7.1.26.
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let a1 = 0.254_829_592;
    let a2 = -0.284_496_736;
    let a3 = 1.421_413_741;
    let a4 = -1.453_152_027;
    let a5 = 1.061_405_429;
    let p = 0.327_591_1;
    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();
    sign * y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_stddev_of_simple_series() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&values) - 5.0).abs() < 1e-9);
        assert!((stddev(&values) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn no_intercept_regression_recovers_known_slope() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys: Vec<f64> = xs.iter().map(|x| 2.5 * x).collect();
        let slope = linear_regression_no_intercept(&xs, &ys).unwrap();
        assert!((slope - 2.5).abs() < 1e-9);
    }

    #[test]
    fn normal_cdf_at_zero_is_one_half() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn pearson_correlation_of_perfectly_anticorrelated_series() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [4.0, 3.0, 2.0, 1.0];
        assert!((pearson_correlation(&xs, &ys) + 1.0).abs() < 1e-9);
    }
}
