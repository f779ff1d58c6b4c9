//! Significance borders (§4.3.5): a V-shaped confidence region around the
//! (measured, predicted) scatter of cross-validated predictions, expanded
//! linearly until a target fraction of points falls inside.

use msq_core::stats::{normal_cdf, stddev};

/// The fitted V-shaped confidence region and its inferred local spread.
#[derive(Clone, Copy, Debug)]
pub struct SignificanceBorders {
    /// Intercept of the region's two bounding lines.
    pub intercept: f64,
    /// Slope of the upper bounding line (`1/slope` bounds the lower line).
    pub slope: f64,
    /// Standard deviation of residuals around the region's central slope,
    /// used to report a p-value for new points.
    pub sigma: f64,
}

fn fraction_inside(points: &[(f64, f64)], intercept: f64, slope: f64) -> f64 {
    if points.is_empty() {
        return 1.0;
    }
    let inside = points
        .iter()
        .filter(|&&(measured, predicted)| {
            predicted <= intercept + measured * slope && predicted >= -intercept + measured * (1.0 / slope)
        })
        .count();
    inside as f64 / points.len() as f64
}

impl SignificanceBorders {
    /// Search linearly for the smallest `(intercept, slope)` expansion (from
    /// `intercept = 0`, `slope = 1`) that covers at least `target_confidence`
    /// of `points`, expanding each by its step size per iteration, capped at
    /// `max_iterations`.
    #[must_use]
    pub fn fit(
        points: &[(f64, f64)],
        target_confidence: f64,
        intercept_step: f64,
        slope_step: f64,
        max_iterations: usize,
    ) -> Self {
        let mut intercept = 0.0_f64;
        let mut slope = 1.0_f64;
        for _ in 0..max_iterations {
            if fraction_inside(points, intercept, slope) >= target_confidence {
                break;
            }
            intercept += intercept_step;
            slope += slope_step;
        }

        let mid_slope = (slope + 1.0 / slope) / 2.0;
        let residuals: Vec<f64> = points
            .iter()
            .map(|&(measured, predicted)| predicted - measured * mid_slope)
            .collect();
        let sigma = stddev(&residuals).max(1e-9);

        Self {
            intercept,
            slope,
            sigma,
        }
    }

    /// Two-tailed p-value of a new `(measured, predicted)` point, via the
    /// normal CDF evaluated at the residual's distance in units of `sigma`.
    #[must_use]
    pub fn p_value(&self, measured: f64, predicted: f64) -> f64 {
        let mid_slope = (self.slope + 1.0 / self.slope) / 2.0;
        let residual = (predicted - measured * mid_slope).abs();
        2.0 * (1.0 - normal_cdf(residual / self.sigma))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widening_region_eventually_covers_all_points() {
        let points = vec![(1.0, 1.1), (2.0, 2.3), (3.0, 2.7), (4.0, 4.4)];
        let borders = SignificanceBorders::fit(&points, 1.0, 0.05, 0.01, 10_000);
        let fraction = fraction_inside(&points, borders.intercept, borders.slope);
        assert!(fraction >= 1.0 - 1e-9);
    }

    #[test]
    fn a_point_on_the_regression_line_has_a_high_p_value() {
        let points = vec![(1.0, 1.0), (2.0, 2.0), (3.0, 3.0), (4.0, 4.0), (5.0, 5.02)];
        let borders = SignificanceBorders::fit(&points, 0.8, 0.05, 0.01, 1000);
        assert!(borders.p_value(3.0, 3.0) > 0.05);
    }
}
