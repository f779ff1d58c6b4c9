//! Peak integration and background subtraction (spec.md §4.1.4).

use msq_core::chromatogram::{Chromatogram, ConvexHull};

use crate::traits::Integrator;
use crate::types::BaselineMode;

/// Linear interpolation of `chromatogram`'s intensity at `rt`. Returns `0.0`
/// outside the chromatogram's range.
pub(crate) fn interpolate(chromatogram: &Chromatogram, rt: f64) -> f64 {
    let points = &chromatogram.points;
    if points.is_empty() {
        return 0.0;
    }
    if rt <= points[0].rt.value() {
        return if rt == points[0].rt.value() {
            f64::from(points[0].intensity)
        } else {
            0.0
        };
    }
    if rt >= points[points.len() - 1].rt.value() {
        let last = points.len() - 1;
        return if rt == points[last].rt.value() {
            f64::from(points[last].intensity)
        } else {
            0.0
        };
    }
    for w in points.windows(2) {
        let (a, b) = (w[0], w[1]);
        if rt >= a.rt.value() && rt <= b.rt.value() {
            let span = b.rt.value() - a.rt.value();
            if span <= 0.0 {
                return f64::from(a.intensity);
            }
            let t = (rt - a.rt.value()) / span;
            return f64::from(a.intensity) + t * f64::from(b.intensity - a.intensity);
        }
    }
    0.0
}

/// Raw trapezoidal area under `chromatogram` within `[left, right]`, with no
/// baseline subtraction.
#[must_use]
pub fn trapezoid_area(chromatogram: &Chromatogram, left: f64, right: f64) -> f64 {
    let mut knots: Vec<f64> = chromatogram
        .points
        .iter()
        .map(|p| p.rt.value())
        .filter(|rt| *rt > left && *rt < right)
        .collect();
    knots.push(left);
    knots.push(right);
    knots.sort_by(f64::total_cmp);

    knots
        .windows(2)
        .map(|w| {
            let (a, b) = (w[0], w[1]);
            let ia = interpolate(chromatogram, a);
            let ib = interpolate(chromatogram, b);
            0.5 * (ia + ib) * (b - a)
        })
        .sum()
}

/// The apex (retention time, intensity) within `[left, right]`.
#[must_use]
pub fn apex_within(chromatogram: &Chromatogram, left: f64, right: f64) -> Option<(f64, f64)> {
    chromatogram
        .points
        .iter()
        .filter(|p| p.rt.value() >= left && p.rt.value() <= right)
        .map(|p| (p.rt.value(), f64::from(p.intensity)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

/// Integrates `[left, right]` according to a [`BaselineMode`] strategy.
///
/// `Original` subtracts the trapezoid formed by the window's edge
/// intensities from the raw area. `Exact` defers to an externally supplied
/// background estimate (spec.md leaves the estimator itself a caller
/// concern; this implementation treats "no estimator supplied" as zero
/// background, i.e. equivalent to the raw area).
#[derive(Clone, Copy, Debug)]
pub struct TrapezoidIntegrator {
    pub mode: BaselineMode,
}

impl Integrator for TrapezoidIntegrator {
    fn integrate(&self, chromatogram: &Chromatogram, left: f64, right: f64) -> f64 {
        let raw = trapezoid_area(chromatogram, left, right);
        match self.mode {
            BaselineMode::Original => {
                let baseline = 0.5
                    * (interpolate(chromatogram, left) + interpolate(chromatogram, right))
                    * (right - left);
                (raw - baseline).max(0.0)
            }
            BaselineMode::Exact => raw,
        }
    }
}

/// The per-trace bounding box (spec.md §4.1.4 "convex hulls") of
/// `chromatogram`'s points within `[left, right]`. `None` if no point falls
/// in the window.
#[must_use]
pub fn convex_hull_within(chromatogram: &Chromatogram, left: f64, right: f64) -> Option<ConvexHull> {
    let mut hull: Option<ConvexHull> = None;
    for p in chromatogram.points.iter().filter(|p| p.rt.value() >= left && p.rt.value() <= right) {
        let rt = p.rt.value();
        let intensity = f64::from(p.intensity);
        hull = Some(match hull {
            None => ConvexHull { rt_min: rt, rt_max: rt, intensity_min: intensity, intensity_max: intensity },
            Some(h) => ConvexHull {
                rt_min: h.rt_min.min(rt),
                rt_max: h.rt_max.max(rt),
                intensity_min: h.intensity_min.min(intensity),
                intensity_max: h.intensity_max.max(intensity),
            },
        });
    }
    hull
}

#[cfg(test)]
mod tests {
    use super::*;
    use msq_core::chromatogram::ChromatogramPoint;
    use msq_core::quantity::RetentionTime;

    fn triangle(apex_rt: f64, apex_intensity: f32, half_width: f64) -> Chromatogram {
        Chromatogram {
            points: vec![
                ChromatogramPoint { rt: RetentionTime(apex_rt - half_width), intensity: 0.0 },
                ChromatogramPoint { rt: RetentionTime(apex_rt), intensity: apex_intensity },
                ChromatogramPoint { rt: RetentionTime(apex_rt + half_width), intensity: 0.0 },
            ],
            ..Chromatogram::default()
        }
    }

    #[test]
    fn trapezoid_area_of_a_triangle_matches_closed_form() {
        let c = triangle(10.0, 100.0, 2.0);
        let area = trapezoid_area(&c, 8.0, 12.0);
        // Area of a triangle with base 4 and height 100 is 200.
        assert!((area - 200.0).abs() < 1e-9);
    }

    #[test]
    fn original_mode_subtracts_zero_baseline_when_edges_are_zero() {
        let c = triangle(10.0, 100.0, 2.0);
        let integrator = TrapezoidIntegrator { mode: BaselineMode::Original };
        let area = integrator.integrate(&c, 8.0, 12.0);
        assert!((area - 200.0).abs() < 1e-9);
    }

    #[test]
    fn apex_within_finds_the_local_maximum() {
        let c = triangle(10.0, 100.0, 2.0);
        let (rt, intensity) = apex_within(&c, 8.0, 12.0).unwrap();
        assert!((rt - 10.0).abs() < 1e-9);
        assert!((intensity - 100.0).abs() < 1e-9);
    }

    #[test]
    fn convex_hull_spans_the_points_within_the_window() {
        let c = triangle(10.0, 100.0, 2.0);
        let hull = convex_hull_within(&c, 8.0, 12.0).unwrap();
        assert_eq!((hull.rt_min, hull.rt_max), (8.0, 12.0));
        assert_eq!((hull.intensity_min, hull.intensity_max), (0.0, 100.0));
        assert!(convex_hull_within(&c, 100.0, 200.0).is_none());
    }
}
