//! Consensus border recalculation (spec.md §4.1.2): for each edge (left,
//! right) of the seed chromatogram's own boundary, test it against the
//! population of every peer chromatogram's boundary for the same window. If
//! the seed's edge is a z-score outlier against that population, replace
//! that edge alone with the population median; peer boundaries are never
//! touched by this step. This rejects outlier borders contributed by the
//! seed chromatogram alone.

use msq_core::stats::{mean, median, stddev};

/// Recomputes `(left, right)` from the seed chromatogram's own boundary and
/// its peers' boundaries. Each edge of `seed` is compared, independently,
/// against the mean/stddev of that edge across `{seed} ∪ peers`; an edge
/// more than `max_z` standard deviations from the mean is replaced by the
/// median of that same population. Returns `seed` unchanged if `peers` is
/// empty.
#[must_use]
pub fn recalculate_borders(seed: (f64, f64), peers: &[(f64, f64)], max_z: f64) -> (f64, f64) {
    if peers.is_empty() {
        return seed;
    }
    let lefts: Vec<f64> = std::iter::once(seed.0).chain(peers.iter().map(|b| b.0)).collect();
    let rights: Vec<f64> = std::iter::once(seed.1).chain(peers.iter().map(|b| b.1)).collect();

    let left = recalculate_edge(seed.0, &lefts, max_z);
    let right = recalculate_edge(seed.1, &rights, max_z);
    (left, right)
}

/// Tests one of the seed's edges against the collected population of that
/// same edge; replaces it with the population median if it is an outlier.
fn recalculate_edge(seed_edge: f64, population: &[f64], max_z: f64) -> f64 {
    let m = mean(population);
    let sd = stddev(population);
    if sd > 0.0 && ((seed_edge - m) / sd).abs() > max_z {
        median(population)
    } else {
        seed_edge
    }
}
