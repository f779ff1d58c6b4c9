//! Grid-based 2-D clustering of filtered seed points (spec.md §3, §4.2 step 3).

use std::collections::HashMap;

/// A 2-D rectangular grouping (RT × m/z) of filtered points, holding the
/// integer ids of its members.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cluster {
    pub members: Vec<usize>,
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect() }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

/// Clusters `points` (RT, m/z) using a grid sized by `rt_typical` (expected
/// elution width) and `mz_tolerance`, merging points in adjacent grid
/// cells. Discards clusters whose RT span is shorter than `rt_min`.
#[must_use]
pub fn cluster_points(points: &[(f64, f64)], rt_typical: f64, rt_min: f64, mz_tolerance: f64) -> Vec<Cluster> {
    if points.is_empty() || rt_typical <= 0.0 || mz_tolerance <= 0.0 {
        return Vec::new();
    }

    let cell = |p: &(f64, f64)| -> (i64, i64) {
        ((p.0 / rt_typical).floor() as i64, (p.1 / mz_tolerance).floor() as i64)
    };

    let mut by_cell: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, p) in points.iter().enumerate() {
        by_cell.entry(cell(p)).or_default().push(i);
    }

    let mut uf = UnionFind::new(points.len());
    for (&(cx, cy), members) in &by_cell {
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(neighbors) = by_cell.get(&(cx + dx, cy + dy)) {
                    for &a in members {
                        for &b in neighbors {
                            uf.union(a, b);
                        }
                    }
                }
            }
        }
    }

    let mut grouped: HashMap<usize, Vec<usize>> = HashMap::new();
    for i in 0..points.len() {
        let root = uf.find(i);
        grouped.entry(root).or_default().push(i);
    }

    grouped
        .into_values()
        .filter(|members| {
            let rts: Vec<f64> = members.iter().map(|&i| points[i].0).collect();
            let span = rts.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
                - rts.iter().cloned().fold(f64::INFINITY, f64::min);
            span >= rt_min
        })
        .map(|members| Cluster { members })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearby_points_merge_into_one_cluster() {
        let points = vec![(10.0, 500.0), (10.5, 500.05), (11.0, 500.1), (50.0, 600.0)];
        let clusters = cluster_points(&points, 2.0, 0.5, 0.05);
        assert_eq!(clusters.len(), 2);
        let big = clusters.iter().find(|c| c.members.len() == 3).unwrap();
        assert!(big.members.contains(&0) && big.members.contains(&1) && big.members.contains(&2));
    }

    #[test]
    fn short_lived_clusters_are_discarded() {
        let points = vec![(10.0, 500.0), (10.1, 500.0)];
        let clusters = cluster_points(&points, 2.0, 5.0, 0.05);
        assert!(clusters.is_empty());
    }
}
