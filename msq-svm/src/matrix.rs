//! Kernel matrix construction (§4.3.2): libsvm's "precomputed kernel" row
//! format, one row per training sample against a second sequence set.

use ndarray::Array2;

use crate::kernel::{OligoKernel, Residue};

/// A libsvm-style precomputed-kernel matrix: one row per sample in `a`,
/// `b.len()` kernel-value columns, plus a leading 1-based sample id and a
/// trailing end-of-row sentinel.
#[derive(Clone, Debug)]
pub struct KernelMatrix {
    /// `rows[i][0]` is the 1-based id of training sample `i`; `rows[i][1..=m]`
    /// are its kernel values against each of the `m` sequences in `b`;
    /// `rows[i][m + 1]` is the sentinel marking the row's logical end.
    pub rows: Vec<Vec<f64>>,
    /// Number of columns contributed by `b` (excluding id/sentinel).
    pub width: usize,
}

/// Sentinel value marking the logical end of a precomputed-kernel row.
pub const ROW_END_SENTINEL: f64 = f64::INFINITY;

impl KernelMatrix {
    /// Build the matrix of `a` (rows) against `b` (columns). If `a` and `b`
    /// are the same sequence set, pass `symmetric = true` to exploit
    /// `k(x, y) = k(y, x)` and halve the kernel evaluations.
    #[must_use]
    pub fn build(kernel: &OligoKernel, a: &[Vec<Residue>], b: &[Vec<Residue>], symmetric: bool) -> Self {
        let n = a.len();
        let m = b.len();
        let mut values = Array2::<f64>::zeros((n, m));

        if symmetric {
            for i in 0..n {
                for j in i..m {
                    let v = kernel.evaluate(&a[i], &b[j]);
                    values[[i, j]] = v;
                    if j < n && i < m {
                        values[[j, i]] = v;
                    }
                }
            }
        } else {
            for i in 0..n {
                for j in 0..m {
                    values[[i, j]] = kernel.evaluate(&a[i], &b[j]);
                }
            }
        }

        let rows = (0..n)
            .map(|i| {
                let mut row = Vec::with_capacity(m + 2);
                row.push((i + 1) as f64);
                row.extend(values.row(i).iter().copied());
                row.push(ROW_END_SENTINEL);
                row
            })
            .collect();

        Self { rows, width: m }
    }

    /// The kernel values of row `i`, excluding the id and sentinel columns.
    #[must_use]
    pub fn values(&self, i: usize) -> &[f64] {
        &self.rows[i][1..1 + self.width]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_build_matches_full_build() {
        let kernel = OligoKernel::new(8, 2.0, 5);
        let seqs: Vec<Vec<Residue>> = vec![
            vec![(0, b'A'), (3, b'C')],
            vec![(1, b'A'), (2, b'G')],
            vec![(0, b'C'), (4, b'A')],
        ];
        let symmetric = KernelMatrix::build(&kernel, &seqs, &seqs, true);
        let full = KernelMatrix::build(&kernel, &seqs, &seqs, false);
        for i in 0..seqs.len() {
            assert_eq!(symmetric.values(i), full.values(i));
        }
    }

    #[test]
    fn row_shape_has_id_values_and_sentinel() {
        let kernel = OligoKernel::new(4, 1.0, 2);
        let seqs: Vec<Vec<Residue>> = vec![vec![(0, b'A')], vec![(1, b'A')]];
        let matrix = KernelMatrix::build(&kernel, &seqs, &seqs, true);
        assert_eq!(matrix.rows[0].len(), seqs.len() + 2);
        assert_eq!(matrix.rows[0][0], 1.0);
        assert_eq!(*matrix.rows[0].last().unwrap(), ROW_END_SENTINEL);
    }
}
