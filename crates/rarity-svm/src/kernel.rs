//! Radial basis function kernel and precomputed Gram matrices.

use rayon::prelude::*;

/// Radial basis function kernel: `k(x, z) = exp(-gamma * ||x - z||^2)`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RbfKernel {
    gamma: f64,
}

impl RbfKernel {
    /// Create a kernel with the given coefficient.
    pub(crate) fn new(gamma: f64) -> Self {
        Self { gamma }
    }

    /// Return the kernel coefficient.
    #[must_use]
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Evaluate the kernel on two equal-length vectors.
    #[inline]
    #[must_use]
    pub fn eval(&self, x: &[f64], z: &[f64]) -> f64 {
        debug_assert_eq!(x.len(), z.len());
        let sq_dist: f64 = x.iter().zip(z).map(|(a, b)| (a - b) * (a - b)).sum();
        (-self.gamma * sq_dist).exp()
    }
}

/// Dense kernel matrix over one binary subproblem, row-major.
pub(crate) struct GramMatrix {
    n: usize,
    values: Vec<f64>,
}

impl GramMatrix {
    /// Evaluate the kernel on every pair of rows.
    pub(crate) fn compute(kernel: &RbfKernel, rows: &[&[f64]]) -> Self {
        let n = rows.len();
        let mut values = vec![0.0; n * n];
        if n > 0 {
            values
                .par_chunks_mut(n)
                .enumerate()
                .for_each(|(i, out)| {
                    for (j, slot) in out.iter_mut().enumerate() {
                        *slot = kernel.eval(rows[i], rows[j]);
                    }
                });
        }
        Self { n, values }
    }

    #[inline]
    pub(crate) fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n + j]
    }

    #[inline]
    pub(crate) fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.n..(i + 1) * self.n]
    }
}
