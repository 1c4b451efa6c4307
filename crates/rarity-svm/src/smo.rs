//! Sequential minimal optimization for the binary C-SVC dual.
//!
//! Solves `min 0.5 a'Qa - e'a` subject to `0 <= a_i <= C`, `y'a = 0`, where
//! `Q_ij = y_i y_j K(x_i, x_j)`. Working pairs are chosen with second-order
//! information (Fan, Chen and Lin, 2005).

use tracing::warn;

use crate::kernel::{GramMatrix, RbfKernel};

/// Floor for non-positive curvature along the working direction.
const TAU: f64 = 1e-12;

/// Parameters shared by every binary solve of one fit.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SolverParams {
    pub(crate) kernel: RbfKernel,
    pub(crate) c: f64,
    pub(crate) tol: f64,
    pub(crate) max_iter: usize,
}

/// A trained binary decision function `f(x) = sum(coef_i K(sv_i, x)) - rho`.
#[derive(Debug, Clone)]
pub(crate) struct BinaryFit {
    pub(crate) support_vectors: Vec<Vec<f64>>,
    /// `alpha_i * y_i` for each support vector.
    pub(crate) coefficients: Vec<f64>,
    pub(crate) rho: f64,
}

impl BinaryFit {
    /// Train on `rows` with targets `y` in `{+1, -1}`. Both signs must be present.
    pub(crate) fn train(rows: &[&[f64]], y: &[f64], params: &SolverParams) -> Self {
        let gram = GramMatrix::compute(&params.kernel, rows);
        let solution = solve(&gram, y, params.c, params.tol, params.max_iter);
        if !solution.converged {
            warn!(
                iterations = solution.iterations,
                n_samples = rows.len(),
                "SMO reached max_iter before convergence"
            );
        }

        let mut support_vectors = Vec::new();
        let mut coefficients = Vec::new();
        for (i, &a) in solution.alpha.iter().enumerate() {
            if a > 0.0 {
                support_vectors.push(rows[i].to_vec());
                coefficients.push(a * y[i]);
            }
        }

        Self {
            support_vectors,
            coefficients,
            rho: solution.rho,
        }
    }

    #[inline]
    pub(crate) fn decision_value(&self, kernel: &RbfKernel, x: &[f64]) -> f64 {
        let sum: f64 = self
            .support_vectors
            .iter()
            .zip(&self.coefficients)
            .map(|(sv, coef)| coef * kernel.eval(sv, x))
            .sum();
        sum - self.rho
    }
}

pub(crate) struct SmoSolution {
    pub(crate) alpha: Vec<f64>,
    pub(crate) rho: f64,
    pub(crate) iterations: usize,
    pub(crate) converged: bool,
}

pub(crate) fn solve(gram: &GramMatrix, y: &[f64], c: f64, tol: f64, max_iter: usize) -> SmoSolution {
    let n = y.len();
    let mut alpha = vec![0.0f64; n];
    // Gradient of the dual objective; starts at -e because alpha = 0.
    let mut grad = vec![-1.0f64; n];
    let qd: Vec<f64> = (0..n).map(|i| gram.get(i, i)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iter {
        let Some((i, j)) = select_working_set(gram, &qd, y, &alpha, &grad, c, tol) else {
            converged = true;
            break;
        };
        iterations += 1;

        let old_ai = alpha[i];
        let old_aj = alpha[j];
        let q_ij = y[i] * y[j] * gram.get(i, j);

        if y[i] != y[j] {
            let mut quad = qd[i] + qd[j] + 2.0 * q_ij;
            if quad <= 0.0 {
                quad = TAU;
            }
            let delta = (-grad[i] - grad[j]) / quad;
            let diff = alpha[i] - alpha[j];
            alpha[i] += delta;
            alpha[j] += delta;

            if diff > 0.0 {
                if alpha[j] < 0.0 {
                    alpha[j] = 0.0;
                    alpha[i] = diff;
                }
            } else if alpha[i] < 0.0 {
                alpha[i] = 0.0;
                alpha[j] = -diff;
            }
            // Equal box bounds on both sides: diff > C_i - C_j reduces to diff > 0.
            if diff > 0.0 {
                if alpha[i] > c {
                    alpha[i] = c;
                    alpha[j] = c - diff;
                }
            } else if alpha[j] > c {
                alpha[j] = c;
                alpha[i] = c + diff;
            }
        } else {
            let mut quad = qd[i] + qd[j] - 2.0 * q_ij;
            if quad <= 0.0 {
                quad = TAU;
            }
            let delta = (grad[i] - grad[j]) / quad;
            let sum = alpha[i] + alpha[j];
            alpha[i] -= delta;
            alpha[j] += delta;

            if sum > c {
                if alpha[i] > c {
                    alpha[i] = c;
                    alpha[j] = sum - c;
                }
            } else if alpha[j] < 0.0 {
                alpha[j] = 0.0;
                alpha[i] = sum;
            }
            if sum > c {
                if alpha[j] > c {
                    alpha[j] = c;
                    alpha[i] = sum - c;
                }
            } else if alpha[i] < 0.0 {
                alpha[i] = 0.0;
                alpha[j] = sum;
            }
        }

        let delta_i = alpha[i] - old_ai;
        let delta_j = alpha[j] - old_aj;
        let row_i = gram.row(i);
        let row_j = gram.row(j);
        for k in 0..n {
            grad[k] += y[k] * (y[i] * row_i[k] * delta_i + y[j] * row_j[k] * delta_j);
        }
    }

    let rho = compute_rho(y, &alpha, &grad, c);
    SmoSolution {
        alpha,
        rho,
        iterations,
        converged,
    }
}

/// Pick the maximal violating index `i`, then the `j` with the largest
/// second-order decrease of the objective. `None` once the KKT gap is below `tol`.
fn select_working_set(
    gram: &GramMatrix,
    qd: &[f64],
    y: &[f64],
    alpha: &[f64],
    grad: &[f64],
    c: f64,
    tol: f64,
) -> Option<(usize, usize)> {
    let n = y.len();

    let mut gmax = f64::NEG_INFINITY;
    let mut gmax_idx = None;
    for t in 0..n {
        if y[t] > 0.0 {
            if alpha[t] < c && -grad[t] >= gmax {
                gmax = -grad[t];
                gmax_idx = Some(t);
            }
        } else if alpha[t] > 0.0 && grad[t] >= gmax {
            gmax = grad[t];
            gmax_idx = Some(t);
        }
    }
    let i = gmax_idx?;

    let row_i = gram.row(i);
    let mut gmax2 = f64::NEG_INFINITY;
    let mut gmin_idx = None;
    let mut obj_diff_min = f64::INFINITY;

    for t in 0..n {
        if y[t] > 0.0 {
            if alpha[t] > 0.0 {
                let grad_diff = gmax + grad[t];
                if grad[t] >= gmax2 {
                    gmax2 = grad[t];
                }
                if grad_diff > 0.0 {
                    // y_i * Q_it = y_t * K_it
                    let quad = qd[i] + qd[t] - 2.0 * y[t] * row_i[t];
                    let obj_diff = -(grad_diff * grad_diff) / if quad > 0.0 { quad } else { TAU };
                    if obj_diff <= obj_diff_min {
                        gmin_idx = Some(t);
                        obj_diff_min = obj_diff;
                    }
                }
            }
        } else if alpha[t] < c {
            let grad_diff = gmax - grad[t];
            if -grad[t] >= gmax2 {
                gmax2 = -grad[t];
            }
            if grad_diff > 0.0 {
                let quad = qd[i] + qd[t] + 2.0 * y[t] * row_i[t];
                let obj_diff = -(grad_diff * grad_diff) / if quad > 0.0 { quad } else { TAU };
                if obj_diff <= obj_diff_min {
                    gmin_idx = Some(t);
                    obj_diff_min = obj_diff;
                }
            }
        }
    }

    if gmax + gmax2 < tol {
        return None;
    }
    gmin_idx.map(|j| (i, j))
}

/// Offset from free support vectors, or the midpoint of the feasible
/// interval when every alpha sits at a bound.
fn compute_rho(y: &[f64], alpha: &[f64], grad: &[f64], c: f64) -> f64 {
    let mut ub = f64::INFINITY;
    let mut lb = f64::NEG_INFINITY;
    let mut n_free = 0usize;
    let mut sum_free = 0.0;

    for t in 0..y.len() {
        let yg = y[t] * grad[t];
        if alpha[t] >= c {
            if y[t] < 0.0 {
                ub = ub.min(yg);
            } else {
                lb = lb.max(yg);
            }
        } else if alpha[t] <= 0.0 {
            if y[t] > 0.0 {
                ub = ub.min(yg);
            } else {
                lb = lb.max(yg);
            }
        } else {
            n_free += 1;
            sum_free += yg;
        }
    }

    if n_free > 0 {
        return sum_free / n_free as f64;
    }
    match (ub.is_finite(), lb.is_finite()) {
        (true, true) => (ub + lb) / 2.0,
        (true, false) => ub,
        (false, true) => lb,
        (false, false) => 0.0,
    }
}
