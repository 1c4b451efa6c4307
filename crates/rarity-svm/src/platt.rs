//! Probability calibration: Platt sigmoids and pairwise coupling.
//!
//! Each pairwise decision function gets a sigmoid `1 / (1 + exp(A f + B))`
//! fitted by Newton's method with backtracking (Lin, Lin and Weng, 2007) on
//! decision values that were produced by models which never saw the sample.
//! Pairwise probabilities are then coupled into one distribution following
//! the second method of Wu, Lin and Weng (2004).

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::smo::{BinaryFit, SolverParams};

const NEWTON_MAX_ITER: usize = 100;
const NEWTON_MIN_STEP: f64 = 1e-10;
const HESSIAN_RIDGE: f64 = 1e-12;
const NEWTON_EPS: f64 = 1e-5;

/// Pairwise probabilities are clamped into `[MIN_PROB, 1 - MIN_PROB]`.
pub(crate) const MIN_PROB: f64 = 1e-7;

/// Sigmoid mapping a decision value to `P(positive class)`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Sigmoid {
    a: f64,
    b: f64,
}

impl Sigmoid {
    /// Return the slope parameter `A`.
    #[must_use]
    pub fn a(&self) -> f64 {
        self.a
    }

    /// Return the offset parameter `B`.
    #[must_use]
    pub fn b(&self) -> f64 {
        self.b
    }

    /// Probability that a sample with decision value `f` belongs to the positive class.
    #[must_use]
    pub fn probability(&self, f: f64) -> f64 {
        let fapb = f * self.a + self.b;
        // Two branches keep exp() from overflowing.
        if fapb >= 0.0 {
            (-fapb).exp() / (1.0 + (-fapb).exp())
        } else {
            1.0 / (1.0 + fapb.exp())
        }
    }

    /// Fit `A` and `B` to decision values and `{+1, -1}` targets.
    pub(crate) fn fit(decision_values: &[f64], y: &[f64]) -> Self {
        let prior1 = y.iter().filter(|&&t| t > 0.0).count() as f64;
        let prior0 = y.len() as f64 - prior1;

        let hi_target = (prior1 + 1.0) / (prior1 + 2.0);
        let lo_target = 1.0 / (prior0 + 2.0);
        let targets: Vec<f64> = y
            .iter()
            .map(|&t| if t > 0.0 { hi_target } else { lo_target })
            .collect();

        let objective = |a: f64, b: f64| -> f64 {
            decision_values
                .iter()
                .zip(&targets)
                .map(|(&f, &t)| {
                    let fapb = f * a + b;
                    if fapb >= 0.0 {
                        t * fapb + (1.0 + (-fapb).exp()).ln()
                    } else {
                        (t - 1.0) * fapb + (1.0 + fapb.exp()).ln()
                    }
                })
                .sum()
        };

        let mut a = 0.0;
        let mut b = ((prior0 + 1.0) / (prior1 + 1.0)).ln();
        let mut fval = objective(a, b);

        for _ in 0..NEWTON_MAX_ITER {
            let mut h11 = HESSIAN_RIDGE;
            let mut h22 = HESSIAN_RIDGE;
            let mut h21 = 0.0;
            let mut g1 = 0.0;
            let mut g2 = 0.0;
            for (&f, &t) in decision_values.iter().zip(&targets) {
                let fapb = f * a + b;
                let (p, q) = if fapb >= 0.0 {
                    let e = (-fapb).exp();
                    (e / (1.0 + e), 1.0 / (1.0 + e))
                } else {
                    let e = fapb.exp();
                    (1.0 / (1.0 + e), e / (1.0 + e))
                };
                let d2 = p * q;
                h11 += f * f * d2;
                h22 += d2;
                h21 += f * d2;
                let d1 = t - p;
                g1 += f * d1;
                g2 += d1;
            }

            if g1.abs() < NEWTON_EPS && g2.abs() < NEWTON_EPS {
                break;
            }

            let det = h11 * h22 - h21 * h21;
            let da = -(h22 * g1 - h21 * g2) / det;
            let db = -(-h21 * g1 + h11 * g2) / det;
            let gd = g1 * da + g2 * db;

            let mut step = 1.0;
            while step >= NEWTON_MIN_STEP {
                let new_a = a + step * da;
                let new_b = b + step * db;
                let new_f = objective(new_a, new_b);
                if new_f < fval + 0.0001 * step * gd {
                    a = new_a;
                    b = new_b;
                    fval = new_f;
                    break;
                }
                step /= 2.0;
            }
            if step < NEWTON_MIN_STEP {
                break;
            }
        }

        Self { a, b }
    }
}

/// Decision values for every sample from models trained on the other folds.
///
/// Samples are shuffled with `rng` and cut into `folds` contiguous folds.
/// A training split with a single class contributes a constant `+1` / `-1`.
pub(crate) fn cross_validated_decision_values(
    rows: &[&[f64]],
    y: &[f64],
    params: &SolverParams,
    folds: usize,
    rng: &mut ChaCha8Rng,
) -> Vec<f64> {
    let n = rows.len();
    let mut perm: Vec<usize> = (0..n).collect();
    perm.shuffle(rng);

    let mut decision = vec![0.0; n];
    for fold in 0..folds {
        let begin = fold * n / folds;
        let end = (fold + 1) * n / folds;
        let held_out = &perm[begin..end];
        if held_out.is_empty() {
            continue;
        }

        let train: Vec<usize> = perm[..begin].iter().chain(&perm[end..]).copied().collect();
        let n_pos = train.iter().filter(|&&i| y[i] > 0.0).count();
        let n_neg = train.len() - n_pos;

        let constant = match (n_pos, n_neg) {
            (0, 0) => Some(0.0),
            (_, 0) => Some(1.0),
            (0, _) => Some(-1.0),
            _ => None,
        };

        if let Some(value) = constant {
            for &i in held_out {
                decision[i] = value;
            }
            continue;
        }

        let train_rows: Vec<&[f64]> = train.iter().map(|&i| rows[i]).collect();
        let train_y: Vec<f64> = train.iter().map(|&i| y[i]).collect();
        let fit = BinaryFit::train(&train_rows, &train_y, params);
        for &i in held_out {
            decision[i] = fit.decision_value(&params.kernel, rows[i]);
        }
    }
    decision
}

/// Couple the pairwise matrix `r[i][j] = P(i | i or j)` into a distribution over `k` classes.
pub(crate) fn couple(r: &[Vec<f64>], k: usize) -> Vec<f64> {
    let max_iter = k.max(100);
    let eps = 0.005 / k as f64;

    let mut q = vec![vec![0.0f64; k]; k];
    for t in 0..k {
        for j in 0..k {
            if j == t {
                continue;
            }
            q[t][t] += r[j][t] * r[j][t];
            q[t][j] = -r[j][t] * r[t][j];
        }
    }

    let mut p = vec![1.0 / k as f64; k];
    let mut qp = vec![0.0f64; k];

    for _ in 0..max_iter {
        let mut pqp = 0.0;
        for t in 0..k {
            qp[t] = (0..k).map(|j| q[t][j] * p[j]).sum();
            pqp += p[t] * qp[t];
        }

        let max_error = qp
            .iter()
            .map(|&v| (v - pqp).abs())
            .fold(0.0f64, f64::max);
        if max_error < eps {
            break;
        }

        for t in 0..k {
            let diff = (-qp[t] + pqp) / q[t][t];
            p[t] += diff;
            pqp = (pqp + diff * (diff * q[t][t] + 2.0 * qp[t])) / (1.0 + diff) / (1.0 + diff);
            for j in 0..k {
                qp[j] = (qp[j] + diff * q[t][j]) / (1.0 + diff);
                p[j] /= 1.0 + diff;
            }
        }
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_is_monotone_decreasing_in_margin_for_positive_targets() {
        let dec = [-3.0, -2.0, -1.5, 1.2, 2.0, 3.5];
        let y = [-1.0, -1.0, -1.0, 1.0, 1.0, 1.0];
        let s = Sigmoid::fit(&dec, &y);
        // Positive decision values map to the positive class.
        assert!(s.a() < 0.0, "A = {}", s.a());
        assert!(s.probability(3.0) > 0.5);
        assert!(s.probability(-3.0) < 0.5);
        assert!(s.probability(3.0) > s.probability(1.0));
    }

    #[test]
    fn sigmoid_probability_is_bounded() {
        let s = Sigmoid { a: -50.0, b: 0.0 };
        for f in [-1e6, -10.0, 0.0, 10.0, 1e6] {
            let p = s.probability(f);
            assert!((0.0..=1.0).contains(&p), "p({f}) = {p}");
        }
    }

    #[test]
    fn coupling_two_classes_recovers_pairwise_probability() {
        let r = vec![vec![0.0, 0.8], vec![0.2, 0.0]];
        let p = couple(&r, 2);
        assert!((p[0] - 0.8).abs() < 0.01, "p = {p:?}");
        assert!((p[0] + p[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn coupling_matches_exact_three_class_solution() {
        let r = vec![
            vec![0.0, 0.9, 0.85],
            vec![0.1, 0.0, 0.6],
            vec![0.15, 0.4, 0.0],
        ];
        let p = couple(&r, 3);
        let total: f64 = p.iter().sum();
        assert!((total - 1.0).abs() < 1e-9, "total = {total}");
        // Exact minimizer of the coupling objective for this matrix.
        let expected = [0.7813, 0.1026, 0.1160];
        for (got, want) in p.iter().zip(expected) {
            assert!((got - want).abs() < 5e-3, "p = {p:?}");
        }
    }
}
