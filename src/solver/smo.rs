//! Sequential Minimal Optimization (SMO) solver implementation
//!
//! Solves the soft-margin SVM dual
//!
//!   min  1/2 α'Qα - e'α   s.t.  y'α = 0,  0 <= α_i <= C,   Q_ij = y_i y_j K_ij
//!
//! by repeatedly optimizing pairs of Lagrange multipliers. The solver keeps
//! an error cache E_i = Σ_j α_j y_j K_ij - y_i (the decision value without
//! bias, minus the label); y_i E_i is the gradient of the dual objective, so
//! KKT violations are read straight from the cache.

use crate::core::{
    GramMatrix, Label, OptimizationResult, OptimizerConfig, Result, SVMError, WorkingSetStrategy,
};
use crate::solver::shrinking::ShrinkingStrategy;
use log::{debug, warn};

/// Curvature used when K_ii + K_jj - 2 K_ij is not positive
const TAU: f64 = 1e-12;

/// Pair chosen for the next step, with the current maximal violation
#[derive(Debug, Clone, Copy)]
struct WorkingSet {
    i: usize,
    j: usize,
    /// m(α) - M(α); the problem is solved when this drops below epsilon
    gap: f64,
    m: f64,
    big_m: f64,
}

/// SMO solver for SVM optimization
pub struct SMOSolver {
    config: OptimizerConfig,
}

impl SMOSolver {
    /// Create a new SMO solver with the given configuration
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Solve the SVM dual for the training set behind `gram`
    ///
    /// `labels[i]` belongs to row/column i of the Gram matrix.
    pub fn solve<G: GramMatrix>(
        &self,
        gram: &mut G,
        labels: &[Label],
    ) -> Result<OptimizationResult> {
        self.config.validate()?;

        let n = labels.len();
        if n == 0 {
            return Err(SVMError::EmptyDataset);
        }
        if gram.size() != n {
            return Err(SVMError::DimensionMismatch {
                expected: n,
                actual: gram.size(),
            });
        }

        let y: Vec<f64> = labels.iter().map(|l| l.as_f64()).collect();

        // One class only: y'α = 0 forces α = 0, the decision is the label itself
        if y.iter().all(|&v| v == y[0]) {
            debug!("Single-class training set, returning constant decision function");
            return Ok(OptimizationResult {
                alpha: vec![0.0; n],
                b: y[0],
                support_vectors: Vec::new(),
                iterations: 0,
                objective_value: 0.0,
                converged: true,
            });
        }

        let c = self.config.c;
        let mut alpha = vec![0.0; n];
        // All alphas start at zero, so f(x_i) = 0 and E_i = -y_i
        let mut error_cache: Vec<f64> = y.iter().map(|&v| -v).collect();
        let diagonal: Vec<f64> = (0..n).map(|i| gram.diagonal(i)).collect();

        let mut shrinking_strategy = if self.config.shrinking {
            Some(ShrinkingStrategy::new(n, self.config.shrinking_iterations))
        } else {
            None
        };
        let mut active = vec![true; n];
        let mut n_active = n;

        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.config.max_iterations {
            let mut selection =
                self.select_working_set(gram, &alpha, &y, &error_cache, &diagonal, &active);

            let optimal = selection.map_or(true, |ws| ws.gap < self.config.epsilon);
            if optimal && n_active < n {
                // Converged on the shrunk problem: check again with every variable
                debug!(
                    "Reactivating {} shrunk variables at iteration {}",
                    n - n_active,
                    iterations
                );
                active.iter_mut().for_each(|a| *a = true);
                n_active = n;
                if let Some(strategy) = shrinking_strategy.as_mut() {
                    strategy.reset();
                }
                selection =
                    self.select_working_set(gram, &alpha, &y, &error_cache, &diagonal, &active);
            }

            let ws = match selection {
                Some(ws) if ws.gap >= self.config.epsilon => ws,
                _ => {
                    converged = true;
                    break;
                }
            };

            if !self.take_step(ws.i, ws.j, gram, &y, &diagonal, &mut alpha, &mut error_cache) {
                // No representable progress left on the maximal violating pair
                debug!(
                    "Stalled on pair ({}, {}) with gap {:.3e}",
                    ws.i, ws.j, ws.gap
                );
                break;
            }
            iterations += 1;

            if let Some(strategy) = shrinking_strategy.as_mut() {
                strategy.update(&alpha, &error_cache, &y, c, ws.m, ws.big_m);

                if iterations % self.config.shrinking_iterations.max(1) == 0
                    && strategy.has_sufficient_history()
                {
                    let (shrink_to_lower, shrink_to_upper) = strategy.get_shrinkable_variables();
                    let mut shrunk_count = 0;
                    for &i in shrink_to_lower.iter().chain(shrink_to_upper.iter()) {
                        if active[i] {
                            active[i] = false;
                            shrunk_count += 1;
                        }
                    }
                    if shrunk_count > 0 {
                        n_active -= shrunk_count;
                        debug!(
                            "Shrunk {} variables at iteration {} ({} active)",
                            shrunk_count, iterations, n_active
                        );
                    }
                }
            }

            if iterations % 1000 == 0 {
                debug!("SMO iteration {}: max violation {:.6}", iterations, ws.gap);
            }
        }

        if !converged {
            warn!(
                "SMO stopped after {} iterations without reaching tolerance {}",
                iterations, self.config.epsilon
            );
        }

        let bias = self.calculate_bias(&alpha, &error_cache, &y);

        let support_vectors: Vec<usize> = alpha
            .iter()
            .enumerate()
            .filter_map(|(i, &a)| if a > 0.0 { Some(i) } else { None })
            .collect();

        let objective_value = self.calculate_objective(&alpha, &error_cache, &y);

        debug!(
            "SMO finished: {} iterations, {} support vectors, bias {:.6}, objective {:.6}",
            iterations,
            support_vectors.len(),
            bias,
            objective_value
        );

        Ok(OptimizationResult {
            alpha,
            b: bias,
            support_vectors,
            iterations,
            objective_value,
            converged,
        })
    }

    /// Pick the next pair among active variables
    ///
    /// i maximizes -E_t over I_up; j is either the minimizer of -E_t over
    /// I_low (steepest descent) or the I_low variable with the largest
    /// second-order decrease of the objective when paired with i.
    fn select_working_set<G: GramMatrix>(
        &self,
        gram: &mut G,
        alpha: &[f64],
        y: &[f64],
        error_cache: &[f64],
        diagonal: &[f64],
        active: &[bool],
    ) -> Option<WorkingSet> {
        let c = self.config.c;

        let mut m = f64::NEG_INFINITY;
        let mut i_best = None;
        let mut big_m = f64::INFINITY;
        let mut j_first = None;

        for t in (0..alpha.len()).filter(|&t| active[t]) {
            let score = -error_cache[t];
            if in_up(alpha[t], y[t], c) && score > m {
                m = score;
                i_best = Some(t);
            }
            if in_low(alpha[t], y[t], c) && score < big_m {
                big_m = score;
                j_first = Some(t);
            }
        }

        let i = i_best?;
        let j_first = j_first?;
        let gap = m - big_m;

        let j = match self.config.working_set_strategy {
            WorkingSetStrategy::SteepestDescent => j_first,
            WorkingSetStrategy::SecondOrder => {
                let mut best = j_first;
                let mut best_gain = f64::INFINITY;
                for t in (0..alpha.len()).filter(|&t| active[t]) {
                    let score = -error_cache[t];
                    if !in_low(alpha[t], y[t], c) || score >= m {
                        continue;
                    }
                    let b = m - score;
                    let mut a = diagonal[i] + diagonal[t] - 2.0 * gram.get(i, t);
                    if a <= 0.0 {
                        a = TAU;
                    }
                    let gain = -(b * b) / a;
                    if gain < best_gain {
                        best_gain = gain;
                        best = t;
                    }
                }
                best
            }
        };

        Some(WorkingSet {
            i,
            j,
            gap,
            m,
            big_m,
        })
    }

    /// Perform the actual optimization step for variables i and j
    ///
    /// Returns false if the pair cannot move.
    #[allow(clippy::too_many_arguments)]
    fn take_step<G: GramMatrix>(
        &self,
        i: usize,
        j: usize,
        gram: &mut G,
        y: &[f64],
        diagonal: &[f64],
        alpha: &mut [f64],
        error_cache: &mut [f64],
    ) -> bool {
        if i == j {
            return false;
        }

        let c = self.config.c;
        let y_i = y[i];
        let y_j = y[j];
        let alpha_i_old = alpha[i];
        let alpha_j_old = alpha[j];
        let e_i = error_cache[i];
        let e_j = error_cache[j];
        let s = y_i * y_j;

        // Feasible segment for alpha_j on the line y_i α_i + y_j α_j = const
        let (low, high) = if y_i != y_j {
            let diff = alpha_j_old - alpha_i_old;
            (0.0_f64.max(diff), c.min(c + diff))
        } else {
            let sum = alpha_i_old + alpha_j_old;
            (0.0_f64.max(sum - c), c.min(sum))
        };

        if low >= high {
            return false;
        }

        let k_ij = gram.get(i, j);
        let mut eta = diagonal[i] + diagonal[j] - 2.0 * k_ij;
        if eta <= 0.0 {
            eta = TAU;
        }

        let alpha_j_new = (alpha_j_old + y_j * (e_i - e_j) / eta).clamp(low, high);
        let delta_j = alpha_j_new - alpha_j_old;
        if delta_j == 0.0 {
            return false;
        }

        let alpha_i_new = (alpha_i_old - s * delta_j).clamp(0.0, c);

        alpha[i] = alpha_i_new;
        alpha[j] = alpha_j_new;

        let delta_i = alpha_i_new - alpha_i_old;

        for (k, error) in error_cache.iter_mut().enumerate() {
            let k_ik = gram.get(i, k);
            let k_jk = gram.get(j, k);
            *error += y_i * delta_i * k_ik + y_j * delta_j * k_jk;
        }

        true
    }

    /// Calculate the bias term
    ///
    /// Free support vectors satisfy y_i (f(x_i) + b) = 1 exactly, i.e.
    /// b = -E_i; their mean is used. Without free vectors, b is the midpoint
    /// of the interval allowed by the bound variables.
    fn calculate_bias(&self, alpha: &[f64], error_cache: &[f64], y: &[f64]) -> f64 {
        let c = self.config.c;
        let mut sum = 0.0;
        let mut count = 0;

        for i in 0..alpha.len() {
            if alpha[i] > 0.0 && alpha[i] < c {
                sum += -error_cache[i];
                count += 1;
            }
        }

        if count > 0 {
            return sum / count as f64;
        }

        let mut lower = f64::NEG_INFINITY;
        let mut upper = f64::INFINITY;
        for i in 0..alpha.len() {
            let score = -error_cache[i];
            if in_up(alpha[i], y[i], c) {
                lower = lower.max(score);
            }
            if in_low(alpha[i], y[i], c) {
                upper = upper.min(score);
            }
        }

        match (lower.is_finite(), upper.is_finite()) {
            (true, true) => (lower + upper) / 2.0,
            (true, false) => lower,
            (false, true) => upper,
            (false, false) => 0.0,
        }
    }

    /// Dual objective Σα_i - 1/2 Σ_i Σ_j α_i α_j y_i y_j K_ij
    ///
    /// The double sum equals Σ_i α_i y_i f(x_i) with f(x_i) = E_i + y_i, so no
    /// kernel evaluations are needed.
    fn calculate_objective(&self, alpha: &[f64], error_cache: &[f64], y: &[f64]) -> f64 {
        let linear: f64 = alpha.iter().sum();
        let quadratic: f64 = alpha
            .iter()
            .zip(error_cache.iter().zip(y.iter()))
            .map(|(&a, (&e, &label))| a * label * (e + label))
            .sum();
        linear - 0.5 * quadratic
    }
}

/// α_t can move in the direction that increases y_t α_t
fn in_up(alpha: f64, y: f64, c: f64) -> bool {
    (y > 0.0 && alpha < c) || (y < 0.0 && alpha > 0.0)
}

/// α_t can move in the direction that decreases y_t α_t
fn in_low(alpha: f64, y: f64, c: f64) -> bool {
    (y > 0.0 && alpha > 0.0) || (y < 0.0 && alpha < c)
}
