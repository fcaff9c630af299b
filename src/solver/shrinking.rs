//! Shrinking heuristic implementation
//!
//! Implements the shrinking strategy from Section 4 of the SVMlight paper
//! "Making Large-Scale SVM Learning Practical" by Thorsten Joachims.
//!
//! Variables that sit at a bound (0 or C) and cannot take part in any
//! violating pair for h consecutive checks are removed from working set
//! selection. The solver keeps their error values current and reactivates
//! them before accepting convergence, so shrinking never changes the result.

use std::collections::VecDeque;

/// Shrinking strategy for SVM optimization
///
/// Tracks, per variable, whether it was stuck at its lower or upper bound
/// over the last h checks.
#[derive(Debug)]
pub struct ShrinkingStrategy {
    /// History of lower bound indicators for each variable
    lower_bound_history: Vec<VecDeque<bool>>,
    /// History of upper bound indicators for each variable
    upper_bound_history: Vec<VecDeque<bool>>,
    /// Maximum history size (h in the paper)
    history_size: usize,
    /// Current iteration count
    current_iteration: usize,
}

impl ShrinkingStrategy {
    /// Create a new shrinking strategy
    ///
    /// # Arguments
    /// * `n_samples` - Number of training samples
    /// * `history_size` - Number of iterations to track history (h in paper)
    pub fn new(n_samples: usize, history_size: usize) -> Self {
        let history_size = history_size.max(1);
        Self {
            lower_bound_history: vec![VecDeque::with_capacity(history_size); n_samples],
            upper_bound_history: vec![VecDeque::with_capacity(history_size); n_samples],
            history_size,
            current_iteration: 0,
        }
    }

    /// Record which variables are currently stuck at a bound
    ///
    /// With E_t = f(x_t) - y_t, the solver's violating-pair bounds are
    /// `m = max_{t in I_up} -E_t` and `big_m = min_{t in I_low} -E_t`.
    /// A bound variable that belongs to only one of the two sets cannot be
    /// part of a violating pair while
    /// - it is only in I_up and -E_t < big_m, or
    /// - it is only in I_low and -E_t > m.
    pub fn update(
        &mut self,
        alpha: &[f64],
        error_cache: &[f64],
        labels: &[f64],
        c: f64,
        m: f64,
        big_m: f64,
    ) {
        for i in 0..alpha.len() {
            let y = labels[i];
            let score = -error_cache[i];

            let at_lower = alpha[i] <= 0.0;
            let at_upper = alpha[i] >= c;

            // alpha = 0 with y = +1, or alpha = C with y = -1: only in I_up
            let only_up = (at_lower && y > 0.0) || (at_upper && y < 0.0);
            let stuck = if only_up {
                score < big_m
            } else if at_lower || at_upper {
                score > m
            } else {
                false
            };

            Self::update_history(
                &mut self.lower_bound_history[i],
                at_lower && stuck,
                self.history_size,
            );
            Self::update_history(
                &mut self.upper_bound_history[i],
                at_upper && stuck,
                self.history_size,
            );
        }

        self.current_iteration += 1;
    }

    fn update_history(history: &mut VecDeque<bool>, value: bool, max_size: usize) {
        if history.len() >= max_size {
            history.pop_front();
        }
        history.push_back(value);
    }

    /// Whether h checks have been recorded since creation or the last reset
    pub fn has_sufficient_history(&self) -> bool {
        self.current_iteration >= self.history_size
    }

    /// Variables stuck for the whole history window: (at lower bound, at upper bound)
    pub fn get_shrinkable_variables(&self) -> (Vec<usize>, Vec<usize>) {
        let stuck = |histories: &[VecDeque<bool>]| -> Vec<usize> {
            histories
                .iter()
                .enumerate()
                .filter(|(_, h)| h.len() == self.history_size && h.iter().all(|&b| b))
                .map(|(i, _)| i)
                .collect()
        };
        (
            stuck(&self.lower_bound_history),
            stuck(&self.upper_bound_history),
        )
    }

    /// Forget all history (used when shrunk variables are reactivated)
    pub fn reset(&mut self) {
        for history in self
            .lower_bound_history
            .iter_mut()
            .chain(self.upper_bound_history.iter_mut())
        {
            history.clear();
        }
        self.current_iteration = 0;
    }

    pub fn current_iteration(&self) -> usize {
        self.current_iteration
    }
}
