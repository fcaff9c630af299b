//! Core type definitions for SVM

use crate::core::{Result, SVMError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary class label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Positive,
    Negative,
}

impl Label {
    /// Numeric value used by the solver (+1.0 or -1.0)
    pub fn as_f64(self) -> f64 {
        match self {
            Label::Positive => 1.0,
            Label::Negative => -1.0,
        }
    }

    /// Label from the sign of a decision value (zero counts as positive)
    pub fn from_decision(decision_value: f64) -> Self {
        if decision_value >= 0.0 {
            Label::Positive
        } else {
            Label::Negative
        }
    }

    pub fn is_positive(self) -> bool {
        matches!(self, Label::Positive)
    }
}

impl TryFrom<f64> for Label {
    type Error = SVMError;

    fn try_from(value: f64) -> Result<Self> {
        if value == 1.0 {
            Ok(Label::Positive)
        } else if value == -1.0 {
            Ok(Label::Negative)
        } else {
            Err(SVMError::InvalidLabel(value))
        }
    }
}

impl TryFrom<i32> for Label {
    type Error = SVMError;

    fn try_from(value: i32) -> Result<Self> {
        Label::try_from(value as f64)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Positive => write!(f, "+1"),
            Label::Negative => write!(f, "-1"),
        }
    }
}

/// Prediction result containing label and decision value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class label
    pub label: Label,
    /// Raw decision function value
    pub decision_value: f64,
}

impl Prediction {
    /// Create a prediction from a raw decision value
    pub fn from_decision(decision_value: f64) -> Self {
        Self {
            label: Label::from_decision(decision_value),
            decision_value,
        }
    }

    /// Get confidence as absolute value of decision value
    pub fn confidence(&self) -> f64 {
        self.decision_value.abs()
    }
}

/// Result of optimization process
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Lagrange multipliers (alpha values)
    pub alpha: Vec<f64>,
    /// Bias term (b)
    pub b: f64,
    /// Indices of support vectors (where alpha > 0)
    pub support_vectors: Vec<usize>,
    /// Number of iterations performed
    pub iterations: usize,
    /// Final objective value of the dual (maximization form)
    pub objective_value: f64,
    /// Whether the KKT conditions were met within tolerance
    pub converged: bool,
}

/// Working set selection strategy for SMO
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkingSetStrategy {
    /// Maximal violating pair (first-order, SVMlight style)
    SteepestDescent,
    /// Maximal violating i, j chosen by second-order objective gain
    SecondOrder,
}

impl Default for WorkingSetStrategy {
    fn default() -> Self {
        Self::SecondOrder
    }
}

/// Configuration for optimizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Regularization parameter (upper bound for alpha)
    pub c: f64,
    /// Tolerance for KKT conditions
    pub epsilon: f64,
    /// Maximum number of iterations
    pub max_iterations: usize,
    /// Kernel cache size in bytes
    pub cache_size: usize,
    /// Enable shrinking heuristic
    pub shrinking: bool,
    /// Number of consecutive checks before a variable is shrunk (h in the paper)
    pub shrinking_iterations: usize,
    /// Working set selection
    pub working_set_strategy: WorkingSetStrategy,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            epsilon: 0.001,
            max_iterations: 10000,
            cache_size: 100_000_000, // 100MB
            shrinking: true,
            shrinking_iterations: 100,
            working_set_strategy: WorkingSetStrategy::default(),
        }
    }
}

impl OptimizerConfig {
    /// Check parameter ranges before training
    pub fn validate(&self) -> Result<()> {
        if self.c <= 0.0 || !self.c.is_finite() {
            return Err(SVMError::InvalidParameter(format!(
                "C must be positive and finite, got: {}",
                self.c
            )));
        }
        if self.epsilon <= 0.0 || self.epsilon.is_nan() {
            return Err(SVMError::InvalidParameter(format!(
                "epsilon must be positive, got: {}",
                self.epsilon
            )));
        }
        if self.max_iterations == 0 {
            return Err(SVMError::InvalidParameter(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
