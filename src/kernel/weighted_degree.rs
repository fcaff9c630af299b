//! Weighted-degree string kernel
//!
//! K(x, y) = Σ_{d=1..D} w_d Σ_{p=0..L-d} 1[x[p..p+d] == y[p..p+d]]
//!
//! Matches are position-aligned: a k-mer only counts when it occurs at the
//! same offset in both sequences. A run of `r` matching symbols starting at
//! position p contributes w_1 + ... + w_min(r, D), so the kernel can be
//! evaluated in a single backward pass with a prefix sum over the weights.

use crate::core::{Result, SVMError};
use crate::kernel::Kernel;
use serde::{Deserialize, Serialize};

/// Post-processing applied to raw kernel values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Normalization {
    /// Raw weighted match counts
    None,
    /// K(x, y) / sqrt(K(x, x) * K(y, y)), so self-similarity is 1
    SqrtDiagonal,
}

impl Default for Normalization {
    fn default() -> Self {
        Self::None
    }
}

/// Degree of `WeightedDegreeKernel::default()`
pub const DEFAULT_DEGREE: usize = 3;

/// Weighted-degree kernel over aligned sequences
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedDegreeKernel {
    weights: Vec<f64>,
    /// cumulative[k] = w_1 + ... + w_k, cumulative[0] = 0
    cumulative: Vec<f64>,
    normalization: Normalization,
}

impl WeightedDegreeKernel {
    /// Kernel of the given degree with uniform weights (all 1.0)
    pub fn new(degree: usize) -> Result<Self> {
        Self::with_weights(vec![1.0; degree])
    }

    /// Kernel with explicit per-degree weights; the degree is `weights.len()`
    pub fn with_weights(weights: Vec<f64>) -> Result<Self> {
        if weights.is_empty() {
            return Err(SVMError::InvalidParameter(
                "Kernel degree must be at least 1".to_string(),
            ));
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite()) {
            return Err(SVMError::InvalidParameter(format!(
                "Kernel weights must be finite, got: {bad}"
            )));
        }

        let mut cumulative = Vec::with_capacity(weights.len() + 1);
        cumulative.push(0.0);
        let mut sum = 0.0;
        for &w in &weights {
            sum += w;
            cumulative.push(sum);
        }

        Ok(Self {
            weights,
            cumulative,
            normalization: Normalization::None,
        })
    }

    /// Kernel with the conventional decreasing weighting
    /// w_k = 2 (D - k + 1) / (D (D + 1)), which sums to 1
    pub fn standard(degree: usize) -> Result<Self> {
        Self::with_weights(standard_weights(degree))
    }

    /// Switch to sqrt-diagonal normalization
    pub fn normalized(mut self) -> Self {
        self.normalization = Normalization::SqrtDiagonal;
        self
    }

    /// Set the normalization explicitly
    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Maximum k-mer length D
    pub fn degree(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    /// Checked similarity between two sequences
    ///
    /// Fails with `LengthMismatch` if the sequences differ in length and with
    /// `DegreeExceedsLength` if the degree is larger than the sequence length.
    pub fn similarity(&self, x: &[u8], y: &[u8]) -> Result<f64> {
        if x.len() != y.len() {
            return Err(SVMError::LengthMismatch {
                expected: x.len(),
                actual: y.len(),
            });
        }
        self.validate(x.len())?;
        Ok(self.compute(x, y))
    }

    /// Self-similarity of any sequence of length `seq_len` (every k-mer matches)
    ///
    /// With non-negative weights this bounds `similarity` from above for
    /// sequences of that length; negative weights void the bound.
    pub fn self_similarity(&self, seq_len: usize) -> f64 {
        let degree = self.degree();
        (0..seq_len)
            .map(|p| self.cumulative[(seq_len - p).min(degree)])
            .sum()
    }

    fn raw(&self, x: &[u8], y: &[u8]) -> f64 {
        let degree = self.degree();
        let mut run = 0usize;
        let mut total = 0.0;

        for (a, b) in x.iter().zip(y.iter()).rev() {
            if a == b {
                run += 1;
            } else {
                run = 0;
            }
            total += self.cumulative[run.min(degree)];
        }

        total
    }
}

impl Default for WeightedDegreeKernel {
    /// Uniform weights of degree `DEFAULT_DEGREE`
    fn default() -> Self {
        Self {
            weights: vec![1.0; DEFAULT_DEGREE],
            cumulative: (0..=DEFAULT_DEGREE).map(|k| k as f64).collect(),
            normalization: Normalization::None,
        }
    }
}

impl Kernel for WeightedDegreeKernel {
    fn compute(&self, x: &[u8], y: &[u8]) -> f64 {
        debug_assert_eq!(x.len(), y.len(), "sequences must be aligned");
        let raw = self.raw(x, y);
        match self.normalization {
            Normalization::None => raw,
            Normalization::SqrtDiagonal => {
                // Both diagonals equal the full-match score for this length
                let diagonal = self.self_similarity(x.len());
                if diagonal > 0.0 {
                    raw / diagonal
                } else {
                    0.0
                }
            }
        }
    }

    fn validate(&self, seq_len: usize) -> Result<()> {
        if self.degree() > seq_len {
            return Err(SVMError::DegreeExceedsLength {
                degree: self.degree(),
                length: seq_len,
            });
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "weighted_degree"
    }
}

/// Decreasing weights w_k = 2 (D - k + 1) / (D (D + 1)) for k = 1..D
pub fn standard_weights(degree: usize) -> Vec<f64> {
    let d = degree as f64;
    (1..=degree)
        .map(|k| 2.0 * (d - k as f64 + 1.0) / (d * (d + 1.0)))
        .collect()
}

/// Weighted-degree similarity of two sequences
///
/// `weights` must have `max_degree` entries; `None` means uniform weights.
pub fn similarity(a: &[u8], b: &[u8], max_degree: usize, weights: Option<&[f64]>) -> Result<f64> {
    let kernel = match weights {
        Some(weights) => {
            if weights.len() != max_degree {
                return Err(SVMError::InvalidParameter(format!(
                    "Expected {} weights for degree {}, got {}",
                    max_degree,
                    max_degree,
                    weights.len()
                )));
            }
            WeightedDegreeKernel::with_weights(weights.to_vec())?
        }
        None => WeightedDegreeKernel::new(max_degree)?,
    };
    kernel.similarity(a, b)
}
