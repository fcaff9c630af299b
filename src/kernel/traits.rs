//! Kernel trait definition

use crate::core::Result;

/// String kernel trait
///
/// A kernel function K(x, y) must satisfy Mercer's condition to be valid for SVM.
/// Inputs are validated sequences of equal length (see `SequenceStore`), so
/// `compute` itself does not re-check them.
pub trait Kernel: Send + Sync {
    /// Compute kernel value K(x, y)
    fn compute(&self, x: &[u8], y: &[u8]) -> f64;

    /// Check that the kernel can be evaluated on sequences of `seq_len` symbols
    fn validate(&self, seq_len: usize) -> Result<()> {
        let _ = seq_len;
        Ok(())
    }

    /// Identifier stored in model files
    fn name(&self) -> &'static str;
}
