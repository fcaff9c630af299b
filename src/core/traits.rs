//! Core traits for SVM implementation

use crate::core::{Label, Prediction, Result};
use crate::features::SequenceStore;

/// Dataset abstraction: aligned sequences with one label each
pub trait Dataset {
    /// Number of samples in the dataset
    fn len(&self) -> usize;

    /// Common length of every sequence
    fn sequence_length(&self) -> usize;

    /// The validated sequence table
    fn sequences(&self) -> &SequenceStore;

    /// Labels, parallel to `sequences()`
    fn labels(&self) -> &[Label];

    /// Check if the dataset is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read access to the kernel (Gram) matrix of a training set
///
/// The solver only ever asks for individual entries, so implementations are
/// free to precompute everything or evaluate lazily behind a cache.
pub trait GramMatrix {
    /// Number of training samples (the matrix is size x size)
    fn size(&self) -> usize;

    /// Kernel value K(i, j)
    fn get(&mut self, i: usize, j: usize) -> f64;

    /// Kernel value K(i, i)
    fn diagonal(&mut self, i: usize) -> f64 {
        self.get(i, i)
    }
}

/// Trained SVM model scoring raw sequences
pub trait SVMModel {
    /// Predict a single sequence; fails on a sequence of the wrong length
    fn predict(&self, sequence: &[u8]) -> Result<Prediction>;

    /// Predict every sequence of a store
    fn predict_batch(&self, sequences: &SequenceStore) -> Result<Vec<Prediction>> {
        sequences.iter().map(|s| self.predict(s)).collect()
    }

    /// Get the number of support vectors
    fn n_support_vectors(&self) -> usize;

    /// Get the bias term
    fn bias(&self) -> f64;
}
