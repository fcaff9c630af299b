//! Shape-validated kernel matrices
//!
//! A training (Gram) matrix is N x N, symmetric, with a non-negative
//! diagonal. A prediction matrix is M x N: one row per sequence to score,
//! one column per training sequence. Shapes are checked when a matrix is
//! built, not when it is consumed.

use crate::core::{GramMatrix, Result, SVMError};
use crate::features::SequenceStore;
use crate::kernel::Kernel;
use log::debug;
use ndarray::{Array2, ArrayView1, ArrayView2};

const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Dense matrix of kernel values
#[derive(Debug, Clone, PartialEq)]
pub struct KernelMatrix {
    values: Array2<f64>,
}

impl KernelMatrix {
    /// Gram matrix of all pairs in `store`
    ///
    /// Only the upper triangle is evaluated; the lower one is mirrored.
    pub fn compute<K: Kernel>(kernel: &K, store: &SequenceStore) -> Result<Self> {
        kernel.validate(store.seq_len())?;
        let n = store.len();
        debug!(
            "Computing {}x{} {} kernel matrix (L={})",
            n,
            n,
            kernel.name(),
            store.seq_len()
        );

        let upper = upper_triangle(kernel, store);
        let mut values = Array2::zeros((n, n));
        for (i, row) in upper.into_iter().enumerate() {
            for (offset, value) in row.into_iter().enumerate() {
                let j = i + offset;
                values[[i, j]] = value;
                values[[j, i]] = value;
            }
        }

        Ok(Self { values })
    }

    /// Cross matrix K(rows_i, cols_j), typically test x train
    pub fn cross<K: Kernel>(
        kernel: &K,
        rows: &SequenceStore,
        cols: &SequenceStore,
    ) -> Result<Self> {
        if rows.seq_len() != cols.seq_len() {
            return Err(SVMError::LengthMismatch {
                expected: cols.seq_len(),
                actual: rows.seq_len(),
            });
        }
        kernel.validate(rows.seq_len())?;
        debug!(
            "Computing {}x{} {} cross kernel matrix",
            rows.len(),
            cols.len(),
            kernel.name()
        );

        let mut values = Array2::zeros((rows.len(), cols.len()));
        for (i, x) in rows.iter().enumerate() {
            for (j, y) in cols.iter().enumerate() {
                values[[i, j]] = kernel.compute(x, y);
            }
        }

        Ok(Self { values })
    }

    /// Wrap an arbitrary matrix of kernel values (e.g. a prediction matrix)
    pub fn from_array(values: Array2<f64>) -> Result<Self> {
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(SVMError::InvalidKernelMatrix(format!(
                "entries must be finite, found {bad}"
            )));
        }
        Ok(Self { values })
    }

    /// Wrap a training matrix: square, symmetric, non-negative diagonal
    pub fn gram(values: Array2<f64>) -> Result<Self> {
        let matrix = Self::from_array(values)?;
        matrix.validate_gram()?;
        Ok(matrix)
    }

    /// Check the training-matrix invariants on an already wrapped matrix
    pub fn validate_gram(&self) -> Result<()> {
        if !self.is_square() {
            return Err(SVMError::InvalidKernelMatrix(format!(
                "training matrix must be square, got {}x{}",
                self.rows(),
                self.cols()
            )));
        }
        if !self.is_symmetric(SYMMETRY_TOLERANCE) {
            return Err(SVMError::InvalidKernelMatrix(
                "training matrix must be symmetric".to_string(),
            ));
        }
        if let Some(i) = (0..self.rows()).find(|&i| self.values[[i, i]] < 0.0) {
            return Err(SVMError::InvalidKernelMatrix(format!(
                "diagonal entry {i} is negative"
            )));
        }
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn cols(&self) -> usize {
        self.values.ncols()
    }

    pub fn is_square(&self) -> bool {
        self.rows() == self.cols()
    }

    /// Check |K(i, j) - K(j, i)| <= tolerance for all pairs
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        if !self.is_square() {
            return false;
        }
        let n = self.rows();
        (0..n).all(|i| {
            ((i + 1)..n).all(|j| (self.values[[i, j]] - self.values[[j, i]]).abs() <= tolerance)
        })
    }

    /// Entry (i, j)
    ///
    /// # Panics
    /// Panics if the index is out of bounds
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[[i, j]]
    }

    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.values.row(i)
    }

    pub fn as_array(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn into_array(self) -> Array2<f64> {
        self.values
    }
}

impl GramMatrix for &KernelMatrix {
    fn size(&self) -> usize {
        self.rows()
    }

    fn get(&mut self, i: usize, j: usize) -> f64 {
        self.values[[i, j]]
    }
}

/// Row i holds K(i, j) for j = i..n
#[cfg(not(feature = "parallel"))]
fn upper_triangle<K: Kernel>(kernel: &K, store: &SequenceStore) -> Vec<Vec<f64>> {
    let n = store.len();
    (0..n)
        .map(|i| {
            let x = store.get(i);
            (i..n).map(|j| kernel.compute(x, store.get(j))).collect()
        })
        .collect()
}

#[cfg(feature = "parallel")]
fn upper_triangle<K: Kernel>(kernel: &K, store: &SequenceStore) -> Vec<Vec<f64>> {
    use rayon::prelude::*;

    let n = store.len();
    (0..n)
        .into_par_iter()
        .map(|i| {
            let x = store.get(i);
            (i..n).map(|j| kernel.compute(x, store.get(j))).collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Alphabet;
    use crate::kernel::WeightedDegreeKernel;
    use ndarray::array;

    fn store(sequences: &[&str]) -> SequenceStore {
        SequenceStore::new(sequences, Alphabet::Dna).unwrap()
    }

    #[test]
    fn test_gram_matrix_is_symmetric() {
        let kernel = WeightedDegreeKernel::new(2).unwrap();
        let data = store(&["ACGT", "ACGA", "TTTT", "ACCT"]);
        let matrix = KernelMatrix::compute(&kernel, &data).unwrap();

        assert_eq!(matrix.rows(), 4);
        assert!(matrix.is_square());
        assert!(matrix.is_symmetric(0.0));
        assert_eq!(matrix.get(0, 1), 5.0);
        for i in 0..4 {
            assert!(matrix.get(i, i) >= 0.0);
            assert_eq!(matrix.get(i, i), kernel.self_similarity(4));
        }
    }

    #[test]
    fn test_cross_matrix_shape() {
        let kernel = WeightedDegreeKernel::new(2).unwrap();
        let train = store(&["ACGT", "ACGA", "TTTT"]);
        let test = store(&["ACGT", "GGGG"]);
        let matrix = KernelMatrix::cross(&kernel, &test, &train).unwrap();

        assert_eq!((matrix.rows(), matrix.cols()), (2, 3));
        assert_eq!(matrix.get(0, 1), 5.0);
        assert_eq!(matrix.get(0, 0), kernel.self_similarity(4));
    }

    #[test]
    fn test_cross_matrix_length_mismatch() {
        let kernel = WeightedDegreeKernel::new(2).unwrap();
        let train = store(&["ACGT"]);
        let test = store(&["ACGTA"]);
        assert!(matches!(
            KernelMatrix::cross(&kernel, &test, &train),
            Err(SVMError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_degree_checked_before_computing() {
        let kernel = WeightedDegreeKernel::new(5).unwrap();
        let data = store(&["ACGT", "ACGA"]);
        assert!(matches!(
            KernelMatrix::compute(&kernel, &data),
            Err(SVMError::DegreeExceedsLength { .. })
        ));
    }

    #[test]
    fn test_gram_validation() {
        assert!(KernelMatrix::gram(array![[1.0, 0.5], [0.5, 1.0]]).is_ok());

        assert!(matches!(
            KernelMatrix::gram(array![[1.0, 0.5, 0.0], [0.5, 1.0, 0.0]]),
            Err(SVMError::InvalidKernelMatrix(_))
        ));
        assert!(matches!(
            KernelMatrix::gram(array![[1.0, 0.5], [0.4, 1.0]]),
            Err(SVMError::InvalidKernelMatrix(_))
        ));
        assert!(matches!(
            KernelMatrix::gram(array![[-1.0, 0.0], [0.0, 1.0]]),
            Err(SVMError::InvalidKernelMatrix(_))
        ));
        let wrapped = KernelMatrix::from_array(array![[-1.0, 0.0], [0.0, 1.0]]).unwrap();
        assert!(matches!(
            wrapped.validate_gram(),
            Err(SVMError::InvalidKernelMatrix(_))
        ));
        assert!(matches!(
            KernelMatrix::from_array(array![[f64::NAN]]),
            Err(SVMError::InvalidKernelMatrix(_))
        ));
    }

    #[test]
    fn test_gram_access() {
        let matrix = KernelMatrix::gram(array![[2.0, 1.0], [1.0, 3.0]]).unwrap();
        let mut gram = &matrix;
        assert_eq!(gram.size(), 2);
        assert_eq!(GramMatrix::get(&mut gram, 0, 1), 1.0);
        assert_eq!(gram.diagonal(1), 3.0);
    }
}
