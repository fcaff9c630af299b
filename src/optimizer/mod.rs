//! Optimization algorithms for SVM
//!
//! This module provides high-level optimization interfaces that integrate
//! kernels and solvers to provide complete SVM training functionality.
//!
//! Two kinds of models come out of training:
//! - [`TrainedSVM`] keeps the kernel and its support sequences and scores raw
//!   sequences directly.
//! - [`PrecomputedSVM`] is trained on a user-supplied Gram matrix and scores
//!   rows of a test x train kernel matrix.

use crate::cache::CachedGram;
use crate::core::{
    Dataset, Label, OptimizationResult, OptimizerConfig, Prediction, Result, SVMError, SVMModel,
};
use crate::features::SequenceStore;
use crate::kernel::{Kernel, KernelMatrix};
use crate::solver::SMOSolver;
use log::info;
use std::sync::Arc;

/// High-level SVM optimizer that integrates kernel functions and solving algorithms
pub struct SVMOptimizer<K: Kernel> {
    kernel: Arc<K>,
    config: OptimizerConfig,
}

impl<K: Kernel> SVMOptimizer<K> {
    /// Create a new SVM optimizer with the given kernel and configuration
    pub fn new(kernel: K, config: OptimizerConfig) -> Self {
        Self {
            kernel: Arc::new(kernel),
            config,
        }
    }

    /// Create a new SVM optimizer with default configuration
    pub fn with_kernel(kernel: K) -> Self {
        Self::new(kernel, OptimizerConfig::default())
    }

    /// Train an SVM model on the given dataset
    pub fn train<D: Dataset>(&self, dataset: &D) -> Result<TrainedSVM<K>> {
        self.train_sequences(dataset.sequences(), dataset.labels())
    }

    /// Train on a sequence store with parallel labels
    ///
    /// Kernel values are computed on demand and kept in an LRU cache bounded
    /// by `config.cache_size` bytes.
    pub fn train_sequences(
        &self,
        sequences: &SequenceStore,
        labels: &[Label],
    ) -> Result<TrainedSVM<K>> {
        if labels.len() != sequences.len() {
            return Err(SVMError::DimensionMismatch {
                expected: sequences.len(),
                actual: labels.len(),
            });
        }

        info!(
            "Training {} SVM on {} sequences of length {} (C={})",
            self.kernel.name(),
            sequences.len(),
            sequences.seq_len(),
            self.config.c
        );

        let mut gram = CachedGram::new(self.kernel.as_ref(), sequences, self.config.cache_size)?;
        let solver = SMOSolver::new(self.config.clone());
        let result = solver.solve(&mut gram, labels)?;

        info!(
            "Training finished after {} iterations: {} support vectors, cache hit rate {:.1}%",
            result.iterations,
            result.support_vectors.len(),
            gram.hit_rate() * 100.0
        );

        Ok(TrainedSVM::new(
            Arc::clone(&self.kernel),
            sequences,
            labels,
            result,
        ))
    }

    /// Train on a precomputed N x N kernel matrix
    ///
    /// Fails with `DimensionMismatch` if the matrix is not square or its row
    /// count differs from the number of labels.
    pub fn train_precomputed(
        &self,
        matrix: &KernelMatrix,
        labels: &[Label],
    ) -> Result<PrecomputedSVM> {
        train_precomputed(&self.config, matrix, labels)
    }

    /// Get the optimizer configuration
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Get the kernel
    pub fn kernel(&self) -> &K {
        &self.kernel
    }
}

/// Train on a precomputed kernel matrix with the given configuration
pub fn train_precomputed(
    config: &OptimizerConfig,
    matrix: &KernelMatrix,
    labels: &[Label],
) -> Result<PrecomputedSVM> {
    if !matrix.is_square() {
        return Err(SVMError::DimensionMismatch {
            expected: matrix.rows(),
            actual: matrix.cols(),
        });
    }
    if labels.len() != matrix.rows() {
        return Err(SVMError::DimensionMismatch {
            expected: matrix.rows(),
            actual: labels.len(),
        });
    }
    matrix.validate_gram()?;

    info!(
        "Training SVM on precomputed {}x{} kernel matrix (C={})",
        matrix.rows(),
        matrix.cols(),
        config.c
    );

    let solver = SMOSolver::new(config.clone());
    let result = solver.solve(&mut &*matrix, labels)?;
    Ok(PrecomputedSVM::new(labels, result))
}

/// A trained SVM model that can make predictions on raw sequences
#[derive(Debug, Clone)]
pub struct TrainedSVM<K: Kernel> {
    kernel: Arc<K>,
    support_vectors: SequenceStore,
    alpha: Vec<f64>,
    labels: Vec<Label>,
    bias: f64,
    support_indices: Vec<usize>,
    iterations: usize,
    objective_value: f64,
    converged: bool,
}

impl<K: Kernel> TrainedSVM<K> {
    /// Create a new trained SVM model
    pub(crate) fn new(
        kernel: Arc<K>,
        training_sequences: &SequenceStore,
        training_labels: &[Label],
        optimization_result: OptimizationResult,
    ) -> Self {
        let indices = &optimization_result.support_vectors;
        Self {
            kernel,
            support_vectors: training_sequences.subset(indices),
            alpha: indices
                .iter()
                .map(|&i| optimization_result.alpha[i])
                .collect(),
            labels: indices.iter().map(|&i| training_labels[i]).collect(),
            bias: optimization_result.b,
            support_indices: optimization_result.support_vectors,
            iterations: optimization_result.iterations,
            objective_value: optimization_result.objective_value,
            converged: optimization_result.converged,
        }
    }

    /// Rebuild a model from its parts (used when loading saved models)
    ///
    /// `alpha` and `labels` must be parallel to the rows of `support_vectors`.
    pub fn from_parts(
        kernel: K,
        support_vectors: SequenceStore,
        alpha: Vec<f64>,
        labels: Vec<Label>,
        bias: f64,
    ) -> Result<Self> {
        if alpha.len() != support_vectors.len() || labels.len() != support_vectors.len() {
            return Err(SVMError::DimensionMismatch {
                expected: support_vectors.len(),
                actual: alpha.len().min(labels.len()),
            });
        }
        if alpha.iter().any(|a| !a.is_finite() || *a < 0.0) {
            return Err(SVMError::InvalidParameter(
                "alpha values must be finite and non-negative".to_string(),
            ));
        }
        if !support_vectors.is_empty() {
            kernel.validate(support_vectors.seq_len())?;
        }
        let n = support_vectors.len();
        Ok(Self {
            kernel: Arc::new(kernel),
            support_vectors,
            alpha,
            labels,
            bias,
            support_indices: (0..n).collect(),
            iterations: 0,
            objective_value: 0.0,
            converged: true,
        })
    }

    /// Get the decision function value for a sequence
    ///
    /// Fails with `LengthMismatch` unless the sequence has the training length.
    pub fn decision_function(&self, sequence: &[u8]) -> Result<f64> {
        self.check_length(sequence.len())?;
        Ok(self.score(sequence))
    }

    /// Predict every sequence of a store, checking the sequence length once
    pub fn predict_checked(&self, sequences: &SequenceStore) -> Result<Vec<Prediction>> {
        self.check_length(sequences.seq_len())?;
        Ok(sequences
            .iter()
            .map(|sequence| Prediction::from_decision(self.score(sequence)))
            .collect())
    }

    /// A model without support vectors scores any length
    fn check_length(&self, length: usize) -> Result<()> {
        if !self.support_vectors.is_empty() && length != self.sequence_length() {
            return Err(SVMError::LengthMismatch {
                expected: self.sequence_length(),
                actual: length,
            });
        }
        Ok(())
    }

    fn score(&self, sequence: &[u8]) -> f64 {
        let mut result = 0.0;

        for (i, support_vector) in self.support_vectors.iter().enumerate() {
            let kernel_value = self.kernel.compute(sequence, support_vector);
            result += self.alpha[i] * self.labels[i].as_f64() * kernel_value;
        }

        result + self.bias
    }

    /// Get the support sequences
    pub fn support_vectors(&self) -> &SequenceStore {
        &self.support_vectors
    }

    /// Get the alpha values for support vectors
    pub fn alpha_values(&self) -> &[f64] {
        &self.alpha
    }

    /// Labels of the support vectors
    pub fn support_labels(&self) -> &[Label] {
        &self.labels
    }

    /// Get the indices of support vectors in the original training set
    pub fn support_vector_indices(&self) -> &[usize] {
        &self.support_indices
    }

    /// Length of the sequences the model was trained on
    pub fn sequence_length(&self) -> usize {
        self.support_vectors.seq_len()
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// SMO iterations used in training (0 for loaded models)
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn objective_value(&self) -> f64 {
        self.objective_value
    }

    pub fn converged(&self) -> bool {
        self.converged
    }
}

impl<K: Kernel> SVMModel for TrainedSVM<K> {
    fn predict(&self, sequence: &[u8]) -> Result<Prediction> {
        Ok(Prediction::from_decision(self.decision_function(sequence)?))
    }

    fn predict_batch(&self, sequences: &SequenceStore) -> Result<Vec<Prediction>> {
        self.predict_checked(sequences)
    }

    fn n_support_vectors(&self) -> usize {
        self.support_vectors.len()
    }

    fn bias(&self) -> f64 {
        self.bias
    }
}

/// SVM trained on a precomputed kernel matrix
///
/// Prediction takes an M x N matrix whose column j holds kernel values
/// against training sample j.
#[derive(Debug, Clone)]
pub struct PrecomputedSVM {
    support_indices: Vec<usize>,
    /// alpha_i * y_i for each support vector
    coefficients: Vec<f64>,
    bias: f64,
    n_train: usize,
    iterations: usize,
    objective_value: f64,
    converged: bool,
}

impl PrecomputedSVM {
    fn new(labels: &[Label], result: OptimizationResult) -> Self {
        let coefficients = result
            .support_vectors
            .iter()
            .map(|&i| result.alpha[i] * labels[i].as_f64())
            .collect();
        Self {
            support_indices: result.support_vectors,
            coefficients,
            bias: result.b,
            n_train: labels.len(),
            iterations: result.iterations,
            objective_value: result.objective_value,
            converged: result.converged,
        }
    }

    /// Decision values f(x) for every row of `matrix`
    pub fn decision_values(&self, matrix: &KernelMatrix) -> Result<Vec<f64>> {
        if matrix.cols() != self.n_train {
            return Err(SVMError::DimensionMismatch {
                expected: self.n_train,
                actual: matrix.cols(),
            });
        }

        Ok((0..matrix.rows())
            .map(|row| {
                self.support_indices
                    .iter()
                    .zip(&self.coefficients)
                    .map(|(&j, &coef)| coef * matrix.get(row, j))
                    .sum::<f64>()
                    + self.bias
            })
            .collect())
    }

    /// Predictions for every row of `matrix`
    pub fn predict(&self, matrix: &KernelMatrix) -> Result<Vec<Prediction>> {
        Ok(self
            .decision_values(matrix)?
            .into_iter()
            .map(Prediction::from_decision)
            .collect())
    }

    /// Predicted labels for every row of `matrix`
    pub fn predict_labels(&self, matrix: &KernelMatrix) -> Result<Vec<Label>> {
        Ok(self.predict(matrix)?.into_iter().map(|p| p.label).collect())
    }

    pub fn support_vector_indices(&self) -> &[usize] {
        &self.support_indices
    }

    pub fn n_support_vectors(&self) -> usize {
        self.support_indices.len()
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Number of training samples (columns expected at prediction time)
    pub fn n_train(&self) -> usize {
        self.n_train
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn objective_value(&self) -> f64 {
        self.objective_value
    }

    pub fn converged(&self) -> bool {
        self.converged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Alphabet;
    use crate::kernel::WeightedDegreeKernel;
    use ndarray::Array2;

    fn motif_data() -> (SequenceStore, Vec<Label>) {
        let sequences = [
            "ACGTACGTAA",
            "ACGTACGTCC",
            "ACGTACGGTA",
            "ACGTACTTGA",
            "TTTTGGCCAA",
            "TTTGGGCCAC",
            "TTTTGGCATA",
            "TTATGGCCGA",
        ];
        let labels = [1, 1, 1, 1, -1, -1, -1, -1]
            .iter()
            .map(|&v| Label::try_from(v).unwrap())
            .collect();
        (
            SequenceStore::new(&sequences, Alphabet::Dna).unwrap(),
            labels,
        )
    }

    #[test]
    fn test_svm_optimizer_creation() {
        let kernel = WeightedDegreeKernel::new(3).unwrap();
        let config = OptimizerConfig::default();
        let optimizer = SVMOptimizer::new(kernel, config.clone());

        assert_eq!(optimizer.config().c, config.c);
        assert_eq!(optimizer.config().epsilon, config.epsilon);
        assert_eq!(optimizer.kernel().degree(), 3);
    }

    #[test]
    fn test_svm_training_on_sequences() {
        let (store, labels) = motif_data();
        let optimizer = SVMOptimizer::with_kernel(WeightedDegreeKernel::new(3).unwrap());

        let model = optimizer
            .train_sequences(&store, &labels)
            .expect("Training should succeed");

        assert!(model.n_support_vectors() > 0);
        assert!(model.converged());
        assert_eq!(model.alpha_values().len(), model.n_support_vectors());
        assert_eq!(model.support_labels().len(), model.n_support_vectors());
        assert!(model.alpha_values().iter().all(|&a| a > 0.0));

        for (sequence, &label) in store.iter().zip(labels.iter()) {
            assert_eq!(model.predict(sequence).unwrap().label, label);
        }
    }

    #[test]
    fn test_sequence_training_matches_precomputed() {
        let (store, labels) = motif_data();
        let kernel = WeightedDegreeKernel::new(3).unwrap();
        let matrix = KernelMatrix::compute(&kernel, &store).unwrap();
        let optimizer = SVMOptimizer::with_kernel(kernel);

        let direct = optimizer.train_sequences(&store, &labels).unwrap();
        let precomputed = optimizer.train_precomputed(&matrix, &labels).unwrap();

        let values = precomputed.decision_values(&matrix).unwrap();
        for (i, sequence) in store.iter().enumerate() {
            assert!((direct.decision_function(sequence).unwrap() - values[i]).abs() < 1e-9);
        }
        assert_eq!(
            direct.support_vector_indices(),
            precomputed.support_vector_indices()
        );
    }

    #[test]
    fn test_label_count_mismatch() {
        let (store, labels) = motif_data();
        let optimizer = SVMOptimizer::with_kernel(WeightedDegreeKernel::new(3).unwrap());
        assert!(matches!(
            optimizer.train_sequences(&store, &labels[..5]),
            Err(SVMError::DimensionMismatch {
                expected: 8,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_precomputed_dimension_checks() {
        let config = OptimizerConfig::default();
        let labels = vec![Label::Positive, Label::Negative, Label::Positive];

        let square = KernelMatrix::from_array(Array2::eye(2)).unwrap();
        assert!(matches!(
            train_precomputed(&config, &square, &labels),
            Err(SVMError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));

        let rectangular = KernelMatrix::from_array(Array2::zeros((3, 2))).unwrap();
        assert!(matches!(
            train_precomputed(&config, &rectangular, &labels),
            Err(SVMError::DimensionMismatch { .. })
        ));

        let model = train_precomputed(&config, &KernelMatrix::from_array(Array2::eye(3)).unwrap(), &labels)
            .unwrap();
        let wrong_cols = KernelMatrix::from_array(Array2::zeros((4, 2))).unwrap();
        assert!(matches!(
            model.predict(&wrong_cols),
            Err(SVMError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_precomputed_rejects_negative_diagonal() {
        let labels = vec![Label::Positive, Label::Negative];
        let matrix = KernelMatrix::from_array(array_2x2(-1.0, 0.0, 0.0, 1.0)).unwrap();
        assert!(matches!(
            train_precomputed(&OptimizerConfig::default(), &matrix, &labels),
            Err(SVMError::InvalidKernelMatrix(_))
        ));

        let asymmetric = KernelMatrix::from_array(array_2x2(1.0, 0.5, 0.0, 1.0)).unwrap();
        assert!(matches!(
            train_precomputed(&OptimizerConfig::default(), &asymmetric, &labels),
            Err(SVMError::InvalidKernelMatrix(_))
        ));
    }

    fn array_2x2(a: f64, b: f64, c: f64, d: f64) -> Array2<f64> {
        Array2::from_shape_vec((2, 2), vec![a, b, c, d]).unwrap()
    }

    #[test]
    fn test_block_diagonal_precomputed() {
        let n = 100;
        let matrix = KernelMatrix::gram(Array2::from_shape_fn((n, n), |(i, j)| {
            if (i < 50) == (j < 50) {
                1.0
            } else {
                0.0
            }
        }))
        .unwrap();
        let labels: Vec<Label> = (0..n)
            .map(|i| if i < 50 { Label::Positive } else { Label::Negative })
            .collect();

        let model = train_precomputed(&OptimizerConfig::default(), &matrix, &labels).unwrap();
        let predicted = model.predict_labels(&matrix).unwrap();
        assert_eq!(predicted, labels);
        assert_eq!(model.n_train(), n);
    }

    #[test]
    fn test_single_class_model() {
        let store = SequenceStore::new(&["ACGT", "ACGA", "ACGG"], Alphabet::Dna).unwrap();
        let labels = vec![Label::Positive; 3];
        let optimizer = SVMOptimizer::with_kernel(WeightedDegreeKernel::new(2).unwrap());

        let model = optimizer.train_sequences(&store, &labels).unwrap();
        assert_eq!(model.n_support_vectors(), 0);
        assert_eq!(model.bias(), 1.0);
        assert_eq!(model.predict(b"TTTT").unwrap().label, Label::Positive);
        assert_eq!(model.predict(b"TT").unwrap().label, Label::Positive);
    }

    #[test]
    fn test_from_parts_and_length_check() {
        let svs = SequenceStore::new(&["ACGT", "TTTT"], Alphabet::Dna).unwrap();
        let model = TrainedSVM::from_parts(
            WeightedDegreeKernel::new(2).unwrap(),
            svs,
            vec![0.5, 0.5],
            vec![Label::Positive, Label::Negative],
            0.0,
        )
        .unwrap();

        assert_eq!(model.predict(b"ACGT").unwrap().label, Label::Positive);
        assert_eq!(model.predict(b"TTTT").unwrap().label, Label::Negative);

        for wrong in [&b"ACG"[..], &b"ACGTA"[..]] {
            assert!(matches!(
                model.predict(wrong),
                Err(SVMError::LengthMismatch {
                    expected: 4,
                    ..
                })
            ));
            assert!(model.decision_function(wrong).is_err());
        }

        let longer = SequenceStore::new(&["ACGTA"], Alphabet::Dna).unwrap();
        assert!(matches!(
            model.predict_checked(&longer),
            Err(SVMError::LengthMismatch {
                expected: 4,
                actual: 5
            })
        ));

        let bad = TrainedSVM::from_parts(
            WeightedDegreeKernel::new(2).unwrap(),
            SequenceStore::new(&["ACGT"], Alphabet::Dna).unwrap(),
            vec![0.5, 0.5],
            vec![Label::Positive],
            0.0,
        );
        assert!(bad.is_err());
    }
}
