//! High-level API for Support Vector Machine operations
//!
//! This module provides a user-friendly interface for common SVM tasks,
//! including training, prediction, and model evaluation.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use wdsvm::api::SVM;
//! use wdsvm::kernel::WeightedDegreeKernel;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Train a model on labeled sequences
//! let svm = SVM::with_kernel(WeightedDegreeKernel::standard(5)?)
//!     .with_c(1.0)
//!     .with_epsilon(0.001)
//!     .train_from_file("train.txt")?;
//!
//! // Make predictions
//! let predictions = svm.predict_from_file("test.fasta")?;
//! println!("Accuracy: {:.2}%", svm.evaluate_from_file("test.txt")? * 100.0);
//! # Ok(())
//! # }
//! ```

use crate::core::{
    Dataset, Label, OptimizerConfig, Prediction, Result, SVMError, SVMModel, WorkingSetStrategy,
};
use crate::data::{load_sequences, LabeledSequences};
use crate::features::{Alphabet, SequenceStore};
use crate::kernel::{Kernel, KernelMatrix, WeightedDegreeKernel};
use crate::optimizer::{PrecomputedSVM, SVMOptimizer, TrainedSVM};
use std::path::Path;

/// High-level SVM interface with builder pattern
pub struct SVM<K: Kernel = WeightedDegreeKernel> {
    kernel: K,
    config: OptimizerConfig,
    alphabet: Alphabet,
}

impl SVM<WeightedDegreeKernel> {
    /// Create a new SVM with a degree-3 uniform WD kernel and default parameters
    pub fn new() -> Self {
        Self::with_kernel(WeightedDegreeKernel::default())
    }
}

impl Default for SVM<WeightedDegreeKernel> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Kernel> SVM<K> {
    /// Create SVM with custom kernel
    pub fn with_kernel(kernel: K) -> Self {
        Self {
            kernel,
            config: OptimizerConfig::default(),
            alphabet: Alphabet::default(),
        }
    }

    /// Set regularization parameter C
    pub fn with_c(mut self, c: f64) -> Self {
        self.config.c = c;
        self
    }

    /// Set convergence tolerance
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.config.epsilon = epsilon;
        self
    }

    /// Set maximum number of iterations
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set kernel cache size in bytes
    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.config.cache_size = cache_size;
        self
    }

    /// Enable or disable the shrinking heuristic
    pub fn with_shrinking(mut self, shrinking: bool) -> Self {
        self.config.shrinking = shrinking;
        self
    }

    /// Set the working set selection strategy
    pub fn with_working_set_strategy(mut self, strategy: WorkingSetStrategy) -> Self {
        self.config.working_set_strategy = strategy;
        self
    }

    /// Alphabet used when reading sequence files
    pub fn with_alphabet(mut self, alphabet: Alphabet) -> Self {
        self.alphabet = alphabet;
        self
    }

    /// Replace the whole optimizer configuration
    pub fn with_config(mut self, config: OptimizerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Train on a dataset
    pub fn train<D: Dataset>(self, dataset: &D) -> Result<TrainedModel<K>> {
        self.train_sequences(dataset.sequences(), dataset.labels())
    }

    /// Train on a sequence store with parallel labels
    pub fn train_sequences(
        self,
        sequences: &SequenceStore,
        labels: &[Label],
    ) -> Result<TrainedModel<K>> {
        let optimizer = SVMOptimizer::new(self.kernel, self.config.clone());
        let model = optimizer.train_sequences(sequences, labels)?;
        Ok(TrainedModel {
            model,
            alphabet: self.alphabet,
            config: self.config,
        })
    }

    /// Train on a precomputed kernel matrix (the kernel is not used)
    pub fn train_precomputed(
        self,
        matrix: &KernelMatrix,
        labels: &[Label],
    ) -> Result<PrecomputedSVM> {
        crate::optimizer::train_precomputed(&self.config, matrix, labels)
    }

    /// Train from a labeled sequence file
    pub fn train_from_file<P: AsRef<Path>>(self, path: P) -> Result<TrainedModel<K>> {
        let dataset = LabeledSequences::from_file(path, self.alphabet.clone())?;
        self.train(&dataset)
    }
}

/// Trained SVM model with high-level prediction interface
pub struct TrainedModel<K: Kernel = WeightedDegreeKernel> {
    model: TrainedSVM<K>,
    alphabet: Alphabet,
    config: OptimizerConfig,
}

impl<K: Kernel> TrainedModel<K> {
    /// Wrap a low-level model together with the settings it was trained with
    pub fn from_svm(model: TrainedSVM<K>, alphabet: Alphabet, config: OptimizerConfig) -> Self {
        Self {
            model,
            alphabet,
            config,
        }
    }

    /// Predict a single sequence
    ///
    /// The sequence is validated against the model's alphabet and length.
    pub fn predict(&self, sequence: &str) -> Result<Prediction> {
        let store = SequenceStore::new(&[sequence], self.alphabet.clone())?;
        let predictions = self.predict_batch(&store)?;
        predictions.into_iter().next().ok_or(SVMError::EmptyDataset)
    }

    /// Predict multiple sequences
    pub fn predict_batch(&self, sequences: &SequenceStore) -> Result<Vec<Prediction>> {
        self.model.predict_checked(sequences)
    }

    /// Predict from dataset
    pub fn predict_dataset<D: Dataset>(&self, dataset: &D) -> Result<Vec<Prediction>> {
        self.predict_batch(dataset.sequences())
    }

    /// Predict from a labeled sequence or FASTA file
    pub fn predict_from_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Prediction>> {
        let loaded = load_sequences(path, self.alphabet.clone())?;
        self.predict_batch(&loaded.sequences)
    }

    /// Evaluate accuracy on a dataset
    pub fn evaluate<D: Dataset>(&self, dataset: &D) -> Result<f64> {
        Ok(self.evaluate_detailed(dataset)?.accuracy())
    }

    /// Evaluate accuracy from a labeled sequence file
    pub fn evaluate_from_file<P: AsRef<Path>>(&self, path: P) -> Result<f64> {
        let dataset = LabeledSequences::from_file(path, self.alphabet.clone())?;
        self.evaluate(&dataset)
    }

    /// Get detailed evaluation metrics
    pub fn evaluate_detailed<D: Dataset>(&self, dataset: &D) -> Result<EvaluationMetrics> {
        let predictions = self.predict_dataset(dataset)?;
        let predicted: Vec<Label> = predictions.iter().map(|p| p.label).collect();
        Ok(EvaluationMetrics::from_labels(&predicted, dataset.labels()))
    }

    /// Get model information
    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            n_support_vectors: self.model.n_support_vectors(),
            bias: self.model.bias(),
            support_vector_indices: self.model.support_vector_indices().to_vec(),
            sequence_length: self.model.sequence_length(),
            iterations: self.model.iterations(),
            objective_value: self.model.objective_value(),
        }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Optimizer settings used for training
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Get the underlying trained model
    pub fn inner(&self) -> &TrainedSVM<K> {
        &self.model
    }
}

/// Detailed evaluation metrics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationMetrics {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl EvaluationMetrics {
    fn new(tp: usize, tn: usize, fp: usize, fn_: usize) -> Self {
        Self {
            true_positives: tp,
            true_negatives: tn,
            false_positives: fp,
            false_negatives: fn_,
        }
    }

    /// Confusion counts for predicted vs actual labels (pairs beyond the
    /// shorter slice are ignored)
    pub fn from_labels(predicted: &[Label], actual: &[Label]) -> Self {
        let mut tp = 0; // True positives
        let mut tn = 0; // True negatives
        let mut fp = 0; // False positives
        let mut fn_ = 0; // False negatives

        for (pred, actual) in predicted.iter().zip(actual.iter()) {
            match (pred.is_positive(), actual.is_positive()) {
                (true, true) => tp += 1,
                (false, false) => tn += 1,
                (true, false) => fp += 1,
                (false, true) => fn_ += 1,
            }
        }

        Self::new(tp, tn, fp, fn_)
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    /// Calculate accuracy: (TP + TN) / (TP + TN + FP + FN)
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.true_positives + self.true_negatives) as f64 / total as f64
        }
    }

    /// Calculate precision: TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        let denominator = self.true_positives + self.false_positives;
        if denominator == 0 {
            0.0
        } else {
            self.true_positives as f64 / denominator as f64
        }
    }

    /// Calculate recall (sensitivity): TP / (TP + FN)
    pub fn recall(&self) -> f64 {
        let denominator = self.true_positives + self.false_negatives;
        if denominator == 0 {
            0.0
        } else {
            self.true_positives as f64 / denominator as f64
        }
    }

    /// Calculate F1 score: 2 * (precision * recall) / (precision + recall)
    pub fn f1_score(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * (p * r) / (p + r)
        }
    }

    /// Calculate specificity: TN / (TN + FP)
    pub fn specificity(&self) -> f64 {
        let denominator = self.true_negatives + self.false_positives;
        if denominator == 0 {
            0.0
        } else {
            self.true_negatives as f64 / denominator as f64
        }
    }
}

/// Model information
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub n_support_vectors: usize,
    pub bias: f64,
    pub support_vector_indices: Vec<usize>,
    pub sequence_length: usize,
    pub iterations: usize,
    pub objective_value: f64,
}

/// Convenience functions for quick operations
pub mod quick {
    use super::*;

    /// Train a WD SVM on a labeled DNA file with default parameters
    pub fn train_file<P: AsRef<Path>>(path: P) -> Result<TrainedModel> {
        SVM::new().train_from_file(path)
    }

    /// Train with custom C parameter and kernel degree
    pub fn train_file_with<P: AsRef<Path>>(
        path: P,
        degree: usize,
        c: f64,
    ) -> Result<TrainedModel> {
        SVM::with_kernel(WeightedDegreeKernel::new(degree)?)
            .with_c(c)
            .train_from_file(path)
    }

    /// Quick evaluation: train on training file, test on test file
    pub fn evaluate_split<P1: AsRef<Path>, P2: AsRef<Path>>(
        train_path: P1,
        test_path: P2,
    ) -> Result<f64> {
        let model = train_file(train_path)?;
        model.evaluate_from_file(test_path)
    }

    /// Hold-out validation helper
    ///
    /// The first `train_ratio` of the samples train the model, the rest are
    /// scored (sequential split, not randomized for reproducibility).
    pub fn simple_validation<D: Dataset>(
        dataset: &D,
        train_ratio: f64,
        degree: usize,
        c: f64,
    ) -> Result<f64> {
        if train_ratio <= 0.0 || train_ratio >= 1.0 {
            return Err(SVMError::InvalidParameter(format!(
                "Train ratio must be between 0 and 1, got: {train_ratio}"
            )));
        }

        let n = dataset.len();
        let train_size = (n as f64 * train_ratio) as usize;
        if train_size == 0 || train_size == n {
            return Err(SVMError::InvalidDataset(format!(
                "Cannot split {n} samples with train ratio {train_ratio}"
            )));
        }

        let train_indices: Vec<usize> = (0..train_size).collect();
        let test_indices: Vec<usize> = (train_size..n).collect();
        let train_sequences = dataset.sequences().subset(&train_indices);
        let test_sequences = dataset.sequences().subset(&test_indices);

        let model = SVM::with_kernel(WeightedDegreeKernel::new(degree)?)
            .with_c(c)
            .train_sequences(&train_sequences, &dataset.labels()[..train_size])?;

        let predictions = model.predict_batch(&test_sequences)?;
        let correct = predictions
            .iter()
            .zip(dataset.labels()[train_size..].iter())
            .filter(|(pred, &actual)| pred.label == actual)
            .count();

        Ok(correct as f64 / test_indices.len() as f64)
    }
}
