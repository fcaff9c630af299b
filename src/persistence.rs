//! Model serialization and persistence
//!
//! This module provides functionality to save and load trained SVM models
//! for use with the CLI application and other scenarios where model persistence is needed.
//!
//! Models are stored as pretty-printed JSON. Support vectors are kept as
//! sequence strings together with `alpha_i * y_i`, so a loaded model
//! reproduces the decision values of the model that was saved.

use crate::api::TrainedModel;
use crate::core::{Label, OptimizerConfig, Result, SVMError, WorkingSetStrategy};
use crate::features::{Alphabet, SequenceStore};
use crate::kernel::{Kernel, Normalization, WeightedDegreeKernel};
use crate::optimizer::TrainedSVM;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Serializable representation of a trained SVM model
#[derive(Debug, Serialize, Deserialize)]
pub struct SerializableModel {
    /// Kernel type and parameters
    pub kernel: KernelParams,
    /// Alphabet the support sequences are written in
    pub alphabet: Alphabet,
    /// Length of every training sequence
    pub sequence_length: usize,
    /// Support vectors
    pub support_vectors: Vec<String>,
    /// Alpha values times labels (alpha_i * y_i)
    pub alpha_y: Vec<f64>,
    /// Bias term
    pub bias: f64,
    /// Model metadata
    pub metadata: ModelMetadata,
}

/// Kernel parameters needed to rebuild the kernel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelParams {
    /// Kernel type identifier
    pub kernel_type: String,
    /// Per-degree weights (the degree is their count)
    pub weights: Vec<f64>,
    pub normalization: Normalization,
}

/// Model metadata for tracking and validation
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    /// Number of support vectors
    pub n_support_vectors: usize,
    /// Training parameters used
    pub training_params: TrainingParams,
    /// SMO iterations used in training
    pub iterations: usize,
    /// Creation timestamp
    pub created_at: String,
}

/// Training parameters for reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingParams {
    pub c: f64,
    pub epsilon: f64,
    pub max_iterations: usize,
    pub shrinking: bool,
    pub working_set_strategy: WorkingSetStrategy,
}

impl From<&OptimizerConfig> for TrainingParams {
    fn from(config: &OptimizerConfig) -> Self {
        Self {
            c: config.c,
            epsilon: config.epsilon,
            max_iterations: config.max_iterations,
            shrinking: config.shrinking,
            working_set_strategy: config.working_set_strategy,
        }
    }
}

impl From<&TrainingParams> for OptimizerConfig {
    fn from(params: &TrainingParams) -> Self {
        Self {
            c: params.c,
            epsilon: params.epsilon,
            max_iterations: params.max_iterations,
            shrinking: params.shrinking,
            working_set_strategy: params.working_set_strategy,
            ..OptimizerConfig::default()
        }
    }
}

impl From<&WeightedDegreeKernel> for KernelParams {
    fn from(kernel: &WeightedDegreeKernel) -> Self {
        Self {
            kernel_type: kernel.name().to_string(),
            weights: kernel.weights().to_vec(),
            normalization: kernel.normalization(),
        }
    }
}

impl KernelParams {
    /// Rebuild the kernel, validating the stored weights
    pub fn to_kernel(&self) -> Result<WeightedDegreeKernel> {
        let kernel = WeightedDegreeKernel::with_weights(self.weights.clone())?
            .with_normalization(self.normalization);
        if self.kernel_type != kernel.name() {
            return Err(SVMError::SerializationError(format!(
                "Unsupported kernel type: {}",
                self.kernel_type
            )));
        }
        Ok(kernel)
    }
}

impl SerializableModel {
    /// Create a serializable model from a trained model
    pub fn from_trained_model(model: &TrainedModel<WeightedDegreeKernel>) -> Self {
        let info = model.info();
        let inner = model.inner();
        let svs = inner.support_vectors();

        let support_vectors: Vec<String> = (0..svs.len()).map(|i| svs.sequence_string(i)).collect();

        // Calculate alpha_y = alpha_i * y_i for each support vector
        let alpha_y: Vec<f64> = inner
            .alpha_values()
            .iter()
            .zip(inner.support_labels().iter())
            .map(|(&alpha, label)| alpha * label.as_f64())
            .collect();

        Self {
            kernel: KernelParams::from(inner.kernel()),
            alphabet: model.alphabet().clone(),
            sequence_length: info.sequence_length,
            support_vectors,
            alpha_y,
            bias: info.bias,
            metadata: ModelMetadata {
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                n_support_vectors: info.n_support_vectors,
                training_params: TrainingParams::from(model.config()),
                iterations: info.iterations,
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    /// Save model to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(SVMError::IoError)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| SVMError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load model from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(SVMError::IoError)?;
        let reader = BufReader::new(file);
        let model: Self = serde_json::from_reader(reader)
            .map_err(|e| SVMError::SerializationError(e.to_string()))?;
        debug!(
            "Loaded model with {} support vectors (version {})",
            model.support_vectors.len(),
            model.metadata.library_version
        );
        Ok(model)
    }

    /// Convert back to a trained model
    pub fn to_trained_model(&self) -> Result<TrainedModel<WeightedDegreeKernel>> {
        let kernel = self.kernel.to_kernel()?;

        if self.alpha_y.len() != self.support_vectors.len() {
            return Err(SVMError::DimensionMismatch {
                expected: self.support_vectors.len(),
                actual: self.alpha_y.len(),
            });
        }

        let store = if self.support_vectors.is_empty() {
            SequenceStore::empty(self.sequence_length, self.alphabet.clone())
        } else {
            let store = SequenceStore::new(&self.support_vectors, self.alphabet.clone())?;
            if store.seq_len() != self.sequence_length {
                return Err(SVMError::LengthMismatch {
                    expected: self.sequence_length,
                    actual: store.seq_len(),
                });
            }
            store
        };

        let alpha: Vec<f64> = self.alpha_y.iter().map(|v| v.abs()).collect();
        let labels: Vec<Label> = self
            .alpha_y
            .iter()
            .map(|&v| Label::from_decision(v))
            .collect();

        let svm = TrainedSVM::from_parts(kernel, store, alpha, labels, self.bias)?;
        Ok(TrainedModel::from_svm(
            svm,
            self.alphabet.clone(),
            OptimizerConfig::from(&self.metadata.training_params),
        ))
    }

    /// Print model summary
    pub fn print_summary(&self) {
        println!("=== SVM Model Summary ===");
        println!("Kernel Type: {}", self.kernel.kernel_type);
        println!("Degree: {}", self.kernel.weights.len());
        println!("Weights: {:?}", self.kernel.weights);
        println!("Normalization: {:?}", self.kernel.normalization);
        println!("Alphabet: {}", self.alphabet);
        println!("Sequence Length: {}", self.sequence_length);
        println!("Support Vectors: {}", self.metadata.n_support_vectors);
        println!("Bias: {:.6}", self.bias);
        println!("Library Version: {}", self.metadata.library_version);
        println!("Created: {}", self.metadata.created_at);
        println!("Training Parameters:");
        println!("  C: {}", self.metadata.training_params.c);
        println!("  Epsilon: {}", self.metadata.training_params.epsilon);
        println!(
            "  Max Iterations: {}",
            self.metadata.training_params.max_iterations
        );
        println!("  Shrinking: {}", self.metadata.training_params.shrinking);
        println!(
            "  Working Set Strategy: {:?}",
            self.metadata.training_params.working_set_strategy
        );
        println!("  Iterations Used: {}", self.metadata.iterations);
    }
}

/// Save a trained model as JSON
pub fn save_model<P: AsRef<Path>>(model: &TrainedModel<WeightedDegreeKernel>, path: P) -> Result<()> {
    SerializableModel::from_trained_model(model).save_to_file(path)
}

/// Load a model saved with [`save_model`]
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<TrainedModel<WeightedDegreeKernel>> {
    SerializableModel::load_from_file(path)?.to_trained_model()
}
