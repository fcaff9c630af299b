//! Weighted-degree string kernel Support Vector Machine for biological sequences
//!
//! Sequences over a fixed alphabet are compared with the weighted degree
//! kernel (Rätsch & Sonnenburg), and a binary classifier is trained with an
//! SMO-style decomposition solver in the spirit of SVMlight
//! ("Making Large-Scale SVM Learning Practical", Joachims).

pub mod api;
pub mod cache;
pub mod core;
pub mod data;
pub mod features;
pub mod kernel;
pub mod optimizer;
pub mod persistence;
pub mod solver;
pub mod utils;

// Re-export main types for convenience
pub use crate::api::{EvaluationMetrics, ModelInfo, TrainedModel, SVM};
pub use crate::cache::{CacheStats, KernelCache};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{Result, SVMError};
pub use crate::data::{FastaRecords, LabeledSequences};
pub use crate::features::{Alphabet, SequenceStore};
pub use crate::kernel::{Kernel, KernelMatrix, WeightedDegreeKernel};
pub use crate::optimizer::{PrecomputedSVM, SVMOptimizer, TrainedSVM};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
