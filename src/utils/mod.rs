//! Utility functions for SVM operations

use crate::core::{Dataset, Label, Result, SVMError};

/// Validation and preprocessing utilities
pub mod validation {
    use super::*;

    /// Convert numeric labels (-1 or +1) to typed labels
    pub fn labels_from_values(values: &[f64]) -> Result<Vec<Label>> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                Label::try_from(value).map_err(|_| {
                    SVMError::InvalidDataset(format!(
                        "Invalid label {value} at index {i}: labels must be +1 or -1"
                    ))
                })
            })
            .collect()
    }

    /// Check if dataset labels are balanced (roughly equal +1 and -1 samples)
    pub fn check_label_balance<D: Dataset>(dataset: &D) -> (usize, usize, f64) {
        label_balance(dataset.labels())
    }

    /// Positive count, negative count and their ratio
    pub fn label_balance(labels: &[Label]) -> (usize, usize, f64) {
        let positive_count = labels.iter().filter(|l| l.is_positive()).count();
        let negative_count = labels.len() - positive_count;
        let balance_ratio = if negative_count == 0 {
            f64::INFINITY
        } else {
            positive_count as f64 / negative_count as f64
        };
        (positive_count, negative_count, balance_ratio)
    }

    /// Whether both classes are present
    pub fn has_both_classes(labels: &[Label]) -> bool {
        let (positive, negative, _) = label_balance(labels);
        positive > 0 && negative > 0
    }
}

/// Synthetic sequence datasets
pub mod synthetic {
    use super::*;
    use crate::data::LabeledSequences;
    use crate::features::Alphabet;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Settings for a planted-motif DNA dataset
    ///
    /// Positive sequences carry `motif` at `position` (each motif symbol is
    /// replaced by a random one with probability `mutation_rate`); negative
    /// sequences are uniform random background.
    #[derive(Debug, Clone)]
    pub struct MotifConfig {
        pub n_positive: usize,
        pub n_negative: usize,
        pub length: usize,
        pub motif: String,
        pub position: usize,
        pub mutation_rate: f64,
        pub seed: u64,
    }

    impl Default for MotifConfig {
        fn default() -> Self {
            Self {
                n_positive: 50,
                n_negative: 50,
                length: 20,
                motif: "TATAAT".to_string(),
                position: 5,
                mutation_rate: 0.1,
                seed: 42,
            }
        }
    }

    /// Generate a planted-motif dataset: positives first, then negatives
    pub fn planted_motif(config: &MotifConfig) -> Result<LabeledSequences> {
        if config.n_positive + config.n_negative == 0 {
            return Err(SVMError::EmptyDataset);
        }
        if config.position + config.motif.len() > config.length {
            return Err(SVMError::InvalidParameter(format!(
                "Motif of length {} at position {} does not fit in sequences of length {}",
                config.motif.len(),
                config.position,
                config.length
            )));
        }
        if !(0.0..=1.0).contains(&config.mutation_rate) {
            return Err(SVMError::InvalidParameter(format!(
                "mutation_rate must be in [0, 1], got: {}",
                config.mutation_rate
            )));
        }

        let alphabet = Alphabet::Dna;
        let symbols = alphabet.symbols();
        let motif = config.motif.as_bytes();
        let mut rng = StdRng::seed_from_u64(config.seed);

        let mut sequences = Vec::with_capacity(config.n_positive + config.n_negative);
        let mut labels = Vec::with_capacity(config.n_positive + config.n_negative);

        for i in 0..(config.n_positive + config.n_negative) {
            let mut sequence: Vec<u8> = (0..config.length)
                .map(|_| symbols[rng.gen_range(0..symbols.len())])
                .collect();

            if i < config.n_positive {
                for (offset, &symbol) in motif.iter().enumerate() {
                    sequence[config.position + offset] = if rng.gen::<f64>() < config.mutation_rate {
                        symbols[rng.gen_range(0..symbols.len())]
                    } else {
                        symbol
                    };
                }
                labels.push(Label::Positive);
            } else {
                labels.push(Label::Negative);
            }
            sequences.push(sequence);
        }

        LabeledSequences::from_sequences(&sequences, labels, alphabet)
    }
}

/// Memory management utilities
pub mod memory {
    /// Bytes per cached kernel entry, as budgeted by `KernelCache::with_memory_limit`
    pub use crate::cache::ENTRY_BYTES as CACHE_ENTRY_BYTES;

    /// Estimate memory usage for kernel cache
    pub fn estimate_kernel_cache_memory(n_samples: usize) -> usize {
        // Upper bound: every off-diagonal entry of the symmetric matrix
        let max_entries = (n_samples * n_samples.saturating_sub(1)) / 2;
        max_entries * CACHE_ENTRY_BYTES
    }

    /// Size in bytes of a dense rows x cols kernel matrix
    pub fn kernel_matrix_bytes(rows: usize, cols: usize) -> usize {
        rows * cols * std::mem::size_of::<f64>()
    }

    /// Recommend cache size based on available memory and dataset size
    pub fn recommend_cache_size(n_samples: usize, available_memory_mb: usize) -> usize {
        let available_bytes = available_memory_mb * 1024 * 1024;
        let full_cache_size = estimate_kernel_cache_memory(n_samples);

        // Use at most 50% of available memory for cache
        let max_cache_size = available_bytes / 2;

        full_cache_size.min(max_cache_size)
    }
}
