//! Data loading and dataset implementations
//!
//! Two text formats are supported: labeled sequences (`<label> <sequence>`
//! per line) for training and evaluation, and FASTA for scoring unlabeled
//! sequences.

pub mod fasta;
pub mod labeled;

pub use self::fasta::*;
pub use self::labeled::*;

use crate::core::{Dataset, Label, Result};
use crate::features::{Alphabet, SequenceStore};
use std::path::Path;

/// Sequence file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceFormat {
    Labeled,
    Fasta,
}

impl SequenceFormat {
    /// Guess the format from the file extension (FASTA extensions, else labeled)
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("fa" | "fasta" | "fna" | "fas") => SequenceFormat::Fasta,
            _ => SequenceFormat::Labeled,
        }
    }
}

/// Sequences loaded for prediction, with labels when the file carries them
#[derive(Debug, Clone)]
pub struct LoadedSequences {
    pub sequences: SequenceStore,
    pub labels: Option<Vec<Label>>,
    /// FASTA record ids, or 1-based line positions for labeled files
    pub ids: Vec<String>,
}

/// Load a sequence file in either format
pub fn load_sequences<P: AsRef<Path>>(path: P, alphabet: Alphabet) -> Result<LoadedSequences> {
    match SequenceFormat::from_path(&path) {
        SequenceFormat::Fasta => {
            let records = FastaRecords::from_file(path, alphabet)?;
            let ids = records.ids().to_vec();
            Ok(LoadedSequences {
                sequences: records.into_sequences(),
                labels: None,
                ids,
            })
        }
        SequenceFormat::Labeled => {
            let dataset = LabeledSequences::from_file(path, alphabet)?;
            let ids = (1..=dataset.labels().len()).map(|i| i.to_string()).collect();
            let (sequences, labels) = dataset.into_parts();
            Ok(LoadedSequences {
                sequences,
                labels: Some(labels),
                ids,
            })
        }
    }
}
