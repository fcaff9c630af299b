//! Labeled sequence format dataset implementation
//!
//! One sample per line, label first:
//!
//! ```text
//! # promoter windows
//! +1 ACGTTGCAAC
//! -1 TTGACCATGA
//! ```
//!
//! Labels are `+1`, `1` or `-1`. Blank lines and lines starting with `#`
//! are skipped.

use crate::core::{Dataset, Label, Result, SVMError};
use crate::features::{Alphabet, SequenceStore};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Aligned sequences with one label each
#[derive(Debug, Clone)]
pub struct LabeledSequences {
    sequences: SequenceStore,
    labels: Vec<Label>,
}

impl LabeledSequences {
    /// Pair a validated store with its labels
    pub fn new(sequences: SequenceStore, labels: Vec<Label>) -> Result<Self> {
        if sequences.len() != labels.len() {
            return Err(SVMError::DimensionMismatch {
                expected: sequences.len(),
                actual: labels.len(),
            });
        }
        Ok(Self { sequences, labels })
    }

    /// Validate raw sequences and pair them with labels
    pub fn from_sequences<S: AsRef<[u8]>>(
        sequences: &[S],
        labels: Vec<Label>,
        alphabet: Alphabet,
    ) -> Result<Self> {
        Self::new(SequenceStore::new(sequences, alphabet)?, labels)
    }

    /// Load a dataset from a labeled sequence file
    pub fn from_file<P: AsRef<Path>>(path: P, alphabet: Alphabet) -> Result<Self> {
        let file = File::open(path).map_err(SVMError::IoError)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader, alphabet)
    }

    /// Load a dataset from a reader (for testing and flexibility)
    pub fn from_reader<R: BufRead>(reader: R, alphabet: Alphabet) -> Result<Self> {
        let mut sequences = Vec::new();
        let mut labels = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(SVMError::IoError)?;
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (label, sequence) = Self::parse_line(line).map_err(|e| {
                SVMError::ParseError(format!("Error parsing line {}: {}", line_num + 1, e))
            })?;
            labels.push(label);
            sequences.push(sequence.to_string());
        }

        if sequences.is_empty() {
            return Err(SVMError::EmptyDataset);
        }

        Self::from_sequences(&sequences, labels, alphabet)
    }

    /// Parse a single `<label> <sequence>` line
    fn parse_line(line: &str) -> Result<(Label, &str)> {
        let mut parts = line.split_whitespace();

        let label_str = parts
            .next()
            .ok_or_else(|| SVMError::ParseError("Empty line".to_string()))?;
        let value = label_str
            .parse::<f64>()
            .map_err(|_| SVMError::ParseError(format!("Invalid label: {label_str}")))?;
        let label = Label::try_from(value)?;

        let sequence = parts
            .next()
            .ok_or_else(|| SVMError::ParseError("Missing sequence".to_string()))?;

        if parts.next().is_some() {
            return Err(SVMError::ParseError(
                "Expected exactly two fields: <label> <sequence>".to_string(),
            ));
        }

        Ok((label, sequence))
    }

    /// Write the dataset in the same format `from_reader` accepts
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        for (i, label) in self.labels.iter().enumerate() {
            writeln!(writer, "{} {}", label, self.sequences.sequence_string(i))?;
        }
        Ok(())
    }

    /// Save the dataset to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(std::io::BufWriter::new(file))
    }

    /// New dataset holding the samples at `indices`, in that order
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            sequences: self.sequences.subset(indices),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    pub fn into_parts(self) -> (SequenceStore, Vec<Label>) {
        (self.sequences, self.labels)
    }
}

impl Dataset for LabeledSequences {
    fn len(&self) -> usize {
        self.sequences.len()
    }

    fn sequence_length(&self) -> usize {
        self.sequences.seq_len()
    }

    fn sequences(&self) -> &SequenceStore {
        &self.sequences
    }

    fn labels(&self) -> &[Label] {
        &self.labels
    }
}
