//! Fixed-width sequence feature store
//!
//! Sequences are validated against an alphabet once, at construction, and
//! kept as an N x L symbol table. Every later consumer (kernels, solver,
//! persistence) can rely on equal lengths and valid symbols.

use crate::core::{Result, SVMError};
use crate::features::Alphabet;
use ndarray::{Array2, ArrayView2, Axis};

/// Alphabet-validated table of equal-length sequences
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceStore {
    symbols: Array2<u8>,
    alphabet: Alphabet,
}

impl SequenceStore {
    /// Validate and store `sequences`
    ///
    /// Fails with `InvalidAlphabet` on the first symbol outside `alphabet`
    /// and with `LengthMismatch` if the sequences differ in length.
    pub fn new<S: AsRef<[u8]>>(sequences: &[S], alphabet: Alphabet) -> Result<Self> {
        let first = sequences.first().ok_or(SVMError::EmptyDataset)?;
        let seq_len = first.as_ref().len();
        if seq_len == 0 {
            return Err(SVMError::InvalidDataset(
                "Sequences must contain at least one symbol".to_string(),
            ));
        }

        let mut table = Vec::with_capacity(sequences.len() * seq_len);
        for (index, sequence) in sequences.iter().enumerate() {
            let sequence = sequence.as_ref();
            if sequence.len() != seq_len {
                return Err(SVMError::LengthMismatch {
                    expected: seq_len,
                    actual: sequence.len(),
                });
            }
            for (position, &symbol) in sequence.iter().enumerate() {
                let canonical =
                    alphabet
                        .normalize(symbol)
                        .ok_or(SVMError::InvalidAlphabet {
                            sequence: index,
                            position,
                            symbol: symbol as char,
                        })?;
                table.push(canonical);
            }
        }

        let symbols = Array2::from_shape_vec((sequences.len(), seq_len), table)
            .map_err(|e| SVMError::InvalidDataset(e.to_string()))?;
        Ok(Self { symbols, alphabet })
    }

    /// Validate an existing N x L symbol table
    pub fn from_array(table: Array2<u8>, alphabet: Alphabet) -> Result<Self> {
        let rows: Vec<Vec<u8>> = table.outer_iter().map(|row| row.to_vec()).collect();
        Self::new(&rows, alphabet)
    }

    /// Store with no rows, used for models without support vectors
    pub fn empty(seq_len: usize, alphabet: Alphabet) -> Self {
        Self {
            symbols: Array2::zeros((0, seq_len)),
            alphabet,
        }
    }

    /// Sequence `i`
    ///
    /// # Panics
    /// Panics if `i >= len()`
    pub fn get(&self, i: usize) -> &[u8] {
        self.symbols
            .row(i)
            .to_slice()
            .expect("sequence table is stored in standard layout")
    }

    /// Number of sequences
    pub fn len(&self) -> usize {
        self.symbols.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Common sequence length L
    pub fn seq_len(&self) -> usize {
        self.symbols.ncols()
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Iterate over all sequences in order
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    /// New store holding the sequences at `indices`, in that order
    ///
    /// # Panics
    /// Panics if an index is out of range
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            symbols: self.symbols.select(Axis(0), indices),
            alphabet: self.alphabet.clone(),
        }
    }

    /// The N x L symbol table
    pub fn as_array(&self) -> ArrayView2<'_, u8> {
        self.symbols.view()
    }

    /// Sequence `i` as text
    pub fn sequence_string(&self, i: usize) -> String {
        String::from_utf8_lossy(self.get(i)).into_owned()
    }
}
