//! Error types for the weighted-degree SVM

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SVMError {
    #[error("Invalid alphabet: symbol '{symbol}' at position {position} of sequence {sequence}")]
    InvalidAlphabet {
        sequence: usize,
        position: usize,
        symbol: char,
    },

    #[error("Length mismatch: expected sequence length {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Degree {degree} exceeds sequence length {length}")]
    DegreeExceedsLength { degree: usize, length: usize },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid kernel matrix: {0}")]
    InvalidKernelMatrix(String),

    #[error("Model not trained")]
    ModelNotTrained,

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Invalid label: expected -1 or +1, got {0}")]
    InvalidLabel(f64),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, SVMError>;
