//! Symbol alphabets for sequence features

use crate::core::{Result, SVMError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DNA_SYMBOLS: &[u8] = b"ACGT";
const RNA_SYMBOLS: &[u8] = b"ACGU";
const PROTEIN_SYMBOLS: &[u8] = b"ACDEFGHIKLMNPQRSTVWY";

/// Alphabet a sequence store is constrained to
///
/// Built-in alphabets accept lower-case input and store the upper-case
/// symbol. Custom alphabets match bytes exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alphabet {
    Dna,
    Rna,
    Protein,
    Custom(Vec<u8>),
}

impl Alphabet {
    /// Build a custom alphabet from the distinct bytes of `symbols`
    pub fn custom(symbols: &str) -> Result<Self> {
        let mut distinct: Vec<u8> = symbols.bytes().collect();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.is_empty() {
            return Err(SVMError::InvalidParameter(
                "Custom alphabet must contain at least one symbol".to_string(),
            ));
        }
        Ok(Alphabet::Custom(distinct))
    }

    /// Valid symbols in canonical form
    pub fn symbols(&self) -> &[u8] {
        match self {
            Alphabet::Dna => DNA_SYMBOLS,
            Alphabet::Rna => RNA_SYMBOLS,
            Alphabet::Protein => PROTEIN_SYMBOLS,
            Alphabet::Custom(symbols) => symbols,
        }
    }

    /// Number of distinct symbols
    pub fn size(&self) -> usize {
        self.symbols().len()
    }

    /// Canonical form of `symbol`, or `None` if it is not part of the alphabet
    pub fn normalize(&self, symbol: u8) -> Option<u8> {
        let canonical = match self {
            Alphabet::Custom(_) => symbol,
            _ => symbol.to_ascii_uppercase(),
        };
        self.symbols().contains(&canonical).then_some(canonical)
    }

    pub fn contains(&self, symbol: u8) -> bool {
        self.normalize(symbol).is_some()
    }

    /// Short name used in model files and on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Alphabet::Dna => "dna",
            Alphabet::Rna => "rna",
            Alphabet::Protein => "protein",
            Alphabet::Custom(_) => "custom",
        }
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Alphabet::Dna
    }
}

impl FromStr for Alphabet {
    type Err = SVMError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dna" => Ok(Alphabet::Dna),
            "rna" => Ok(Alphabet::Rna),
            "protein" => Ok(Alphabet::Protein),
            other => Err(SVMError::InvalidParameter(format!(
                "Unknown alphabet: {other}. Use 'dna', 'rna' or 'protein'"
            ))),
        }
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alphabet::Custom(symbols) => {
                write!(f, "custom({})", String::from_utf8_lossy(symbols))
            }
            _ => write!(f, "{}", self.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dna_normalization() {
        let dna = Alphabet::Dna;
        assert_eq!(dna.normalize(b'a'), Some(b'A'));
        assert_eq!(dna.normalize(b'T'), Some(b'T'));
        assert_eq!(dna.normalize(b'U'), None);
        assert_eq!(dna.normalize(b'N'), None);
        assert_eq!(dna.size(), 4);
    }

    #[test]
    fn test_rna_and_protein() {
        assert!(Alphabet::Rna.contains(b'u'));
        assert!(!Alphabet::Rna.contains(b'T'));
        assert_eq!(Alphabet::Protein.size(), 20);
        assert!(Alphabet::Protein.contains(b'w'));
        assert!(!Alphabet::Protein.contains(b'B'));
    }

    #[test]
    fn test_custom_alphabet_is_exact() {
        let binary = Alphabet::custom("0110").unwrap();
        assert_eq!(binary.symbols(), b"01");
        assert!(binary.contains(b'0'));
        assert!(!binary.contains(b'2'));

        let mixed = Alphabet::custom("aB").unwrap();
        assert!(mixed.contains(b'a'));
        assert!(!mixed.contains(b'A'));

        assert!(Alphabet::custom("").is_err());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("DNA".parse::<Alphabet>().unwrap(), Alphabet::Dna);
        assert_eq!("protein".parse::<Alphabet>().unwrap(), Alphabet::Protein);
        assert!("cube".parse::<Alphabet>().is_err());
        assert_eq!(Alphabet::Rna.to_string(), "rna");
    }
}
