//! FASTA reader for unlabeled sequences
//!
//! Records are parsed with needletail, so multi-line records, FASTQ input
//! and gzip/bzip2/xz compressed files are handled transparently. The record
//! id is the header up to the first whitespace.

use crate::core::{Result, SVMError};
use crate::features::{Alphabet, SequenceStore};
use needletail::parse_fastx_reader;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Unlabeled sequences read from FASTA, with their record ids
#[derive(Debug, Clone)]
pub struct FastaRecords {
    ids: Vec<String>,
    sequences: SequenceStore,
}

impl FastaRecords {
    pub fn from_file<P: AsRef<Path>>(path: P, alphabet: Alphabet) -> Result<Self> {
        let file = File::open(path).map_err(SVMError::IoError)?;
        Self::from_reader(file, alphabet)
    }

    pub fn from_reader<R: Read + Send>(reader: R, alphabet: Alphabet) -> Result<Self> {
        let mut reader = BufReader::new(reader);
        // needletail reports empty input as a format error
        if reader.fill_buf().map_err(SVMError::IoError)?.is_empty() {
            return Err(SVMError::EmptyDataset);
        }

        let mut fastx =
            parse_fastx_reader(reader).map_err(|e| SVMError::ParseError(e.to_string()))?;

        let mut ids: Vec<String> = Vec::new();
        let mut sequences: Vec<Vec<u8>> = Vec::new();

        while let Some(record) = fastx.next() {
            let record = record.map_err(|e| SVMError::ParseError(e.to_string()))?;
            let id = record_id(record.id(), ids.len() + 1);
            let sequence = record.seq().into_owned();
            if sequence.is_empty() {
                return Err(SVMError::ParseError(format!(
                    "Record '{id}' has no sequence"
                )));
            }
            ids.push(id);
            sequences.push(sequence);
        }

        if sequences.is_empty() {
            return Err(SVMError::EmptyDataset);
        }

        Ok(Self {
            ids,
            sequences: SequenceStore::new(&sequences, alphabet)?,
        })
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn sequences(&self) -> &SequenceStore {
        &self.sequences
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn into_sequences(self) -> SequenceStore {
        self.sequences
    }
}

/// First word of the header, or `record_<n>` for an anonymous header
fn record_id(header: &[u8], n: usize) -> String {
    String::from_utf8_lossy(header)
        .split_whitespace()
        .next()
        .map(str::to_string)
        .unwrap_or_else(|| format!("record_{n}"))
}
