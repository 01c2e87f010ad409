// ==============================================================================
// parsers/idxstats.rs - samtools idxstats Parser
// ==============================================================================
// Description: Parser for per-reference mapped/unmapped read counts
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Format: Tab-delimited, no header, 4 columns
// Example:
//   chr1    248956422    15023411    1204
//   chr2    242193529    15782630    1102
//   *       0            0           8112
// ==============================================================================

use csv::ReaderBuilder;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::models::{ChromosomeCounts, Idxstats};

/// Errors that can occur during idxstats parsing
#[derive(Error, Debug)]
pub enum IdxstatsParseError {
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid line format at line {line}: {details}")]
    InvalidFormat { line: usize, details: String },

    #[error("Invalid {column} value at line {line}: {value}")]
    InvalidCount {
        line: usize,
        column: &'static str,
        value: String,
    },

    #[error("Reference '{name}' listed twice (line {line})")]
    DuplicateReference { line: usize, name: String },
}

/// Parser for samtools idxstats output
#[derive(Debug, Clone)]
pub struct IdxstatsParser {
    /// Reference names to keep, in output order
    pub targets: Vec<String>,
}

impl Default for IdxstatsParser {
    fn default() -> Self {
        Self::new()
    }
}

impl IdxstatsParser {
    /// Create a parser for the primary human assembly (chr1-22, X, Y, M)
    pub fn new() -> Self {
        let targets = (1..=22)
            .map(|n| n.to_string())
            .chain(["X", "Y", "M"].iter().map(|s| s.to_string()))
            .map(|name| format!("chr{}", name))
            .collect();
        Self { targets }
    }

    /// Create a parser with specific reference names to keep
    pub fn with_targets(targets: Vec<String>) -> Self {
        Self { targets }
    }

    /// Parse an idxstats file
    ///
    /// # Returns
    /// * `Ok(Idxstats)` - Counts for every target present in the file, in
    ///   target order. Targets absent from the file are skipped.
    /// * `Err(IdxstatsParseError)` - Parse error
    pub fn parse(&self, path: impl AsRef<Path>) -> Result<Idxstats, IdxstatsParseError> {
        let path = path.as_ref();
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_path(path)?;

        let mut all_chromosomes: HashMap<String, ChromosomeCounts> = HashMap::new();

        for (idx, result) in reader.records().enumerate() {
            let line = idx + 1;
            let record = result?;

            if record.len() != 4 {
                return Err(IdxstatsParseError::InvalidFormat {
                    line,
                    details: format!("Expected 4 tab-delimited fields, found {}", record.len()),
                });
            }

            let count = |column: usize, name: &'static str| -> Result<u64, IdxstatsParseError> {
                let value = record[column].trim();
                value.parse::<u64>().map_err(|_| IdxstatsParseError::InvalidCount {
                    line,
                    column: name,
                    value: value.to_string(),
                })
            };

            let chromosome = ChromosomeCounts {
                name: record[0].trim().to_string(),
                length: count(1, "length")?,
                mapped: count(2, "mapped")?,
                unmapped: count(3, "unmapped")?,
            };

            if all_chromosomes.contains_key(&chromosome.name) {
                return Err(IdxstatsParseError::DuplicateReference {
                    line,
                    name: chromosome.name,
                });
            }
            all_chromosomes.insert(chromosome.name.clone(), chromosome);
        }

        let chromosomes = self
            .targets
            .iter()
            .filter_map(|name| all_chromosomes.remove(name))
            .collect();

        Ok(Idxstats {
            path: path.to_path_buf(),
            chromosomes,
        })
    }
}
