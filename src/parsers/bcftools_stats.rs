// ==============================================================================
// parsers/bcftools_stats.rs - bcftools stats Parser
// ==============================================================================
// Description: Parser for variant calling summary statistics
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Format: Tab-delimited lines tagged by record type, '#' comments
// Example:
//   # SN, Summary numbers:
//   SN    0    number of samples:    1
//   SN    0    number of SNPs:       3821034
//   SN    0    number of indels:     702311
//   # TSTV, transitions/transversions:
//   TSTV  0    2597419    1247612    2.08    2594818    1245965    2.08
// ==============================================================================

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::models::VariantStats;
use crate::region::Region;

pub const SUMMARY_TAG: &str = "SN";
pub const TS_TV_TAG: &str = "TSTV";

pub const SNPS_LABEL: &str = "number of SNPs:";
pub const INDELS_LABEL: &str = "number of indels:";

/// Column of the TSTV record holding the ts/tv ratio
const TS_TV_RATIO_COLUMN: usize = 4;

/// Errors that can occur during bcftools stats parsing
#[derive(Error, Debug)]
pub enum BcftoolsStatsParseError {
    #[error("Failed to read {}: {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: no '{tag}' records", .path.display())]
    MissingRecordType { path: PathBuf, tag: &'static str },

    #[error("{}: no '{label}' summary record", .path.display())]
    MissingField { path: PathBuf, label: &'static str },

    #[error("{}: invalid value '{value}' for '{field}' at line {line}", .path.display())]
    FieldType {
        path: PathBuf,
        line: usize,
        field: &'static str,
        value: String,
    },
}

/// A non-comment line split into fields
struct TaggedLine<'a> {
    line_number: usize,
    fields: Vec<&'a str>,
}

/// Parser for bcftools stats output
pub struct BcftoolsStatsParser;

impl BcftoolsStatsParser {
    /// Parse a bcftools stats file for one region
    ///
    /// # Returns
    /// * `Ok(Some(VariantStats))` - File present and valid
    /// * `Ok(None)` - File does not exist (region not called)
    /// * `Err(BcftoolsStatsParseError)` - File present but malformed
    pub fn parse(
        path: impl AsRef<Path>,
        region: Region,
    ) -> Result<Option<VariantStats>, BcftoolsStatsParseError> {
        let path = path.as_ref();

        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No variant statistics for {} at {:?}", region, path);
                return Ok(None);
            }
            Err(source) => {
                return Err(BcftoolsStatsParseError::IoError {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::parse_str(&text, path, region).map(Some)
    }

    /// Parse variant statistics from already-loaded text
    pub fn parse_str(
        text: &str,
        path: &Path,
        region: Region,
    ) -> Result<VariantStats, BcftoolsStatsParseError> {
        let groups = group_by_tag(text);

        let group = |tag: &'static str| {
            groups
                .get(tag)
                .ok_or_else(|| BcftoolsStatsParseError::MissingRecordType {
                    path: path.to_path_buf(),
                    tag,
                })
        };

        let summary = group(SUMMARY_TAG)?;
        let ts_tv = group(TS_TV_TAG)?;

        let num_snps = summary_count(summary, SNPS_LABEL, path)?;
        let num_indels = summary_count(summary, INDELS_LABEL, path)?;

        // Non-empty: groups only hold tags that were seen
        let first = &ts_tv[0];
        let raw_ratio = first.fields.get(TS_TV_RATIO_COLUMN).copied().unwrap_or("");
        let ts_tv_ratio = raw_ratio
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|ratio| ratio.is_finite())
            .ok_or_else(|| BcftoolsStatsParseError::FieldType {
                path: path.to_path_buf(),
                line: first.line_number,
                field: "ts/tv",
                value: raw_ratio.to_string(),
            })?;

        debug!(
            "Parsed variant statistics for {}: {} SNPs, {} indels, ts/tv {:.3}",
            region, num_snps, num_indels, ts_tv_ratio
        );

        Ok(VariantStats {
            path: path.to_path_buf(),
            region,
            num_snps,
            num_indels,
            ts_tv_ratio,
        })
    }
}

/// Group non-comment lines by their leading record-type tag
fn group_by_tag(text: &str) -> HashMap<&str, Vec<TaggedLine<'_>>> {
    let mut groups: HashMap<&str, Vec<TaggedLine<'_>>> = HashMap::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        groups.entry(fields[0]).or_default().push(TaggedLine {
            line_number: idx + 1,
            fields,
        });
    }

    groups
}

/// Count from the SN record whose third field is `label`
fn summary_count(
    summary: &[TaggedLine<'_>],
    label: &'static str,
    path: &Path,
) -> Result<u64, BcftoolsStatsParseError> {
    let record = summary
        .iter()
        .find(|record| record.fields.get(2).map(|f| f.trim()) == Some(label))
        .ok_or_else(|| BcftoolsStatsParseError::MissingField {
            path: path.to_path_buf(),
            label,
        })?;

    let raw = record.fields.get(3).copied().unwrap_or("");
    raw.trim()
        .parse::<u64>()
        .map_err(|_| BcftoolsStatsParseError::FieldType {
            path: path.to_path_buf(),
            line: record.line_number,
            field: label,
            value: raw.to_string(),
        })
}
