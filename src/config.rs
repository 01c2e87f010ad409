// ==============================================================================
// config.rs - QC Configuration Loading
// ==============================================================================
// Description: QC thresholds and sample list documents (YAML)
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Thresholds example:
//   autosome_coverage: { min: 10.0, max: 60.0 }
//   male:   { chrX_range: [0.4, 0.6], chrY_range: [0.4, 0.6] }
//   female: { chrX_range: [0.9, 1.1], chrY_range: [0.0, 0.05] }
// Sample list example:
//   - NA12878
//   - NA12891
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading configuration documents
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid YAML in {}: {source}", .path.display())]
    YamlError {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid range for {key}: [{min}, {max}]")]
    InvalidRange { key: String, min: f64, max: f64 },

    #[error("Sample list {} is empty", .path.display())]
    EmptySampleList { path: PathBuf },

    #[error("Sample '{sample}' listed twice in {}", .path.display())]
    DuplicateSample { path: PathBuf, sample: String },

    #[error("Invalid sample name '{sample}' in {}", .path.display())]
    InvalidSampleName { path: PathBuf, sample: String },
}

/// Inclusive [min, max] range, written as a two-element sequence
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl From<[f64; 2]> for Interval {
    fn from([min, max]: [f64; 2]) -> Self {
        Self { min, max }
    }
}

impl From<Interval> for [f64; 2] {
    fn from(interval: Interval) -> Self {
        [interval.min, interval.max]
    }
}

impl Interval {
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    fn validate(&self, key: &str) -> Result<(), ConfigError> {
        if self.min.is_finite() && self.max.is_finite() && self.min <= self.max {
            Ok(())
        } else {
            Err(ConfigError::InvalidRange {
                key: key.to_string(),
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Acceptable autosome mean coverage
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CoverageRange {
    pub min: f64,
    pub max: f64,
}

/// Rectangle in (normalized chrX, normalized chrY) coverage space
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SexBounds {
    #[serde(rename = "chrX_range")]
    pub chr_x_range: Interval,
    #[serde(rename = "chrY_range")]
    pub chr_y_range: Interval,
}

impl SexBounds {
    pub fn contains(&self, chr_x: f64, chr_y: f64) -> bool {
        self.chr_x_range.contains(chr_x) && self.chr_y_range.contains(chr_y)
    }
}

/// QC decision thresholds
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QcThresholds {
    pub autosome_coverage: CoverageRange,
    pub male: SexBounds,
    pub female: SexBounds,
}

impl QcThresholds {
    /// Load and validate thresholds from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = read_config(path)?;
        Self::from_yaml(&text, path)
    }

    /// Parse and validate thresholds; `path` is used for error reporting
    pub fn from_yaml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let thresholds: QcThresholds =
            serde_yaml::from_str(text).map_err(|source| ConfigError::YamlError {
                path: path.to_path_buf(),
                source,
            })?;
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Interval {
            min: self.autosome_coverage.min,
            max: self.autosome_coverage.max,
        }
        .validate("autosome_coverage")?;
        self.male.chr_x_range.validate("male.chrX_range")?;
        self.male.chr_y_range.validate("male.chrY_range")?;
        self.female.chr_x_range.validate("female.chrX_range")?;
        self.female.chr_y_range.validate("female.chrY_range")?;
        Ok(())
    }
}

/// Load the ordered list of sample identifiers
pub fn load_sample_list(path: impl AsRef<Path>) -> Result<Vec<String>, ConfigError> {
    let path = path.as_ref();
    let text = read_config(path)?;
    parse_sample_list(&text, path)
}

/// Parse a YAML sequence of sample identifiers; `path` is used for error reporting
pub fn parse_sample_list(text: &str, path: &Path) -> Result<Vec<String>, ConfigError> {
    if text.trim().is_empty() {
        return Err(ConfigError::EmptySampleList {
            path: path.to_path_buf(),
        });
    }

    let samples: Vec<String> =
        serde_yaml::from_str(text).map_err(|source| ConfigError::YamlError {
            path: path.to_path_buf(),
            source,
        })?;

    if samples.is_empty() {
        return Err(ConfigError::EmptySampleList {
            path: path.to_path_buf(),
        });
    }

    let mut seen = HashSet::new();
    for sample in &samples {
        // Sample names become directory names
        if sample.trim().is_empty()
            || sample.contains(|c: char| c == '/' || c == '\\')
            || sample == "."
            || sample == ".."
        {
            return Err(ConfigError::InvalidSampleName {
                path: path.to_path_buf(),
                sample: sample.clone(),
            });
        }
        if !seen.insert(sample.as_str()) {
            return Err(ConfigError::DuplicateSample {
                path: path.to_path_buf(),
                sample: sample.clone(),
            });
        }
    }

    Ok(samples)
}

fn read_config(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::IoError {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLDS: &str = "\
autosome_coverage:
  min: 10.0
  max: 60.0
male:
  chrX_range: [0.4, 0.6]
  chrY_range: [0.4, 0.6]
female:
  chrX_range: [0.9, 1.1]
  chrY_range: [0.0, 0.05]
";

    fn parse(text: &str) -> Result<QcThresholds, ConfigError> {
        QcThresholds::from_yaml(text, Path::new("qc.yaml"))
    }

    #[test]
    fn test_parse_thresholds() {
        let thresholds = parse(THRESHOLDS).unwrap();

        assert_eq!(thresholds.autosome_coverage.min, 10.0);
        assert_eq!(thresholds.autosome_coverage.max, 60.0);
        assert_eq!(thresholds.male.chr_x_range, Interval { min: 0.4, max: 0.6 });
        assert_eq!(thresholds.female.chr_y_range, Interval { min: 0.0, max: 0.05 });
    }

    #[test]
    fn test_integer_bounds_accepted() {
        let text = THRESHOLDS.replace("min: 10.0", "min: 10");
        assert_eq!(parse(&text).unwrap().autosome_coverage.min, 10.0);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let text = THRESHOLDS.replace("chrX_range: [0.9, 1.1]", "chrX_range: [1.1, 0.9]");
        match parse(&text).unwrap_err() {
            ConfigError::InvalidRange { key, .. } => assert_eq!(key, "female.chrX_range"),
            other => panic!("Expected InvalidRange error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_key_rejected() {
        let text = format!("{}unexpected: 1\n", THRESHOLDS);
        match parse(&text).unwrap_err() {
            ConfigError::YamlError { .. } => {}
            other => panic!("Expected YamlError error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_key_rejected() {
        let text = THRESHOLDS.replace("  chrY_range: [0.0, 0.05]\n", "");
        assert!(matches!(parse(&text), Err(ConfigError::YamlError { .. })));
    }

    #[test]
    fn test_interval_is_inclusive() {
        let interval = Interval { min: 0.4, max: 0.6 };
        assert!(interval.contains(0.4));
        assert!(interval.contains(0.6));
        assert!(!interval.contains(0.61));
    }

    #[test]
    fn test_missing_thresholds_file() {
        let dir = tempfile::tempdir().unwrap();
        match QcThresholds::load(dir.path().join("qc.yaml")).unwrap_err() {
            ConfigError::NotFound { .. } => {}
            other => panic!("Expected NotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_sample_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.yaml");
        std::fs::write(&path, "- NA12878\n- NA12891\n- '0042'\n").unwrap();

        let samples = load_sample_list(&path).unwrap();
        assert_eq!(samples, vec!["NA12878", "NA12891", "0042"]);
    }

    #[test]
    fn test_empty_sample_list() {
        match parse_sample_list("", Path::new("samples.yaml")).unwrap_err() {
            ConfigError::EmptySampleList { .. } => {}
            other => panic!("Expected EmptySampleList error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_sample() {
        match parse_sample_list("- a\n- b\n- a\n", Path::new("samples.yaml")).unwrap_err() {
            ConfigError::DuplicateSample { sample, .. } => assert_eq!(sample, "a"),
            other => panic!("Expected DuplicateSample error, got {:?}", other),
        }
    }

    #[test]
    fn test_path_like_sample_rejected() {
        match parse_sample_list("- ../etc\n", Path::new("samples.yaml")).unwrap_err() {
            ConfigError::InvalidSampleName { sample, .. } => assert_eq!(sample, "../etc"),
            other => panic!("Expected InvalidSampleName error, got {:?}", other),
        }
    }
}
