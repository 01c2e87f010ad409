// ==============================================================================
// parsers/wgs_metrics.rs - Picard CollectWgsMetrics Parser
// ==============================================================================
// Description: Parser for per-region whole-genome coverage metrics files
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Format: "##"-sectioned text (see parsers/sections.rs)
//   - untitled StringHeader sections: command log
//   - "METRICS CLASS" section: one-row table of summary metrics
//   - "HISTOGRAM" section: coverage -> high quality base count
// References:
// - https://broadinstitute.github.io/picard/picard-metric-definitions.html#WgsMetrics
// ==============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{CoverageMetrics, CoverageStats, HetSnp, PercentCoverage, PercentExcluded};
use crate::parsers::sections::{split_sections, Section, SectionError};
use crate::parsers::table::{parse_table, FieldValue, TableError, TableRow};
use crate::region::Region;

/// Type tag of free-text command log sections
pub const COMMAND_LOG_TYPE: &str = "htsjdk.samtools.metrics.StringHeader";

pub const METRICS_TITLE: &str = "METRICS CLASS";
pub const HISTOGRAM_TITLE: &str = "HISTOGRAM";

/// Errors that can occur during coverage metrics parsing
#[derive(Error, Debug)]
pub enum WgsMetricsParseError {
    #[error("Failed to read {}: {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: {source}", .path.display())]
    SectionError {
        path: PathBuf,
        #[source]
        source: SectionError,
    },

    #[error("{}: file is empty or contains no sections", .path.display())]
    NoSections { path: PathBuf },

    #[error("{}: missing '{title}' section", .path.display())]
    MissingSection { path: PathBuf, title: &'static str },

    #[error("{}: '{title}' section has no data row", .path.display())]
    EmptySection { path: PathBuf, title: &'static str },

    #[error("{}: '{title}' section: {source}", .path.display())]
    TableError {
        path: PathBuf,
        title: &'static str,
        #[source]
        source: TableError,
    },

    #[error("{}: missing field '{field}'", .path.display())]
    MissingField { path: PathBuf, field: String },

    #[error("{}: field '{field}' has invalid value '{value}'", .path.display())]
    FieldType {
        path: PathBuf,
        field: String,
        value: String,
    },

    #[error("{}: duplicate histogram coverage depth {depth}", .path.display())]
    DuplicateHistogramKey { path: PathBuf, depth: u32 },
}

/// Parser for Picard CollectWgsMetrics output
pub struct WgsMetricsParser;

impl WgsMetricsParser {
    /// Parse a coverage metrics file for one region
    ///
    /// # Returns
    /// * `Ok(Some(CoverageMetrics))` - File present and valid
    /// * `Ok(None)` - File does not exist (region not processed)
    /// * `Err(WgsMetricsParseError)` - File present but malformed
    pub fn parse(
        path: impl AsRef<Path>,
        region: Region,
    ) -> Result<Option<CoverageMetrics>, WgsMetricsParseError> {
        let path = path.as_ref();

        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No coverage metrics for {} at {:?}", region, path);
                return Ok(None);
            }
            Err(source) => {
                return Err(WgsMetricsParseError::IoError {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::parse_str(&text, path, region).map(Some)
    }

    /// Parse coverage metrics from already-loaded text
    pub fn parse_str(
        text: &str,
        path: &Path,
        region: Region,
    ) -> Result<CoverageMetrics, WgsMetricsParseError> {
        let sections = split_sections(text)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| WgsMetricsParseError::SectionError {
                path: path.to_path_buf(),
                source,
            })?;

        if sections.is_empty() {
            return Err(WgsMetricsParseError::NoSections {
                path: path.to_path_buf(),
            });
        }

        let command_log = sections
            .iter()
            .filter(|s| s.title.is_none() && s.type_tag == COMMAND_LOG_TYPE)
            .map(|s| s.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let metrics_section = find_section(&sections, METRICS_TITLE, path)?;
        let histogram_section = find_section(&sections, HISTOGRAM_TITLE, path)?;

        let fields = Fields {
            row: single_row(metrics_section, METRICS_TITLE, path)?,
            path,
        };

        let territory = fields.unsigned("genome_territory")?;

        let coverage_stats = CoverageStats {
            mean: fields.float("mean_coverage")?,
            sd: fields.float("sd_coverage")?,
            median: fields.float("median_coverage")?,
            mad: fields.float("mad_coverage")?,
        };

        let percent_excluded = PercentExcluded {
            adapter: fields.optional_float("pct_exc_adapter")?,
            mapq: fields.float("pct_exc_mapq")?,
            dupe: fields.float("pct_exc_dupe")?,
            unpaired: fields.float("pct_exc_unpaired")?,
            baseq: fields.float("pct_exc_baseq")?,
            overlap: fields.float("pct_exc_overlap")?,
            capped: fields.float("pct_exc_capped")?,
            total: fields.float("pct_exc_total")?,
        };

        let percent_coverage = fields.percent_coverage()?;

        let het_snp = HetSnp {
            sensitivity: fields.float("het_snp_sensitivity")?,
            q: fields.small_unsigned("het_snp_q")?,
        };

        let histogram = parse_histogram(histogram_section, path)?;

        let violations = percent_excluded.violations();
        if !violations.is_empty() {
            warn!(
                "{:?}: excluded fractions exceed PCT_EXC_TOTAL for {:?}",
                path, violations
            );
        }
        if !percent_coverage.is_non_increasing() {
            warn!("{:?}: PCT_NX fractions increase with depth", path);
        }

        debug!(
            "Parsed coverage metrics for {}: territory={}, mean={:.2}, {} histogram bins",
            region,
            territory,
            coverage_stats.mean,
            histogram.len()
        );

        Ok(CoverageMetrics {
            path: path.to_path_buf(),
            region,
            command_log,
            territory,
            coverage_stats,
            percent_excluded,
            percent_coverage,
            het_snp,
            histogram,
        })
    }
}

fn find_section<'s>(
    sections: &'s [Section],
    title: &'static str,
    path: &Path,
) -> Result<&'s Section, WgsMetricsParseError> {
    sections
        .iter()
        .find(|s| s.title.as_deref() == Some(title))
        .ok_or_else(|| WgsMetricsParseError::MissingSection {
            path: path.to_path_buf(),
            title,
        })
}

fn table_rows(
    section: &Section,
    title: &'static str,
    path: &Path,
) -> Result<Vec<TableRow>, WgsMetricsParseError> {
    parse_table(&section.content).map_err(|source| WgsMetricsParseError::TableError {
        path: path.to_path_buf(),
        title,
        source,
    })
}

fn single_row(
    section: &Section,
    title: &'static str,
    path: &Path,
) -> Result<TableRow, WgsMetricsParseError> {
    table_rows(section, title, path)?
        .into_iter()
        .next()
        .ok_or_else(|| WgsMetricsParseError::EmptySection {
            path: path.to_path_buf(),
            title,
        })
}

/// Depth N of a "pct_Nx" field name
fn percent_coverage_depth(field: &str) -> Option<u32> {
    let digits = field.strip_prefix("pct_")?.strip_suffix('x')?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Typed field access on one table row, errors tagged with the file path
struct Fields<'p> {
    row: TableRow,
    path: &'p Path,
}

impl Fields<'_> {
    fn value(&self, field: &str) -> Result<&FieldValue, WgsMetricsParseError> {
        self.row
            .get(field)
            .ok_or_else(|| WgsMetricsParseError::MissingField {
                path: self.path.to_path_buf(),
                field: field.to_string(),
            })
    }

    fn type_error(&self, field: &str, value: &FieldValue) -> WgsMetricsParseError {
        WgsMetricsParseError::FieldType {
            path: self.path.to_path_buf(),
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    fn float(&self, field: &str) -> Result<f64, WgsMetricsParseError> {
        let value = self.value(field)?;
        value.as_f64().ok_or_else(|| self.type_error(field, value))
    }

    fn optional_float(&self, field: &str) -> Result<Option<f64>, WgsMetricsParseError> {
        match self.row.get(field) {
            Some(_) => self.float(field).map(Some),
            None => Ok(None),
        }
    }

    fn unsigned(&self, field: &str) -> Result<u64, WgsMetricsParseError> {
        let value = self.value(field)?;
        value.as_u64().ok_or_else(|| self.type_error(field, value))
    }

    fn small_unsigned(&self, field: &str) -> Result<u32, WgsMetricsParseError> {
        let value = self.value(field)?;
        value
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| self.type_error(field, value))
    }

    fn percent_coverage(&self) -> Result<PercentCoverage, WgsMetricsParseError> {
        let mut fractions = BTreeMap::new();
        for (field, value) in self.row.iter() {
            if let Some(depth) = percent_coverage_depth(field) {
                let fraction = value.as_f64().ok_or_else(|| self.type_error(field, value))?;
                fractions.insert(depth, fraction);
            }
        }
        Ok(PercentCoverage::new(fractions))
    }
}

fn parse_histogram(
    section: &Section,
    path: &Path,
) -> Result<BTreeMap<u32, u64>, WgsMetricsParseError> {
    let mut histogram = BTreeMap::new();

    for row in table_rows(section, HISTOGRAM_TITLE, path)? {
        let fields = Fields { row, path };
        let depth = fields.small_unsigned("coverage")?;
        let count = fields.unsigned("high_quality_coverage_count")?;

        if histogram.insert(depth, count).is_some() {
            return Err(WgsMetricsParseError::DuplicateHistogramKey {
                path: path.to_path_buf(),
                depth,
            });
        }
    }

    Ok(histogram)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "GENOME_TERRITORY\tMEAN_COVERAGE\tSD_COVERAGE\tMEDIAN_COVERAGE\tMAD_COVERAGE\t\
PCT_EXC_ADAPTER\tPCT_EXC_MAPQ\tPCT_EXC_DUPE\tPCT_EXC_UNPAIRED\tPCT_EXC_BASEQ\tPCT_EXC_OVERLAP\t\
PCT_EXC_CAPPED\tPCT_EXC_TOTAL\tPCT_1X\tPCT_5X\tPCT_10X\tPCT_20X\tPCT_30X\tPCT_100X\t\
FOLD_80_BASE_PENALTY\tHET_SNP_SENSITIVITY\tHET_SNP_Q";

    const VALUES: &str = "2745186691\t30.123456\t8.1\t30\t5\t\
0.000012\t0.021\t0.08\t0.001\t0.003\t0.012\t\
0.0004\t0.117\t0.99\t0.985\t0.98\t0.95\t0.6\t0.0001\t\
?\t0.97\t15";

    /// Create Picard CollectWgsMetrics output from a metrics header/value pair
    fn wgs_metrics_text(header: &str, values: &str, histogram: &str) -> String {
        format!(
            "## htsjdk.samtools.metrics.StringHeader\n\
# CollectWgsMetrics INPUT=sample.cram OUTPUT=sample.wgs_metrics\n\
## htsjdk.samtools.metrics.StringHeader\n\
# Started on: Mon Jan 01 00:00:00 UTC 2024\n\
\n\
## METRICS CLASS\tpicard.analysis.WgsMetrics\n\
{header}\n\
{values}\n\
\n\
\n\
## HISTOGRAM\tjava.lang.Integer\n\
coverage\thigh_quality_coverage_count\n\
{histogram}\n"
        )
    }

    fn create_test_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn parse_text(text: &str) -> Result<CoverageMetrics, WgsMetricsParseError> {
        WgsMetricsParser::parse_str(text, Path::new("sample.wgs_metrics"), Region::AutosomePar)
    }

    #[test]
    fn test_parse_valid_file() {
        let text = wgs_metrics_text(HEADER, VALUES, "0\t1000\n1\t2000\n2\t3000");
        let file = create_test_file(&text);

        let metrics = WgsMetricsParser::parse(file.path(), Region::ChrXNonPar)
            .unwrap()
            .unwrap();

        assert_eq!(metrics.path, file.path());
        assert_eq!(metrics.region, Region::ChrXNonPar);
        assert_eq!(
            metrics.command_log,
            "# CollectWgsMetrics INPUT=sample.cram OUTPUT=sample.wgs_metrics\n\
# Started on: Mon Jan 01 00:00:00 UTC 2024"
        );
        assert_eq!(metrics.territory, 2745186691);

        assert!((metrics.coverage_stats.mean - 30.123456).abs() < 1e-9);
        assert_eq!(metrics.coverage_stats.sd, 8.1);
        assert_eq!(metrics.coverage_stats.median, 30.0);
        assert_eq!(metrics.coverage_stats.mad, 5.0);

        assert_eq!(metrics.percent_excluded.adapter, Some(0.000012));
        assert_eq!(metrics.percent_excluded.dupe, 0.08);
        assert_eq!(metrics.percent_excluded.total, 0.117);

        assert_eq!(metrics.percent_coverage.len(), 6);
        assert_eq!(metrics.percent_coverage.get(1), Some(0.99));
        assert_eq!(metrics.percent_coverage.get(100), Some(0.0001));
        assert!(metrics.percent_coverage.is_non_increasing());

        assert_eq!(metrics.het_snp.sensitivity, 0.97);
        assert_eq!(metrics.het_snp.q, 15);

        assert_eq!(metrics.histogram.len(), 3);
        assert_eq!(metrics.histogram[&2], 3000);
    }

    #[test]
    fn test_missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let result = WgsMetricsParser::parse(dir.path().join("none.wgs_metrics"), Region::AutosomePar);
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_empty_file() {
        match parse_text("\n\n").unwrap_err() {
            WgsMetricsParseError::NoSections { .. } => {}
            other => panic!("Expected NoSections error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_histogram_section() {
        let text = format!(
            "## METRICS CLASS\tpicard.analysis.WgsMetrics\n{}\n{}\n",
            HEADER, VALUES
        );
        match parse_text(&text).unwrap_err() {
            WgsMetricsParseError::MissingSection { title, .. } => assert_eq!(title, "HISTOGRAM"),
            other => panic!("Expected MissingSection error, got {:?}", other),
        }
    }

    #[test]
    fn test_metrics_title_is_case_sensitive() {
        let text = wgs_metrics_text(HEADER, VALUES, "0\t1").replace("METRICS CLASS", "metrics class");
        match parse_text(&text).unwrap_err() {
            WgsMetricsParseError::MissingSection { title, .. } => assert_eq!(title, "METRICS CLASS"),
            other => panic!("Expected MissingSection error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_histogram_depth() {
        let text = wgs_metrics_text(HEADER, VALUES, "0\t1000\n1\t2000\n1\t2500");
        match parse_text(&text).unwrap_err() {
            WgsMetricsParseError::DuplicateHistogramKey { depth, .. } => assert_eq!(depth, 1),
            other => panic!("Expected DuplicateHistogramKey error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_coverage_is_field_error() {
        let values = VALUES.replacen("30.123456", "unknown", 1);
        let text = wgs_metrics_text(HEADER, &values, "0\t1");
        match parse_text(&text).unwrap_err() {
            WgsMetricsParseError::FieldType { field, value, .. } => {
                assert_eq!(field, "mean_coverage");
                assert_eq!(value, "unknown");
            }
            other => panic!("Expected FieldType error, got {:?}", other),
        }
    }

    #[test]
    fn test_fractional_territory_is_field_error() {
        let values = VALUES.replacen("2745186691", "2745186691.5", 1);
        let text = wgs_metrics_text(HEADER, &values, "0\t1");
        match parse_text(&text).unwrap_err() {
            WgsMetricsParseError::FieldType { field, .. } => assert_eq!(field, "genome_territory"),
            other => panic!("Expected FieldType error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_field() {
        let header = HEADER.replace("PCT_EXC_TOTAL", "PCT_EXC_OTHER");
        let text = wgs_metrics_text(&header, VALUES, "0\t1");
        match parse_text(&text).unwrap_err() {
            WgsMetricsParseError::MissingField { field, .. } => assert_eq!(field, "pct_exc_total"),
            other => panic!("Expected MissingField error, got {:?}", other),
        }
    }

    #[test]
    fn test_adapter_column_optional() {
        let header = HEADER.replace("PCT_EXC_ADAPTER\t", "");
        let values = VALUES.replacen("0.000012\t", "", 1);
        let text = wgs_metrics_text(&header, &values, "0\t1");
        let metrics = parse_text(&text).unwrap();
        assert_eq!(metrics.percent_excluded.adapter, None);
        assert_eq!(metrics.percent_excluded.mapq, 0.021);
    }

    #[test]
    fn test_malformed_metrics_row() {
        let text = wgs_metrics_text(HEADER, "2745186691\t30.1", "0\t1");
        match parse_text(&text).unwrap_err() {
            WgsMetricsParseError::TableError { title, source: TableError::MalformedRow { row, .. }, .. } => {
                assert_eq!(title, "METRICS CLASS");
                assert_eq!(row, 1);
            }
            other => panic!("Expected TableError error, got {:?}", other),
        }
    }

    #[test]
    fn test_metrics_without_data_row() {
        let text = format!(
            "## METRICS CLASS\tpicard.analysis.WgsMetrics\n{}\n## HISTOGRAM\tjava.lang.Integer\ncoverage\thigh_quality_coverage_count\n",
            HEADER
        );
        match parse_text(&text).unwrap_err() {
            WgsMetricsParseError::EmptySection { title, .. } => assert_eq!(title, "METRICS CLASS"),
            other => panic!("Expected EmptySection error, got {:?}", other),
        }
    }

    #[test]
    fn test_percent_coverage_depth() {
        assert_eq!(percent_coverage_depth("pct_15x"), Some(15));
        assert_eq!(percent_coverage_depth("pct_x"), None);
        assert_eq!(percent_coverage_depth("pct_exc_mapq"), None);
        assert_eq!(percent_coverage_depth("pct_1x_extra"), None);
    }
}
