// ==============================================================================
// output.rs - QC Output Generation
// ==============================================================================
// Description: Decision table, mean coverage table (TSV) and sample summary
//              (JSON) writers
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Decision table:
//   sample_id    coverage_filter    estimated_sex
//   NA12878      PASS               FEMALE
//   NA12891      FAIL               NA
//
// Mean coverage table:
//   sample_id    autosome-PAR_mean_coverage    chrX-nonPAR_normalized_mean_coverage    ...
//   NA12878      30.000000                     1.000000                                ...
// ==============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::qc::DecisionTable;
use crate::region::Region;
use crate::sample::Sample;

/// Default decision table file name inside the result directory
pub const DECISION_TABLE_FILE: &str = "qc.tsv";

pub const DECISION_TABLE_HEADER: [&str; 3] = ["sample_id", "coverage_filter", "estimated_sex"];

/// Written next to the decision table
pub const MEAN_COVERAGE_TABLE_FILE: &str = "mean_coverage.tsv";

/// Written in place of a verdict that could not be computed
pub const MISSING_VALUE: &str = "NA";

/// A sample that could not be loaded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedSample {
    pub sample: String,
    pub error: String,
}

/// Read-only export of every parsed sample
#[derive(Debug, Serialize)]
pub struct SampleSummary {
    pub generated_at: DateTime<Utc>,
    pub version: String,
    pub result_dir: PathBuf,
    /// Loaded samples in sample-list order
    pub samples: Vec<Sample>,
    /// Samples skipped because their results were malformed
    pub failed: Vec<FailedSample>,
}

impl SampleSummary {
    pub fn new(result_dir: impl Into<PathBuf>, samples: Vec<Sample>, failed: Vec<FailedSample>) -> Self {
        Self {
            generated_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            result_dir: result_dir.into(),
            samples,
            failed,
        }
    }
}

/// Render the decision table as tab-separated text
pub fn render_decision_table(table: &DecisionTable) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(Vec::new());

    writer
        .write_record(DECISION_TABLE_HEADER)
        .context("Failed to write decision table header")?;

    for row in table.rows() {
        let coverage = row.coverage_filter.map_or(MISSING_VALUE, |v| v.as_str());
        let sex = row.estimated_sex.map_or(MISSING_VALUE, |v| v.as_str());
        writer
            .write_record([row.sample_id.as_str(), coverage, sex])
            .with_context(|| format!("Failed to write decision row for {}", row.sample_id))?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush decision table: {}", e.error()))
}

fn mean_coverage_header() -> Vec<String> {
    vec![
        "sample_id".to_string(),
        format!("{}_mean_coverage", Region::AutosomePar.id()),
        format!("{}_normalized_mean_coverage", Region::ChrXNonPar.id()),
        format!("{}_normalized_mean_coverage", Region::ChrYNonPar.id()),
    ]
}

fn format_coverage(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING_VALUE.to_string(), |v| format!("{:.6}", v))
}

/// Render the coverage each decision was taken from as tab-separated text
pub fn render_mean_coverage_table(table: &DecisionTable) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(Vec::new());

    writer
        .write_record(mean_coverage_header())
        .context("Failed to write mean coverage header")?;

    for row in table.rows() {
        writer
            .write_record([
                row.sample_id.clone(),
                format_coverage(row.autosome_mean_coverage),
                format_coverage(row.normalized_coverage.map(|n| n.chr_x)),
                format_coverage(row.normalized_coverage.map(|n| n.chr_y)),
            ])
            .with_context(|| format!("Failed to write mean coverage row for {}", row.sample_id))?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush mean coverage table: {}", e.error()))
}

/// Write the mean coverage table; the file appears complete or not at all
pub fn write_mean_coverage_table(path: &Path, table: &DecisionTable) -> Result<PathBuf> {
    info!("Writing mean coverage table: {:?}", path);

    let contents = render_mean_coverage_table(table)?;
    write_atomic(path, &contents)?;

    Ok(path.to_path_buf())
}

/// Write the decision table; the file appears complete or not at all
pub fn write_decision_table(path: &Path, table: &DecisionTable) -> Result<PathBuf> {
    info!("Writing decision table: {:?}", path);

    let contents = render_decision_table(table)?;
    write_atomic(path, &contents)?;

    info!("Decision table complete: {} samples", table.len());
    Ok(path.to_path_buf())
}

/// Write the sample summary as pretty JSON
pub fn write_summary(path: &Path, summary: &SampleSummary) -> Result<PathBuf> {
    info!("Generating JSON summary: {:?}", path);

    let contents = serde_json::to_vec_pretty(summary).context("Failed to serialize sample summary")?;
    write_atomic(path, &contents)?;

    info!(
        "JSON summary complete: {} samples, {} failed",
        summary.samples.len(),
        summary.failed.len()
    );
    Ok(path.to_path_buf())
}

/// Write to a sibling temporary file, then rename over `path`
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .with_context(|| format!("Output path has no file name: {:?}", path))?;
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    fs::write(&tmp_path, contents)
        .with_context(|| format!("Failed to write temporary output {:?}", tmp_path))?;

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e).with_context(|| format!("Failed to move output into place at {:?}", path));
    }

    Ok(())
}
