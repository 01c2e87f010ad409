// ==============================================================================
// qc.rs - QC Decision Engine
// ==============================================================================
// Description: Coverage filter and sex estimation verdicts per sample
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Verdicts:
//   coverage_filter  PASS if min <= autosome mean <= max, else FAIL
//   estimated_sex    (chrX / autosome, chrY / autosome) tested against the
//                    MALE rectangle first, then FEMALE, else OTHER
// ==============================================================================

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::collections::CoverageMetricsCollection;
use crate::config::QcThresholds;
use crate::region::Region;

/// Errors that prevent a verdict from being computed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QcError {
    #[error("Sample '{sample}': no coverage metrics for {region}")]
    MissingCoverage { sample: String, region: Region },

    #[error("Sample '{sample}': autosome mean coverage {mean} cannot normalise chrX/chrY")]
    NonPositiveAutosomeCoverage { sample: String, mean: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CoverageVerdict {
    Pass,
    Fail,
}

impl CoverageVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverageVerdict::Pass => "PASS",
            CoverageVerdict::Fail => "FAIL",
        }
    }
}

impl fmt::Display for CoverageVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SexVerdict {
    Male,
    Female,
    Other,
}

impl SexVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            SexVerdict::Male => "MALE",
            SexVerdict::Female => "FEMALE",
            SexVerdict::Other => "OTHER",
        }
    }
}

impl fmt::Display for SexVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when a verdict cannot be computed for a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingInputPolicy {
    /// Abort the whole table
    #[default]
    Fail,
    /// Record the verdict as NA and carry on
    ReportNa,
}

/// Coverage filter on the autosome mean; both bounds inclusive
pub fn coverage_verdict(mean: f64, thresholds: &QcThresholds) -> CoverageVerdict {
    let range = &thresholds.autosome_coverage;
    // NaN falls outside every range
    if (range.min..=range.max).contains(&mean) {
        CoverageVerdict::Pass
    } else {
        CoverageVerdict::Fail
    }
}

/// Classify normalised (chrX, chrY) coverage.
///
/// The MALE rectangle is tested first, so a point inside both configured
/// rectangles is MALE.
pub fn estimate_sex(chr_x: f64, chr_y: f64, thresholds: &QcThresholds) -> SexVerdict {
    if thresholds.male.contains(chr_x, chr_y) {
        SexVerdict::Male
    } else if thresholds.female.contains(chr_x, chr_y) {
        SexVerdict::Female
    } else {
        SexVerdict::Other
    }
}

/// chrX and chrY mean coverage divided by the autosome mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedCoverage {
    pub chr_x: f64,
    pub chr_y: f64,
}

impl NormalizedCoverage {
    pub fn from_collection(
        sample: &str,
        coverage: &CoverageMetricsCollection,
    ) -> Result<Self, QcError> {
        let autosome = autosome_mean(sample, coverage)?;
        if autosome.is_nan() || autosome <= 0.0 {
            return Err(QcError::NonPositiveAutosomeCoverage {
                sample: sample.to_string(),
                mean: autosome,
            });
        }

        let chr_x = region_mean(sample, coverage, Region::ChrXNonPar)?;
        let chr_y = region_mean(sample, coverage, Region::ChrYNonPar)?;

        Ok(Self {
            chr_x: chr_x / autosome,
            chr_y: chr_y / autosome,
        })
    }
}

fn region_mean(
    sample: &str,
    coverage: &CoverageMetricsCollection,
    region: Region,
) -> Result<f64, QcError> {
    coverage
        .mean_coverage(region)
        .ok_or_else(|| QcError::MissingCoverage {
            sample: sample.to_string(),
            region,
        })
}

fn autosome_mean(sample: &str, coverage: &CoverageMetricsCollection) -> Result<f64, QcError> {
    region_mean(sample, coverage, Region::AutosomePar)
}

/// One row of the decision table; `None` is written as NA
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionRow {
    pub sample_id: String,
    pub coverage_filter: Option<CoverageVerdict>,
    pub estimated_sex: Option<SexVerdict>,
    /// Autosome mean coverage the coverage verdict was taken from
    pub autosome_mean_coverage: Option<f64>,
    /// Coverage the sex estimate was taken from
    pub normalized_coverage: Option<NormalizedCoverage>,
}

/// Verdicts for every sample, in sample-list order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DecisionTable {
    rows: Vec<DecisionRow>,
}

impl DecisionTable {
    pub fn rows(&self) -> &[DecisionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, sample_id: &str) -> Option<&DecisionRow> {
        self.rows.iter().find(|row| row.sample_id == sample_id)
    }
}

/// Applies thresholds to per-sample coverage
pub struct QcEngine {
    thresholds: QcThresholds,
    policy: MissingInputPolicy,
}

impl QcEngine {
    pub fn new(thresholds: QcThresholds, policy: MissingInputPolicy) -> Self {
        Self { thresholds, policy }
    }

    /// Verdicts for one sample
    pub fn decide(
        &self,
        sample: &str,
        coverage: &CoverageMetricsCollection,
    ) -> Result<DecisionRow, QcError> {
        let autosome = self.resolve(autosome_mean(sample, coverage))?;
        let normalized = self.resolve(NormalizedCoverage::from_collection(sample, coverage))?;

        if let Some(normalized) = normalized {
            debug!(
                "Sample {}: normalised chrX {:.3}, chrY {:.3}",
                sample, normalized.chr_x, normalized.chr_y
            );
        }

        Ok(DecisionRow {
            sample_id: sample.to_string(),
            coverage_filter: autosome.map(|mean| coverage_verdict(mean, &self.thresholds)),
            estimated_sex: normalized
                .map(|n| estimate_sex(n.chr_x, n.chr_y, &self.thresholds)),
            autosome_mean_coverage: autosome,
            normalized_coverage: normalized,
        })
    }

    /// Decision table over samples given in sample-list order.
    ///
    /// Under `MissingInputPolicy::Fail` the first sample without a verdict
    /// aborts the table.
    pub fn decision_table<'a, I>(&self, samples: I) -> Result<DecisionTable, QcError>
    where
        I: IntoIterator<Item = (&'a str, &'a CoverageMetricsCollection)>,
    {
        let rows = samples
            .into_iter()
            .map(|(sample, coverage)| self.decide(sample, coverage))
            .collect::<Result<Vec<_>, _>>()?;

        let failed = rows
            .iter()
            .filter(|row| row.coverage_filter == Some(CoverageVerdict::Fail))
            .count();
        info!(
            "QC decisions complete: {} samples, {} failing coverage",
            rows.len(),
            failed
        );

        Ok(DecisionTable { rows })
    }

    fn resolve<T>(&self, verdict: Result<T, QcError>) -> Result<Option<T>, QcError> {
        match (verdict, self.policy) {
            (Ok(verdict), _) => Ok(Some(verdict)),
            (Err(e), MissingInputPolicy::ReportNa) => {
                warn!("{}; reporting NA", e);
                Ok(None)
            }
            (Err(e), MissingInputPolicy::Fail) => Err(e),
        }
    }
}
