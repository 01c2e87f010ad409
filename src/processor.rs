// ==============================================================================
// processor.rs - Batch QC Processing
// ==============================================================================
// Description: Loads every listed sample from a result directory and runs the
//              QC decision engine over them
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{load_sample_list, ConfigError, QcThresholds};
use crate::output::{FailedSample, SampleSummary};
use crate::parsers::IdxstatsParser;
use crate::qc::{DecisionTable, MissingInputPolicy, QcEngine, QcError};
use crate::sample::{Sample, SampleError, SampleLayout};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Sample '{sample}' failed: {source}")]
    Sample {
        sample: String,
        #[source]
        source: SampleError,
    },

    #[error(transparent)]
    Qc(#[from] QcError),
}

/// Outcome of loading one sample
#[derive(Debug)]
pub struct SampleResult {
    pub sample: String,
    pub result: Result<Sample, SampleError>,
}

pub struct QcProcessor {
    layout: SampleLayout,
    idxstats_parser: IdxstatsParser,
}

impl QcProcessor {
    pub fn new(result_dir: PathBuf, idxstats_parser: IdxstatsParser) -> Self {
        Self {
            layout: SampleLayout::new(result_dir),
            idxstats_parser,
        }
    }

    pub fn layout(&self) -> &SampleLayout {
        &self.layout
    }

    /// Load each sample independently; results follow `samples` order
    pub fn load_samples(&self, samples: &[String]) -> Vec<SampleResult> {
        info!("Loading {} samples from {:?}", samples.len(), self.layout.result_dir());

        samples
            .iter()
            .map(|sample| {
                debug!("Loading sample {}", sample);
                SampleResult {
                    sample: sample.clone(),
                    result: Sample::load(&self.layout, sample, &self.idxstats_parser),
                }
            })
            .collect()
    }

    /// Parse every sample in the list into a summary.
    ///
    /// With `keep_going`, malformed samples are recorded in the summary
    /// instead of aborting.
    pub fn summarize(&self, sample_list: &Path, keep_going: bool) -> Result<SampleSummary, ProcessError> {
        let samples = load_sample_list(sample_list)?;

        let mut loaded = Vec::new();
        let mut failed = Vec::new();

        for SampleResult { sample, result } in self.load_samples(&samples) {
            match result {
                Ok(parsed) => loaded.push(parsed),
                Err(e) if keep_going => {
                    warn!("Skipping sample {}: {}", sample, e);
                    failed.push(FailedSample {
                        sample,
                        error: e.to_string(),
                    });
                }
                Err(source) => return Err(ProcessError::Sample { sample, source }),
            }
        }

        info!(
            "Summary complete: {} samples loaded, {} failed",
            loaded.len(),
            failed.len()
        );

        Ok(SampleSummary::new(self.layout.result_dir(), loaded, failed))
    }

    /// Run the QC decision engine over every sample in the list.
    ///
    /// Only the coverage-metrics files are read, so malformed idxstats,
    /// flagstat or variant statistics never affect the decision. A malformed
    /// coverage-metrics file aborts the run whatever the policy; the policy
    /// only covers absent coverage. The table is only returned when every
    /// sample has been decided.
    pub fn filter(
        &self,
        sample_list: &Path,
        thresholds: QcThresholds,
        policy: MissingInputPolicy,
    ) -> Result<DecisionTable, ProcessError> {
        let samples = load_sample_list(sample_list)?;
        info!("Running QC filter on {} samples (policy: {:?})", samples.len(), policy);

        let coverage = samples
            .iter()
            .map(|sample| {
                debug!("Loading coverage for sample {}", sample);
                Sample::load_coverage(&self.layout, sample).map_err(|source| ProcessError::Sample {
                    sample: sample.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let engine = QcEngine::new(thresholds, policy);
        let table = engine.decision_table(samples.iter().map(String::as_str).zip(&coverage))?;

        Ok(table)
    }
}
