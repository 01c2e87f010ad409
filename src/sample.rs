// ==============================================================================
// sample.rs - Per-Sample Result Loading
// ==============================================================================
// Description: Locates and parses every metrics file produced for one sample
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Layout, relative to <result_dir>/<sample>/:
//   <sample>.cram.<region>.wgs_metrics            coverage metrics
//   <sample>.cram.idxstats                        per-reference counts
//   <sample>.cram.flagstat                        alignment categories
//   <sample>.<region>.g.vcf.gz.bcftools-stats     variant statistics
// ==============================================================================

use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::collections::{CoverageMetricsCollection, VariantStatsCollection};
use crate::models::{Flagstat, Idxstats};
use crate::parsers::{
    BcftoolsStatsParseError, BcftoolsStatsParser, FlagstatParseError, FlagstatParser,
    IdxstatsParseError, IdxstatsParser, WgsMetricsParseError, WgsMetricsParser,
};
use crate::region::Region;

/// Errors that can occur while loading one sample's results
#[derive(Error, Debug)]
pub enum SampleError {
    #[error(transparent)]
    WgsMetrics(#[from] WgsMetricsParseError),

    #[error(transparent)]
    BcftoolsStats(#[from] BcftoolsStatsParseError),

    #[error(transparent)]
    Flagstat(#[from] FlagstatParseError),

    #[error("{}: {source}", .path.display())]
    Idxstats {
        path: PathBuf,
        #[source]
        source: IdxstatsParseError,
    },
}

/// File naming convention of a workflow result directory
#[derive(Debug, Clone)]
pub struct SampleLayout {
    result_dir: PathBuf,
}

impl SampleLayout {
    pub fn new(result_dir: impl Into<PathBuf>) -> Self {
        Self {
            result_dir: result_dir.into(),
        }
    }

    pub fn result_dir(&self) -> &Path {
        &self.result_dir
    }

    pub fn sample_dir(&self, sample: &str) -> PathBuf {
        self.result_dir.join(sample)
    }

    pub fn wgs_metrics(&self, sample: &str, region: Region) -> PathBuf {
        self.sample_dir(sample)
            .join(format!("{}.cram.{}.wgs_metrics", sample, region.coverage_region().id()))
    }

    pub fn idxstats(&self, sample: &str) -> PathBuf {
        self.sample_dir(sample).join(format!("{}.cram.idxstats", sample))
    }

    pub fn flagstat(&self, sample: &str) -> PathBuf {
        self.sample_dir(sample).join(format!("{}.cram.flagstat", sample))
    }

    pub fn bcftools_stats(&self, sample: &str, region: Region) -> PathBuf {
        self.sample_dir(sample)
            .join(format!("{}.{}.g.vcf.gz.bcftools-stats", sample, region.id()))
    }
}

/// Everything parsed for one sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub name: String,
    pub coverage: CoverageMetricsCollection,
    pub variants: VariantStatsCollection,
    /// `None` when the sample has no idxstats file
    pub idxstats: Option<Idxstats>,
    /// `None` when the sample has no flagstat file
    pub flagstat: Option<Flagstat>,
}

impl Sample {
    /// Load every metrics file of `name` found under the layout.
    ///
    /// Absent files leave gaps; the first malformed file fails the sample.
    pub fn load(
        layout: &SampleLayout,
        name: &str,
        idxstats_parser: &IdxstatsParser,
    ) -> Result<Self, SampleError> {
        if !layout.sample_dir(name).is_dir() {
            warn!("No result directory for sample {}: {:?}", name, layout.sample_dir(name));
        }

        let coverage = Self::load_coverage(layout, name)?;

        let mut variants = Vec::new();
        for region in Region::VARIANT_CALLING {
            if let Some(stats) =
                BcftoolsStatsParser::parse(layout.bcftools_stats(name, region), region)?
            {
                variants.push(stats);
            }
        }

        let idxstats = load_idxstats(&layout.idxstats(name), idxstats_parser)?;
        let flagstat = load_flagstat(&layout.flagstat(name))?;

        debug!(
            "Loaded sample {}: {} coverage regions, {} variant regions",
            name,
            coverage.len(),
            variants.len()
        );

        Ok(Self {
            name: name.to_string(),
            coverage,
            variants: VariantStatsCollection::new(variants),
            idxstats,
            flagstat,
        })
    }

    /// Load only the coverage-metrics files of `name`
    pub fn load_coverage(layout: &SampleLayout, name: &str) -> Result<CoverageMetricsCollection, SampleError> {
        let mut coverage = Vec::new();
        for region in Region::COVERAGE {
            if let Some(metrics) = WgsMetricsParser::parse(layout.wgs_metrics(name, region), region)? {
                coverage.push(metrics);
            }
        }
        Ok(CoverageMetricsCollection::new(coverage))
    }
}

fn load_idxstats(path: &Path, parser: &IdxstatsParser) -> Result<Option<Idxstats>, SampleError> {
    match parser.parse(path) {
        Ok(idxstats) => Ok(Some(idxstats)),
        Err(IdxstatsParseError::CsvError(e)) if is_not_found(&e) => {
            debug!("No idxstats at {:?}", path);
            Ok(None)
        }
        Err(source) => Err(SampleError::Idxstats {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn load_flagstat(path: &Path) -> Result<Option<Flagstat>, SampleError> {
    match FlagstatParser::parse(path) {
        Ok(flagstat) => Ok(Some(flagstat)),
        Err(FlagstatParseError::IoError { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            debug!("No flagstat at {:?}", path);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn is_not_found(error: &csv::Error) -> bool {
    matches!(error.kind(), csv::ErrorKind::Io(e) if e.kind() == io::ErrorKind::NotFound)
}
