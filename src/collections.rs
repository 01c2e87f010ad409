// ==============================================================================
// collections.rs - Per-Sample Metric Collections
// ==============================================================================
// Description: Region-keyed collections of coverage and variant metrics
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use serde::Serialize;

use crate::models::{CoverageMetrics, VariantStats};
use crate::region::Region;

/// Coverage metrics for one sample, in region configuration order.
///
/// May hold a subset of the configured regions: a region whose metrics file
/// was absent simply has no entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CoverageMetricsCollection {
    metrics: Vec<CoverageMetrics>,
}

impl CoverageMetricsCollection {
    pub fn new(metrics: Vec<CoverageMetrics>) -> Self {
        Self { metrics }
    }

    /// Metrics describing `region`; chrX ploidy aliases resolve to chrX-nonPAR
    pub fn get(&self, region: Region) -> Option<&CoverageMetrics> {
        let region = region.coverage_region();
        self.metrics.iter().find(|m| m.region == region)
    }

    pub fn mean_coverage(&self, region: Region) -> Option<f64> {
        self.get(region).map(|m| m.coverage_stats.mean)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CoverageMetrics> {
        self.metrics.iter()
    }

    pub fn regions(&self) -> Vec<Region> {
        self.metrics.iter().map(|m| m.region).collect()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

/// Variant statistics for one sample, in region configuration order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct VariantStatsCollection {
    stats: Vec<VariantStats>,
}

impl VariantStatsCollection {
    pub fn new(stats: Vec<VariantStats>) -> Self {
        Self { stats }
    }

    pub fn get(&self, region: Region) -> Option<&VariantStats> {
        self.stats.iter().find(|s| s.region == region)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariantStats> {
        self.stats.iter()
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}
