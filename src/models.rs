// ==============================================================================
// models.rs - Per-Sample QC Data Models
// ==============================================================================
// Description: Typed records parsed from alignment, coverage and variant metrics
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::region::Region;

/// Coverage distribution summary for one region
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoverageStats {
    pub mean: f64,
    pub sd: f64,
    pub median: f64,
    /// Median absolute deviation
    pub mad: f64,
}

/// Fraction of aligned bases excluded from coverage, by filter
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentExcluded {
    /// Not reported by older Picard releases
    pub adapter: Option<f64>,
    pub mapq: f64,
    pub dupe: f64,
    pub unpaired: f64,
    pub baseq: f64,
    pub overlap: f64,
    pub capped: f64,
    pub total: f64,
}

impl PercentExcluded {
    /// Individual filters whose fraction exceeds the reported total
    pub fn violations(&self) -> Vec<&'static str> {
        let mut fields = vec![
            ("mapq", self.mapq),
            ("dupe", self.dupe),
            ("unpaired", self.unpaired),
            ("baseq", self.baseq),
            ("overlap", self.overlap),
            ("capped", self.capped),
        ];
        if let Some(adapter) = self.adapter {
            fields.insert(0, ("adapter", adapter));
        }

        fields
            .into_iter()
            .filter(|(_, value)| *value > self.total)
            .map(|(name, _)| name)
            .collect()
    }
}

/// Fraction of bases covered at least N-fold, keyed by N
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PercentCoverage(BTreeMap<u32, f64>);

impl PercentCoverage {
    pub fn new(fractions: BTreeMap<u32, f64>) -> Self {
        Self(fractions)
    }

    pub fn get(&self, depth: u32) -> Option<f64> {
        self.0.get(&depth).copied()
    }

    /// Iterate (depth, fraction) pairs in increasing depth order
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.0.iter().map(|(depth, fraction)| (*depth, *fraction))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fractions never increase as the depth threshold increases
    pub fn is_non_increasing(&self) -> bool {
        self.0
            .values()
            .zip(self.0.values().skip(1))
            .all(|(shallower, deeper)| deeper <= shallower)
    }
}

/// Heterozygous SNP detection sensitivity
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HetSnp {
    pub sensitivity: f64,
    /// Phred-scaled sensitivity
    pub q: u32,
}

/// Whole-genome coverage metrics for one sample and region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageMetrics {
    pub path: PathBuf,
    pub region: Region,
    /// Command line and run information recorded by the metrics tool
    pub command_log: String,
    /// Genome territory in base pairs
    pub territory: u64,
    pub coverage_stats: CoverageStats,
    pub percent_excluded: PercentExcluded,
    pub percent_coverage: PercentCoverage,
    pub het_snp: HetSnp,
    /// Coverage depth -> number of high quality bases
    pub histogram: BTreeMap<u32, u64>,
}

/// Read counts for one reference sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChromosomeCounts {
    /// Reference sequence name ("chr1", "chrX", ...)
    pub name: String,
    pub length: u64,
    pub mapped: u64,
    pub unmapped: u64,
}

/// Per-reference alignment counts for one sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Idxstats {
    pub path: PathBuf,
    /// Target references in allow-list order
    pub chromosomes: Vec<ChromosomeCounts>,
}

impl Idxstats {
    pub fn get(&self, name: &str) -> Option<&ChromosomeCounts> {
        self.chromosomes.iter().find(|c| c.name == name)
    }
}

/// Alignment categories reported by samtools flagstat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadCategory {
    Total,
    Primary,
    Secondary,
    Supplementary,
    Duplicates,
    PrimaryDuplicates,
    Mapped,
    PrimaryMapped,
    PairedInSequencing,
    Read1,
    Read2,
    ProperlyPaired,
    ItselfAndMateMapped,
    Singletons,
    MateMappedToDifferentChr,
    MateMappedToDifferentChrMapq5,
}

impl ReadCategory {
    /// Categories every flagstat file must report
    pub const REQUIRED: [ReadCategory; 13] = [
        ReadCategory::Total,
        ReadCategory::Secondary,
        ReadCategory::Supplementary,
        ReadCategory::Duplicates,
        ReadCategory::Mapped,
        ReadCategory::PairedInSequencing,
        ReadCategory::Read1,
        ReadCategory::Read2,
        ReadCategory::ProperlyPaired,
        ReadCategory::ItselfAndMateMapped,
        ReadCategory::Singletons,
        ReadCategory::MateMappedToDifferentChr,
        ReadCategory::MateMappedToDifferentChrMapq5,
    ];

    /// Description text samtools prints after the counts
    pub fn label(&self) -> &'static str {
        match self {
            ReadCategory::Total => "in total",
            ReadCategory::Primary => "primary",
            ReadCategory::Secondary => "secondary",
            ReadCategory::Supplementary => "supplementary",
            ReadCategory::Duplicates => "duplicates",
            ReadCategory::PrimaryDuplicates => "primary duplicates",
            ReadCategory::Mapped => "mapped",
            ReadCategory::PrimaryMapped => "primary mapped",
            ReadCategory::PairedInSequencing => "paired in sequencing",
            ReadCategory::Read1 => "read1",
            ReadCategory::Read2 => "read2",
            ReadCategory::ProperlyPaired => "properly paired",
            ReadCategory::ItselfAndMateMapped => "with itself and mate mapped",
            ReadCategory::Singletons => "singletons",
            ReadCategory::MateMappedToDifferentChr => "with mate mapped to a different chr",
            ReadCategory::MateMappedToDifferentChrMapq5 => {
                "with mate mapped to a different chr (mapQ>=5)"
            }
        }
    }

    /// samtools >= 1.13 adds the primary-* lines
    pub fn is_required(&self) -> bool {
        !matches!(
            self,
            ReadCategory::Primary | ReadCategory::PrimaryDuplicates | ReadCategory::PrimaryMapped
        )
    }
}

/// QC-passed and QC-failed read counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadCounts {
    pub passed: u64,
    pub failed: u64,
}

/// Alignment category counts for one sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flagstat {
    pub path: PathBuf,
    /// Contains every `ReadCategory::REQUIRED` entry
    pub counts: BTreeMap<ReadCategory, ReadCounts>,
}

impl Flagstat {
    pub fn get(&self, category: ReadCategory) -> Option<ReadCounts> {
        self.counts.get(&category).copied()
    }
}

/// Variant calling summary for one sample and region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantStats {
    pub path: PathBuf,
    pub region: Region,
    pub num_snps: u64,
    pub num_indels: u64,
    /// Transition/transversion ratio
    pub ts_tv_ratio: f64,
}
