// ==============================================================================
// region.rs - Genomic Regions of Interest
// ==============================================================================
// Description: Closed set of chromosome regions used as per-region metric keys
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Regions:
//   autosome-PAR        autosomes plus the pseudo-autosomal regions
//   chrX-nonPAR         chrX outside PAR (coverage metrics)
//   chrX-nonPAR-male    chrX outside PAR, called haploid
//   chrX-nonPAR-female  chrX outside PAR, called diploid
//   chrY-nonPAR         chrY outside PAR
// ==============================================================================

use serde::{Serialize, Serializer};
use std::fmt;

/// Genomic region of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    AutosomePar,
    ChrXNonPar,
    ChrXNonParMale,
    ChrXNonParFemale,
    ChrYNonPar,
}

impl Region {
    /// Regions with a coverage-metrics file per sample
    pub const COVERAGE: [Region; 3] = [Region::AutosomePar, Region::ChrXNonPar, Region::ChrYNonPar];

    /// Regions with a variant-calling output per sample
    pub const VARIANT_CALLING: [Region; 4] = [
        Region::AutosomePar,
        Region::ChrXNonParMale,
        Region::ChrXNonParFemale,
        Region::ChrYNonPar,
    ];

    /// Stable machine identifier, also used in file names
    pub fn id(&self) -> &'static str {
        match self {
            Region::AutosomePar => "autosome-PAR",
            Region::ChrXNonPar => "chrX-nonPAR",
            Region::ChrXNonParMale => "chrX-nonPAR-male",
            Region::ChrXNonParFemale => "chrX-nonPAR-female",
            Region::ChrYNonPar => "chrY-nonPAR",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Region::AutosomePar => "autosome-PAR",
            Region::ChrXNonPar => "chrX-nonPAR",
            Region::ChrXNonParMale => "chrX-nonPAR (male)",
            Region::ChrXNonParFemale => "chrX-nonPAR (female)",
            Region::ChrYNonPar => "chrY-nonPAR",
        }
    }

    /// Region whose coverage-metrics file describes this region.
    ///
    /// Both chrX ploidy variants are called separately but share one
    /// coverage-metrics file.
    pub fn coverage_region(&self) -> Region {
        match self {
            Region::ChrXNonParMale | Region::ChrXNonParFemale => Region::ChrXNonPar,
            other => *other,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Region {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}
