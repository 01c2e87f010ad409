// ==============================================================================
// tests/common/mod.rs - Shared Test Fixtures
// ==============================================================================
// Description: Builders for metrics files in their tool output formats
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub const THRESHOLDS: &str = "\
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

/// Picard CollectWgsMetrics output with controllable values
#[derive(Debug, Clone)]
pub struct WgsFixture {
    pub mean: f64,
    /// adapter, mapq, dupe, unpaired, baseq, overlap, capped, total
    pub excluded: [f64; 8],
    pub percent_coverage: Vec<(u32, f64)>,
    pub histogram: Vec<(u32, u64)>,
}

impl WgsFixture {
    pub fn with_mean(mean: f64) -> Self {
        Self {
            mean,
            excluded: [0.0, 0.02, 0.08, 0.001, 0.003, 0.012, 0.0004, 0.1164],
            percent_coverage: vec![(1, 0.99), (5, 0.985), (10, 0.98), (20, 0.95), (30, 0.6)],
            histogram: vec![(0, 1000), (1, 2000), (2, 3000)],
        }
    }

    pub fn render(&self) -> String {
        let mut header = vec![
            "GENOME_TERRITORY".to_string(),
            "MEAN_COVERAGE".to_string(),
            "SD_COVERAGE".to_string(),
            "MEDIAN_COVERAGE".to_string(),
            "MAD_COVERAGE".to_string(),
        ];
        let mut values = vec![
            "2745186691".to_string(),
            self.mean.to_string(),
            "8.1".to_string(),
            self.mean.round().to_string(),
            "5".to_string(),
        ];

        let excluded = [
            "ADAPTER", "MAPQ", "DUPE", "UNPAIRED", "BASEQ", "OVERLAP", "CAPPED", "TOTAL",
        ];
        for (name, value) in excluded.iter().zip(self.excluded.iter()) {
            header.push(format!("PCT_EXC_{}", name));
            values.push(value.to_string());
        }

        for (depth, fraction) in &self.percent_coverage {
            header.push(format!("PCT_{}X", depth));
            values.push(fraction.to_string());
        }

        header.extend(["HET_SNP_SENSITIVITY".to_string(), "HET_SNP_Q".to_string()]);
        values.extend(["0.97".to_string(), "15".to_string()]);

        let histogram: String = self
            .histogram
            .iter()
            .map(|(depth, count)| format!("{}\t{}\n", depth, count))
            .collect();

        format!(
            "## htsjdk.samtools.metrics.StringHeader\n\
# CollectWgsMetrics INPUT=sample.cram OUTPUT=sample.wgs_metrics\n\
## htsjdk.samtools.metrics.StringHeader\n\
# Started on: Mon Jan 01 00:00:00 UTC 2024\n\
\n\
## METRICS CLASS\tpicard.analysis.WgsMetrics\n\
{}\n\
{}\n\
\n\
\n\
## HISTOGRAM\tjava.lang.Integer\n\
coverage\thigh_quality_coverage_count\n\
{}",
            header.join("\t"),
            values.join("\t"),
            histogram
        )
    }
}

/// samtools flagstat descriptions for the required categories, in samtools order
pub const FLAGSTAT_DESCRIPTIONS: [&str; 13] = [
    "in total (QC-passed reads + QC-failed reads)",
    "secondary",
    "supplementary",
    "duplicates",
    "mapped (99.50% : N/A)",
    "paired in sequencing",
    "read1",
    "read2",
    "properly paired (98.79% : N/A)",
    "with itself and mate mapped",
    "singletons (0.20% : N/A)",
    "with mate mapped to a different chr",
    "with mate mapped to a different chr (mapQ>=5)",
];

pub fn flagstat_lines(counts: &[(u64, u64)]) -> Vec<String> {
    FLAGSTAT_DESCRIPTIONS
        .iter()
        .zip(counts.iter())
        .map(|(description, (passed, failed))| format!("{} + {} {}", passed, failed, description))
        .collect()
}

pub fn flagstat_text() -> String {
    let counts: Vec<(u64, u64)> = (0..13).map(|i| (1000 - i * 10, i)).collect();
    flagstat_lines(&counts)
        .into_iter()
        .map(|line| line + "\n")
        .collect()
}

pub fn bcftools_stats_text(num_snps: u64, num_indels: u64, ts_tv: f64) -> String {
    format!(
        "# This file was produced by bcftools stats\n\
# SN, Summary numbers:\n\
SN\t0\tnumber of samples:\t1\n\
SN\t0\tnumber of SNPs:\t{}\n\
SN\t0\tnumber of indels:\t{}\n\
# TSTV, transitions/transversions:\n\
TSTV\t0\t100\t50\t{}\t100\t50\t{}\n",
        num_snps, num_indels, ts_tv, ts_tv
    )
}

pub const IDXSTATS: &str = "\
chr1\t248956422\t15023411\t1204
chr2\t242193529\t15782630\t1102
chrX\t156040895\t4023411\t310
chrY\t57227415\t21034\t12
chrUn_KI270302v1\t2274\t5\t0
*\t0\t0\t8112
";

pub fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}
