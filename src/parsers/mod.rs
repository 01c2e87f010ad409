// ==============================================================================
// parsers/mod.rs - Metrics file parser modules
// ==============================================================================
// Description: Parsers for sequencing QC workflow output formats
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

pub mod sections;
pub mod table;
pub mod wgs_metrics;
pub mod idxstats;
pub mod flagstat;
pub mod bcftools_stats;

pub use sections::{split_sections, Section, SectionError, Sections};
pub use table::{parse_table, FieldValue, TableError, TableRow};
pub use wgs_metrics::{WgsMetricsParser, WgsMetricsParseError};
pub use idxstats::{IdxstatsParser, IdxstatsParseError};
pub use flagstat::{FlagstatParser, FlagstatParseError};
pub use bcftools_stats::{BcftoolsStatsParser, BcftoolsStatsParseError};
