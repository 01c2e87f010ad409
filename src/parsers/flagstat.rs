// ==============================================================================
// parsers/flagstat.rs - samtools flagstat Parser
// ==============================================================================
// Description: Parser for QC-passed/QC-failed read counts per alignment category
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Format: one category per line, "<passed> + <failed> <description>"
// Example:
//   1000 + 0 in total (QC-passed reads + QC-failed reads)
//   0 + 0 secondary
//   995 + 0 mapped (99.50% : N/A)
//   10 + 0 with mate mapped to a different chr
//   4 + 0 with mate mapped to a different chr (mapQ>=5)
// ==============================================================================

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{Flagstat, ReadCategory, ReadCounts};

/// Every known category, longest label first.
///
/// A description matches a label when it equals the label or continues with
/// a parenthesised annotation, so "with mate mapped to a different chr
/// (mapQ>=5)" must be tried before "with mate mapped to a different chr".
pub const LABEL_TABLE: [ReadCategory; 16] = [
    ReadCategory::MateMappedToDifferentChrMapq5,
    ReadCategory::MateMappedToDifferentChr,
    ReadCategory::ItselfAndMateMapped,
    ReadCategory::PairedInSequencing,
    ReadCategory::PrimaryDuplicates,
    ReadCategory::ProperlyPaired,
    ReadCategory::PrimaryMapped,
    ReadCategory::Supplementary,
    ReadCategory::Singletons,
    ReadCategory::Duplicates,
    ReadCategory::Secondary,
    ReadCategory::Total,
    ReadCategory::Primary,
    ReadCategory::Mapped,
    ReadCategory::Read1,
    ReadCategory::Read2,
];

/// Errors that can occur during flagstat parsing
#[derive(Error, Debug)]
pub enum FlagstatParseError {
    #[error("Failed to read {}: {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: invalid line {line_number}: {line}", .path.display())]
    UnrecognizedLine {
        path: PathBuf,
        line_number: usize,
        line: String,
    },

    #[error("{}: category '{}' reported twice (line {line_number})", .path.display(), .category.label())]
    DuplicateCategory {
        path: PathBuf,
        line_number: usize,
        category: ReadCategory,
    },

    #[error("{}: missing categories: {}", .path.display(), .missing.join(", "))]
    MissingCategories {
        path: PathBuf,
        missing: Vec<&'static str>,
    },
}

/// Parser for samtools flagstat output
pub struct FlagstatParser;

impl FlagstatParser {
    /// Parse a flagstat file
    ///
    /// Every non-blank line must match a known category, and every required
    /// category must appear exactly once. Zero-filling a missing category is
    /// never done.
    pub fn parse(path: impl AsRef<Path>) -> Result<Flagstat, FlagstatParseError> {
        let path = path.as_ref();
        let io_error = |source| FlagstatParseError::IoError {
            path: path.to_path_buf(),
            source,
        };

        let reader = BufReader::new(File::open(path).map_err(io_error)?);
        let mut counts = BTreeMap::new();

        for (idx, line_result) in reader.lines().enumerate() {
            let line_number = idx + 1;
            let line = line_result.map_err(io_error)?;

            if line.trim().is_empty() {
                continue;
            }

            let (category, read_counts) =
                parse_line(&line).ok_or_else(|| FlagstatParseError::UnrecognizedLine {
                    path: path.to_path_buf(),
                    line_number,
                    line: line.clone(),
                })?;

            if counts.insert(category, read_counts).is_some() {
                return Err(FlagstatParseError::DuplicateCategory {
                    path: path.to_path_buf(),
                    line_number,
                    category,
                });
            }
        }

        let missing: Vec<&'static str> = ReadCategory::REQUIRED
            .iter()
            .filter(|category| !counts.contains_key(*category))
            .map(|category| category.label())
            .collect();

        if !missing.is_empty() {
            return Err(FlagstatParseError::MissingCategories {
                path: path.to_path_buf(),
                missing,
            });
        }

        Ok(Flagstat {
            path: path.to_path_buf(),
            counts,
        })
    }
}

/// Parse "<passed> + <failed> <description>"
fn parse_line(line: &str) -> Option<(ReadCategory, ReadCounts)> {
    let (passed, rest) = line.trim().split_once(" + ")?;
    let (failed, description) = rest.split_once(' ')?;

    let counts = ReadCounts {
        passed: passed.parse().ok()?,
        failed: failed.parse().ok()?,
    };

    match_category(description.trim()).map(|category| (category, counts))
}

/// First category in `LABEL_TABLE` whose label the description carries
pub fn match_category(description: &str) -> Option<ReadCategory> {
    LABEL_TABLE.iter().copied().find(|category| {
        let label = category.label();
        description == label
            || description
                .strip_prefix(label)
                .is_some_and(|rest| rest.starts_with(" ("))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FLAGSTAT: &str = "\
1000 + 2 in total (QC-passed reads + QC-failed reads)
5 + 0 secondary
3 + 0 supplementary
80 + 1 duplicates
995 + 2 mapped (99.50% : N/A)
992 + 2 paired in sequencing
496 + 1 read1
496 + 1 read2
980 + 2 properly paired (98.79% : N/A)
985 + 2 with itself and mate mapped
2 + 0 singletons (0.20% : N/A)
10 + 0 with mate mapped to a different chr
4 + 0 with mate mapped to a different chr (mapQ>=5)
";

    fn create_test_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_valid_file() {
        let file = create_test_file(FLAGSTAT);
        let flagstat = FlagstatParser::parse(file.path()).unwrap();

        assert_eq!(flagstat.counts.len(), 13);
        assert_eq!(
            flagstat.get(ReadCategory::Total),
            Some(ReadCounts { passed: 1000, failed: 2 })
        );
        assert_eq!(flagstat.get(ReadCategory::Mapped).unwrap().passed, 995);
        assert_eq!(flagstat.get(ReadCategory::ProperlyPaired).unwrap().passed, 980);
        assert_eq!(flagstat.get(ReadCategory::MateMappedToDifferentChr).unwrap().passed, 10);
        assert_eq!(flagstat.get(ReadCategory::MateMappedToDifferentChrMapq5).unwrap().passed, 4);
        assert_eq!(flagstat.get(ReadCategory::PrimaryMapped), None);
    }

    #[test]
    fn test_parse_samtools_1_13_layout() {
        let contents = FLAGSTAT
            .replace("5 + 0 secondary", "1000 + 2 primary\n5 + 0 secondary")
            .replace("80 + 1 duplicates", "80 + 1 duplicates\n80 + 1 primary duplicates")
            .replace(
                "995 + 2 mapped (99.50% : N/A)",
                "995 + 2 mapped (99.50% : N/A)\n990 + 2 primary mapped (99.00% : N/A)",
            );
        let file = create_test_file(&contents);
        let flagstat = FlagstatParser::parse(file.path()).unwrap();

        assert_eq!(flagstat.counts.len(), 16);
        assert_eq!(flagstat.get(ReadCategory::Mapped).unwrap().passed, 995);
        assert_eq!(flagstat.get(ReadCategory::PrimaryMapped).unwrap().passed, 990);
        assert_eq!(flagstat.get(ReadCategory::Duplicates).unwrap().passed, 80);
        assert_eq!(flagstat.get(ReadCategory::PrimaryDuplicates).unwrap().passed, 80);
    }

    #[test]
    fn test_unrecognized_line_reports_text() {
        let contents = FLAGSTAT.replace("3 + 0 supplementary", "3 + 0 supplemental alignments");
        let file = create_test_file(&contents);

        match FlagstatParser::parse(file.path()).unwrap_err() {
            FlagstatParseError::UnrecognizedLine { line_number, line, .. } => {
                assert_eq!(line_number, 3);
                assert_eq!(line, "3 + 0 supplemental alignments");
            }
            other => panic!("Expected UnrecognizedLine error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_counts_rejected() {
        let contents = FLAGSTAT.replace("5 + 0 secondary", "five + 0 secondary");
        let file = create_test_file(&contents);

        match FlagstatParser::parse(file.path()).unwrap_err() {
            FlagstatParseError::UnrecognizedLine { line, .. } => assert_eq!(line, "five + 0 secondary"),
            other => panic!("Expected UnrecognizedLine error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_category() {
        let contents = FLAGSTAT.replace("2 + 0 singletons (0.20% : N/A)\n", "");
        let file = create_test_file(&contents);

        match FlagstatParser::parse(file.path()).unwrap_err() {
            FlagstatParseError::MissingCategories { missing, .. } => {
                assert_eq!(missing, vec!["singletons"]);
            }
            other => panic!("Expected MissingCategories error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_category() {
        let contents = format!("{}0 + 0 secondary\n", FLAGSTAT);
        let file = create_test_file(&contents);

        match FlagstatParser::parse(file.path()).unwrap_err() {
            FlagstatParseError::DuplicateCategory { line_number, category, .. } => {
                assert_eq!(line_number, 14);
                assert_eq!(category, ReadCategory::Secondary);
            }
            other => panic!("Expected DuplicateCategory error, got {:?}", other),
        }
    }

    #[test]
    fn test_longest_label_wins() {
        assert_eq!(
            match_category("with mate mapped to a different chr (mapQ>=5)"),
            Some(ReadCategory::MateMappedToDifferentChrMapq5)
        );
        assert_eq!(
            match_category("with mate mapped to a different chr"),
            Some(ReadCategory::MateMappedToDifferentChr)
        );
        assert_eq!(match_category("mapped (99.50% : N/A)"), Some(ReadCategory::Mapped));
        assert_eq!(match_category("mappedness"), None);
    }

    #[test]
    fn test_label_table_ordering() {
        let lengths: Vec<usize> = LABEL_TABLE.iter().map(|c| c.label().len()).collect();
        assert!(lengths.windows(2).all(|w| w[0] >= w[1]));

        let unique: HashSet<_> = LABEL_TABLE.iter().collect();
        assert_eq!(unique.len(), LABEL_TABLE.len());
        for category in ReadCategory::REQUIRED {
            assert!(LABEL_TABLE.contains(&category));
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        match FlagstatParser::parse(dir.path().join("none.flagstat")).unwrap_err() {
            FlagstatParseError::IoError { source, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::NotFound)
            }
            other => panic!("Expected IoError error, got {:?}", other),
        }
    }
}
