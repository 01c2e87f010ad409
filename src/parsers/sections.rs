// ==============================================================================
// parsers/sections.rs - Sectioned Metrics File Splitter
// ==============================================================================
// Description: Splits "##"-headed metrics files into titled/untitled sections
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Format:
//   ## htsjdk.samtools.metrics.StringHeader
//   # CollectWgsMetrics INPUT=sample.cram ...
//
//   ## METRICS CLASS	picard.analysis.WgsMetrics
//   GENOME_TERRITORY	MEAN_COVERAGE	...
//
//   ## HISTOGRAM	java.lang.Integer
//   coverage	high_quality_coverage_count
// ==============================================================================

use std::mem;
use thiserror::Error;

/// Section header marker
pub const SECTION_MARKER: &str = "##";

/// A block of lines following a section header
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Absent for untitled (free-text metadata) sections
    pub title: Option<String>,
    pub type_tag: String,
    /// Header line as it appeared in the input
    pub header: String,
    /// Non-blank lines up to the next header, joined with '\n'
    pub content: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SectionError {
    #[error("Line {line_number} appears before any section header: {line}")]
    OrphanLine { line_number: usize, line: String },
}

#[derive(Debug)]
struct Header {
    title: Option<String>,
    type_tag: String,
    raw: String,
}

/// Parse a section boundary line: `##<optional title><TAB><type tag>`
fn parse_header(line: &str) -> Option<Header> {
    let rest = line.strip_prefix(SECTION_MARKER)?.trim_start();

    let (title, type_tag) = match rest.rsplit_once('\t') {
        Some((title, type_tag)) if !title.trim().is_empty() => (Some(title.trim()), type_tag.trim()),
        _ => (None, rest.trim()),
    };

    if type_tag.is_empty() {
        return None;
    }

    Some(Header {
        title: title.map(str::to_string),
        type_tag: type_tag.to_string(),
        raw: line.to_string(),
    })
}

/// Lazy section iterator over the lines of a metrics file.
///
/// Scans in two states: outside any section (only blank lines are allowed)
/// and inside a section (lines accumulate until the next header). Yields an
/// error for a non-blank line preceding the first header and stops after it.
pub struct Sections<'a, I>
where
    I: Iterator<Item = &'a str>,
{
    lines: I,
    line_number: usize,
    current: Option<Header>,
    content: Vec<&'a str>,
    failed: bool,
}

impl<'a, I> Sections<'a, I>
where
    I: Iterator<Item = &'a str>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            line_number: 0,
            current: None,
            content: Vec::new(),
            failed: false,
        }
    }

    fn finish_section(&mut self, header: Header) -> Section {
        let content = mem::take(&mut self.content).join("\n");
        Section {
            title: header.title,
            type_tag: header.type_tag,
            header: header.raw,
            content,
        }
    }
}

impl<'a, I> Iterator for Sections<'a, I>
where
    I: Iterator<Item = &'a str>,
{
    type Item = Result<Section, SectionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        for line in self.lines.by_ref() {
            self.line_number += 1;
            let line = line.trim_end_matches('\r');

            if let Some(header) = parse_header(line) {
                match self.current.replace(header) {
                    Some(previous) => return Some(Ok(self.finish_section(previous))),
                    None => continue,
                }
            }

            if line.trim().is_empty() {
                continue;
            }

            if self.current.is_none() {
                self.failed = true;
                return Some(Err(SectionError::OrphanLine {
                    line_number: self.line_number,
                    line: line.to_string(),
                }));
            }

            self.content.push(line);
        }

        self.current.take().map(|header| Ok(self.finish_section(header)))
    }
}

/// Split a metrics file body into sections
pub fn split_sections(text: &str) -> Sections<'_, std::str::Lines<'_>> {
    Sections::new(text.lines())
}
