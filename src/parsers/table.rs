// ==============================================================================
// parsers/table.rs - Tab-Separated Record Parser
// ==============================================================================
// Description: Parses a headed TSV block into rows of typed field values
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Field names are canonicalized: lowercased, punctuation removed, runs of
// whitespace replaced by '_' ("MEAN_COVERAGE" -> "mean_coverage",
// "Mean Coverage (x)" -> "mean_coverage_x").
// ==============================================================================

use csv::ReaderBuilder;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Cell value after numeric coercion
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Coerce a raw cell: integer, then float, else text
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let Ok(value) = trimmed.parse::<i64>() {
            return FieldValue::Integer(value);
        }

        if looks_numeric(trimmed) {
            if let Ok(value) = trimmed.parse::<f64>() {
                return FieldValue::Float(value);
            }
        }

        FieldValue::Text(trimmed.to_string())
    }

    /// Numeric value as float; integers widen
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(value) => Some(*value as f64),
            FieldValue::Float(value) => Some(*value),
            FieldValue::Text(_) => None,
        }
    }

    /// Non-negative integer value; floats are rejected
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::Integer(value) => u64::try_from(*value).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(value) => write!(f, "{}", value),
            FieldValue::Float(value) => write!(f, "{}", value),
            FieldValue::Text(value) => f.write_str(value),
        }
    }
}

/// Rejects "NaN", "inf" and similar words f64::from_str accepts
fn looks_numeric(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
        && s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}

/// Canonical lowercase-with-underscores form of a header name
pub fn canonical_field_name(name: &str) -> String {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_whitespace() || c.is_alphanumeric() || *c == '_')
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join("_")
}

/// One data row, fields in header order
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    fields: Vec<(String, FieldValue)>,
}

impl TableRow {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(field, value)| (field.as_str(), value))
    }
}

/// Errors that can occur while parsing a tabular block
#[derive(Error, Debug)]
pub enum TableError {
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Table has no header row")]
    MissingHeader,

    #[error("Duplicate column '{0}' in header")]
    DuplicateField(String),

    #[error("Malformed row {row}: expected {expected} columns, found {found}")]
    MalformedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Parse a tab-separated block with a header row.
///
/// Rows are numbered from 1 (the first data row after the header). Every
/// data row yields exactly one `TableRow`.
pub fn parse_table(content: &str) -> Result<Vec<TableRow>, TableError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(TableError::MissingHeader);
    }

    let names: Vec<String> = headers.iter().map(canonical_field_name).collect();
    let mut seen = HashSet::new();
    for name in &names {
        if !seen.insert(name.as_str()) {
            return Err(TableError::DuplicateField(name.clone()));
        }
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;

        if record.len() != names.len() {
            return Err(TableError::MalformedRow {
                row: idx + 1,
                expected: names.len(),
                found: record.len(),
            });
        }

        let fields = names
            .iter()
            .cloned()
            .zip(record.iter().map(FieldValue::parse))
            .collect();

        rows.push(TableRow { fields });
    }

    Ok(rows)
}
