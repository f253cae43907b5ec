// ============================================================
// PARSE RESULT TYPES
// ============================================================
// What an import hands back to the caller

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Record;

/// Column names in source order
pub type HeaderSet = Vec<String>;

/// Non-fatal problem attached to one row (or to the header, row 0)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// 1-based data row index; 0 addresses the header row
    pub row_index: usize,

    /// Internal key or header the problem belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    pub message: String,
}

impl RowError {
    pub fn new(row_index: usize, message: impl Into<String>) -> Self {
        Self {
            row_index,
            field: None,
            message: message.into(),
        }
    }

    pub fn for_field(row_index: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row_index,
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn is_header_error(&self) -> bool {
        self.row_index == 0
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "row {} [{}]: {}", self.row_index, field, self.message),
            None => write!(f, "row {}: {}", self.row_index, self.message),
        }
    }
}

/// Parsed file: headers, usable rows, and every row-level problem
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParseResult {
    pub headers: HeaderSet,
    pub rows: Vec<Record>,
    pub errors: Vec<RowError>,
}

impl ParseResult {
    /// Errors raised while reading the header row
    pub fn header_errors(&self) -> impl Iterator<Item = &RowError> {
        self.errors.iter().filter(|e| e.is_header_error())
    }

    /// Errors attached to a given data row
    pub fn errors_for_row(&self, row_index: usize) -> impl Iterator<Item = &RowError> {
        self.errors.iter().filter(move |e| e.row_index == row_index)
    }
}

/// How one imported row was merged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Imported,
    Updated,
    Failed,
}

/// Counts shown in the import summary dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub updated: usize,
    pub failed: usize,
}

impl ImportSummary {
    pub fn from_statuses(statuses: &[RowStatus]) -> Self {
        statuses.iter().fold(Self::default(), |mut acc, status| {
            match status {
                RowStatus::Imported => acc.imported += 1,
                RowStatus::Updated => acc.updated += 1,
                RowStatus::Failed => acc.failed += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.imported + self.updated + self.failed
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} imported, {} updated, {} failed",
            self.imported, self.updated, self.failed
        )
    }
}

/// Full outcome of an import: parse result plus per-row merge status.
/// `statuses[i]` describes `result.rows[i]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub result: ParseResult,
    pub summary: ImportSummary,
    pub statuses: Vec<RowStatus>,
}

impl ImportReport {
    pub fn rows_with_status(&self) -> impl Iterator<Item = (&Record, RowStatus)> {
        self.result.rows.iter().zip(self.statuses.iter().copied())
    }
}
