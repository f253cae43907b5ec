// ============================================================
// IMPORT ORCHESTRATOR
// ============================================================
// bytes -> logical lines -> cells -> mapped, coerced records
//
// Only a structurally broken file fails the call. Every row-level
// problem is recorded as a RowError and the row is kept when possible.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::header_resolver::{resolve_headers, HeaderResolution};
use super::id_generator::IdGenerator;
use super::value_coercer::ValueCoercer;
use crate::domain::csv::{
    FieldMapping, FieldValue, HeaderSet, ImportReport, ImportSummary, ParseResult, Record,
    RecordSet, RowError, RowStatus,
};
use crate::domain::error::{ExchangeError, Result};
use crate::infrastructure::csv::{
    decode, detect_delimiter, first_physical_line, logical_lines, tokenize,
};

/// Extra draws allowed beyond the number of ids already taken
const ID_ATTEMPT_SLACK: usize = 16;

/// Parse a delimited file into records without assigning ids.
///
/// A non-empty identity column value becomes the record id.
pub fn parse(bytes: &[u8], mapping: &FieldMapping) -> Result<ParseResult> {
    ImportOrchestrator::new(mapping).parse(bytes)
}

/// Parse a file and reconcile it against `existing`: rows without an
/// identity get a fresh collision-free id, rows are classified as
/// imported, updated or failed.
pub fn import<G>(
    bytes: &[u8],
    mapping: &FieldMapping,
    existing: &RecordSet,
    ids: &mut G,
) -> Result<ImportReport>
where
    G: IdGenerator + ?Sized,
{
    ImportOrchestrator::new(mapping).import(bytes, existing, ids)
}

/// Rows plus the data row index each one came from
struct ParsedRows {
    result: ParseResult,
    row_indices: Vec<usize>,
}

pub struct ImportOrchestrator<'a> {
    mapping: &'a FieldMapping,
    coercer: ValueCoercer,
}

impl<'a> ImportOrchestrator<'a> {
    pub fn new(mapping: &'a FieldMapping) -> Self {
        Self {
            mapping,
            coercer: ValueCoercer::new(mapping.locale()),
        }
    }

    pub fn parse(&self, bytes: &[u8]) -> Result<ParseResult> {
        Ok(self.parse_rows(bytes)?.result)
    }

    pub fn import<G>(&self, bytes: &[u8], existing: &RecordSet, ids: &mut G) -> Result<ImportReport>
    where
        G: IdGenerator + ?Sized,
    {
        let ParsedRows {
            mut result,
            row_indices,
        } = self.parse_rows(bytes)?;

        let existing_ids = existing.ids();
        let identity_key = self.mapping.identity_key();
        // every identity written in the file, so generated ids avoid later rows too
        let explicit: HashSet<String> = result.rows.iter().filter_map(|r| r.id.clone()).collect();
        let mut seen: HashSet<String> = HashSet::new();
        let mut failed_rows: HashSet<usize> = result
            .errors
            .iter()
            .map(|e| e.row_index)
            .filter(|&row| row > 0)
            .collect();
        let mut statuses = Vec::with_capacity(result.rows.len());

        for (record, &row_index) in result.rows.iter_mut().zip(&row_indices) {
            match record.id.clone() {
                Some(id) => {
                    if !seen.insert(id.clone()) {
                        result.errors.push(RowError::for_field(
                            row_index,
                            identity_key.unwrap_or("id"),
                            format!("duplicate identity '{}' in file", id),
                        ));
                        failed_rows.insert(row_index);
                    }
                }
                None => {
                    let id = fresh_id(ids, &existing_ids, &explicit, &seen)?;
                    seen.insert(id.clone());
                    if let Some(key) = identity_key {
                        record.set(key, FieldValue::Text(id.clone()));
                    }
                    record.id = Some(id);
                }
            }

            let status = if failed_rows.contains(&row_index) {
                RowStatus::Failed
            } else if record
                .id
                .as_deref()
                .map_or(false, |id| existing_ids.contains(id))
            {
                RowStatus::Updated
            } else {
                RowStatus::Imported
            };
            statuses.push(status);
        }

        result.errors.sort_by_key(|e| e.row_index);
        let summary = ImportSummary::from_statuses(&statuses);

        info!(
            rows = result.rows.len(),
            imported = summary.imported,
            updated = summary.updated,
            failed = summary.failed,
            errors = result.errors.len(),
            "Import finished"
        );

        Ok(ImportReport {
            result,
            summary,
            statuses,
        })
    }

    fn parse_rows(&self, bytes: &[u8]) -> Result<ParsedRows> {
        let decoded = decode(bytes)?;
        let delimiter = detect_delimiter(first_physical_line(&decoded.text));
        let lines = logical_lines(&decoded.text, delimiter)?;
        let mut lines = lines.into_iter().skip_while(|line| line.is_blank());

        let header_line = lines
            .next()
            .ok_or_else(|| ExchangeError::MalformedInput("file has no header row".to_string()))?;

        // unquoted headers come back trimmed; quoted ones are kept verbatim
        let headers: HeaderSet = tokenize(header_line.text, delimiter).map_err(|e| {
            ExchangeError::MalformedInput(format!(
                "header row on line {}: {}",
                header_line.line_number, e
            ))
        })?;

        debug!(
            delimiter = %delimiter,
            columns = headers.len(),
            encoding = decoded.encoding.name(),
            bom = decoded.had_bom,
            "Detected header row"
        );

        let resolution = resolve_headers(&headers, self.mapping);
        let mut errors = resolution.errors.clone();
        let mut rows = Vec::new();
        let mut row_indices = Vec::new();
        let mut row_index = 0usize;

        for line in lines {
            if line.text.is_empty() {
                continue;
            }

            let mut cells = match tokenize(line.text, delimiter) {
                Ok(cells) => cells,
                Err(e) => {
                    row_index += 1;
                    warn!(row = row_index, line = line.line_number, error = %e, "Skipping unparsable row");
                    errors.push(RowError::new(
                        row_index,
                        format!("line {}: {}", line.line_number, e),
                    ));
                    continue;
                }
            };

            row_index += 1;

            if cells.len() > headers.len() {
                if cells[headers.len()..].iter().any(|c| !c.is_empty()) {
                    warn!(
                        row = row_index,
                        line = line.line_number,
                        cells = cells.len(),
                        columns = headers.len(),
                        "Skipping row wider than header"
                    );
                    errors.push(RowError::new(
                        row_index,
                        format!(
                            "line {}: row has {} cells but the header has {}",
                            line.line_number,
                            cells.len(),
                            headers.len()
                        ),
                    ));
                    continue;
                }
                cells.truncate(headers.len());
            }

            let (record, row_errors) = self.build_record(row_index, &cells, &resolution);
            errors.extend(row_errors);
            rows.push(record);
            row_indices.push(row_index);
        }

        Ok(ParsedRows {
            result: ParseResult {
                headers,
                rows,
                errors,
            },
            row_indices,
        })
    }

    fn build_record(
        &self,
        row_index: usize,
        cells: &[String],
        resolution: &HeaderResolution,
    ) -> (Record, Vec<RowError>) {
        let mut record = Record::new();
        let mut errors = Vec::new();

        for spec in self.mapping.iter() {
            let cell = resolution
                .column_of(&spec.key)
                .and_then(|col| cells.get(col))
                .map(String::as_str)
                .unwrap_or("");
            let is_blank = cell.trim().is_empty();

            if !is_blank && self.mapping.identity_key() == Some(spec.key.as_str()) {
                record.id = Some(cell.trim().to_string());
            }

            let raw = match (&spec.default, is_blank) {
                (Some(default), true) => default.as_str(),
                _ => cell,
            };

            if spec.required && raw.trim().is_empty() {
                errors.push(RowError::for_field(
                    row_index,
                    spec.key.clone(),
                    "missing required field",
                ));
            }

            let coerced = self.coercer.coerce(raw, spec.field_type);
            if let Some(e) = coerced.error {
                errors.push(RowError::for_field(row_index, spec.key.clone(), e.to_string()));
            }
            record.set(spec.key.clone(), coerced.value);
        }

        for (col, header) in resolution.extras() {
            let value = cells.get(col).cloned().unwrap_or_default();
            record.set_extra(header, value);
        }

        (record, errors)
    }
}

fn fresh_id<G>(
    ids: &mut G,
    existing: &HashSet<&str>,
    explicit: &HashSet<String>,
    seen: &HashSet<String>,
) -> Result<String>
where
    G: IdGenerator + ?Sized,
{
    let attempts = existing.len() + explicit.len() + seen.len() + ID_ATTEMPT_SLACK;
    for _ in 0..attempts {
        let candidate = ids.next_id();
        if !existing.contains(candidate.as_str())
            && !explicit.contains(&candidate)
            && !seen.contains(&candidate)
        {
            return Ok(candidate);
        }
    }
    Err(ExchangeError::Internal(format!(
        "id generator produced {} colliding ids in a row",
        attempts
    )))
}
