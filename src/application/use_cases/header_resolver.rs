// ============================================================
// HEADER RESOLVER
// ============================================================
// Map each source column to an internal key or an extra field
//
// Precedence per header:
//   1) exact display label match
//   2) exact internal key match
//   3) pass-through extra, kept under the header text

use std::collections::HashMap;

use crate::domain::csv::{FieldMapping, RowError};

/// What a source column feeds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnTarget {
    /// Mapped field, by internal key
    Field(String),

    /// Unmapped column, kept verbatim under this header
    Extra(String),

    /// Repeats a header (or key) already claimed by `first_column`
    Duplicate { header: String, first_column: usize },
}

/// Column-by-column resolution for one header row
#[derive(Debug, Clone, Default)]
pub struct HeaderResolution {
    pub columns: Vec<ColumnTarget>,

    /// Mapping keys with no column in the file
    pub missing: Vec<String>,

    /// Header-level problems (row 0)
    pub errors: Vec<RowError>,

    key_columns: HashMap<String, usize>,
}

impl HeaderResolution {
    /// Column index feeding an internal key
    pub fn column_of(&self, key: &str) -> Option<usize> {
        self.key_columns.get(key).copied()
    }

    pub fn extras(&self) -> impl Iterator<Item = (usize, &str)> {
        self.columns.iter().enumerate().filter_map(|(idx, target)| match target {
            ColumnTarget::Extra(header) => Some((idx, header.as_str())),
            _ => None,
        })
    }
}

/// Resolve every header. Never drops a column: each one becomes a field,
/// an extra, or a reported duplicate.
pub fn resolve_headers(headers: &[String], mapping: &FieldMapping) -> HeaderResolution {
    let mut resolution = HeaderResolution::default();
    let mut extra_columns: HashMap<String, usize> = HashMap::new();

    for (idx, header) in headers.iter().enumerate() {
        let key = mapping
            .by_label(header)
            .or_else(|| mapping.by_key(header))
            .map(|spec| spec.key.clone());

        let target = match key {
            Some(key) => match resolution.key_columns.get(&key) {
                Some(&first_column) => ColumnTarget::Duplicate {
                    header: header.clone(),
                    first_column,
                },
                None => {
                    resolution.key_columns.insert(key.clone(), idx);
                    ColumnTarget::Field(key)
                }
            },
            None => {
                let name = if header.trim().is_empty() {
                    format!("column_{}", idx + 1)
                } else {
                    header.clone()
                };
                match extra_columns.get(&name) {
                    Some(&first_column) => ColumnTarget::Duplicate {
                        header: name,
                        first_column,
                    },
                    None => {
                        extra_columns.insert(name.clone(), idx);
                        ColumnTarget::Extra(name)
                    }
                }
            }
        };

        if let ColumnTarget::Duplicate {
            header,
            first_column,
        } = &target
        {
            resolution.errors.push(RowError::for_field(
                0,
                header.clone(),
                format!(
                    "duplicate header in column {} (already read from column {}); column ignored",
                    idx + 1,
                    first_column + 1
                ),
            ));
        }

        resolution.columns.push(target);
    }

    resolution.missing = mapping
        .keys()
        .filter(|key| !resolution.key_columns.contains_key(*key))
        .map(str::to_string)
        .collect();

    tracing::debug!(
        columns = resolution.columns.len(),
        mapped = resolution.key_columns.len(),
        missing = resolution.missing.len(),
        "Resolved header row"
    );

    resolution
}
