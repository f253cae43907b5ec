// ============================================================
// RECORD TYPES
// ============================================================
// Structured rows produced by import and consumed by export

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A coerced cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Number(f64),
    Text(String),
    Null,
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Text content, if this is a text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric content as f64, if this is a number or integer
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(n) => Some(*n as f64),
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Null => Ok(()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

/// A mapped field: internal key and coerced value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

/// An unmapped column kept verbatim under its source header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraField {
    pub header: String,
    pub value: String,
}

/// One logical row of imported or exported data
///
/// Derived equality compares fields and extras in order. Use
/// [`Record::same_content`] when only the key/value content matters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    /// Opaque identity; absent until assigned or read from the identity column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Mapped fields keyed by internal key, in insertion order
    #[serde(default)]
    pub fields: Vec<Field>,

    /// Pass-through columns that matched no mapping entry
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<ExtraField>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builder-style insert of a mapped field
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Builder-style insert of an extra column
    pub fn with_extra(mut self, header: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_extra(header, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    /// Insert or replace a mapped field; a replaced key keeps its position
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.key == key) {
            Some(field) => field.value = value,
            None => self.fields.push(Field { key, value }),
        }
    }

    pub fn extra(&self, header: &str) -> Option<&str> {
        self.extras
            .iter()
            .find(|e| e.header == header)
            .map(|e| e.value.as_str())
    }

    pub fn set_extra(&mut self, header: impl Into<String>, value: impl Into<String>) {
        let header = header.into();
        let value = value.into();
        match self.extras.iter_mut().find(|e| e.header == header) {
            Some(extra) => extra.value = value,
            None => self.extras.push(ExtraField { header, value }),
        }
    }

    /// Look a column up by key: mapped fields first, then extras
    pub fn lookup(&self, key: &str) -> Option<FieldValue> {
        self.get(key)
            .cloned()
            .or_else(|| self.extra(key).map(FieldValue::text))
    }

    pub fn len(&self) -> usize {
        self.fields.len() + self.extras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.extras.is_empty()
    }

    /// Same id, fields by key and extras by header, ignoring order
    pub fn same_content(&self, other: &Record) -> bool {
        self.id == other.id
            && self.fields.len() == other.fields.len()
            && self.extras.len() == other.extras.len()
            && self
                .fields
                .iter()
                .all(|f| other.get(&f.key) == Some(&f.value))
            && self
                .extras
                .iter()
                .all(|e| other.extra(&e.header) == Some(e.value.as_str()))
    }
}

/// An ordered collection of records with identity lookups
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.position_of(id).is_some()
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.id.as_deref() == Some(id))
    }

    /// Replace the record with the same id, or append it.
    /// Returns `true` when an existing record was replaced.
    pub fn upsert(&mut self, record: Record) -> bool {
        let position = record.id.as_deref().and_then(|id| self.position_of(id));
        match position {
            Some(idx) => {
                self.records[idx] = record;
                true
            }
            None => {
                self.records.push(record);
                false
            }
        }
    }

    /// All assigned ids, for collision checks
    pub fn ids(&self) -> HashSet<&str> {
        self.records.iter().filter_map(|r| r.id.as_deref()).collect()
    }
}

impl From<Vec<Record>> for RecordSet {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
