// ============================================================
// EXPORT SPEC
// ============================================================
// Column order, mapping and delimiter for one export call

use serde::{Deserialize, Serialize};
use std::fmt;

use super::FieldMapping;

/// Column separator of a delimited file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    #[default]
    Comma,
    Semicolon,
    Tab,
}

impl Delimiter {
    pub fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Semicolon => ';',
            Delimiter::Tab => '\t',
        }
    }

    pub fn as_byte(&self) -> u8 {
        self.as_char() as u8
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delimiter::Comma => write!(f, "comma"),
            Delimiter::Semicolon => write!(f, "semicolon"),
            Delimiter::Tab => write!(f, "tab"),
        }
    }
}

/// Export configuration, fixed for the duration of one export
#[derive(Debug, Clone)]
pub struct ExportSpec {
    /// Internal keys (or extra headers) in output column order
    pub field_order: Vec<String>,

    pub mapping: FieldMapping,

    pub delimiter: Delimiter,

    /// Append extra columns found on the records after `field_order`
    pub include_extras: bool,
}

impl ExportSpec {
    pub fn new<S: Into<String>>(
        field_order: impl IntoIterator<Item = S>,
        mapping: FieldMapping,
    ) -> Self {
        Self {
            field_order: field_order.into_iter().map(Into::into).collect(),
            mapping,
            delimiter: Delimiter::Comma,
            include_extras: false,
        }
    }

    /// Every mapped key, in mapping order
    pub fn from_mapping(mapping: FieldMapping) -> Self {
        let order: Vec<String> = mapping.keys().map(str::to_string).collect();
        Self::new(order, mapping)
    }

    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_extras(mut self, include: bool) -> Self {
        self.include_extras = include;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mapping_uses_mapping_order() {
        let mapping = FieldMapping::from_pairs([("name", "Tên"), ("price", "Giá")]).unwrap();
        let spec = ExportSpec::from_mapping(mapping);
        assert_eq!(spec.field_order, vec!["name", "price"]);
        assert_eq!(spec.delimiter, Delimiter::Comma);
        assert!(!spec.include_extras);
    }

    #[test]
    fn test_delimiter_bytes() {
        assert_eq!(Delimiter::Tab.as_byte(), b'\t');
        assert_eq!(Delimiter::Semicolon.as_char(), ';');
        assert_eq!(Delimiter::default(), Delimiter::Comma);
    }
}
