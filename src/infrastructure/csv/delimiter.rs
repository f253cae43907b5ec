// ============================================================
// DELIMITER DETECTOR
// ============================================================

use crate::domain::csv::Delimiter;

/// Pick the column separator from the header line: tab, then semicolon,
/// then comma. Data rows are never consulted.
pub fn detect_delimiter(header_line: &str) -> Delimiter {
    if header_line.contains('\t') {
        Delimiter::Tab
    } else if header_line.contains(';') {
        Delimiter::Semicolon
    } else {
        Delimiter::Comma
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        assert_eq!(detect_delimiter("a\tb;c,d"), Delimiter::Tab);
        assert_eq!(detect_delimiter("a;b,c"), Delimiter::Semicolon);
        assert_eq!(detect_delimiter("a,b,c"), Delimiter::Comma);
    }

    #[test]
    fn test_single_column_defaults_to_comma() {
        assert_eq!(detect_delimiter("Tên sản phẩm"), Delimiter::Comma);
        assert_eq!(detect_delimiter(""), Delimiter::Comma);
    }
}
