// ============================================================
// RECORD EXPORTER
// ============================================================
// records -> header row + one delimited row per record

use crate::domain::csv::{ExportSpec, FieldType, FieldValue, NumberLocale, Record};
use crate::domain::error::Result;
use crate::infrastructure::csv::DelimitedWriter;

/// Integral values below this magnitude are written without a fraction
const MAX_EXACT_INTEGRAL: f64 = 1e15;

/// Serialize records in `spec.field_order`, headed by display labels.
///
/// Keys without a label fall back to the key itself. Missing and null
/// values become empty cells. Numbers are written with the mapping's
/// decimal separator so the file reads back under the same mapping.
pub fn serialize(records: &[Record], spec: &ExportSpec) -> Result<Vec<u8>> {
    let columns = export_columns(records, spec);
    let locale = spec.mapping.locale();

    let mut writer = DelimitedWriter::new(spec.delimiter);
    writer.write_row(columns.iter().map(|key| {
        spec.mapping
            .label_for(key)
            .unwrap_or(key.as_str())
            .to_string()
    }))?;

    for record in records {
        let cells: Vec<String> = columns
            .iter()
            .map(|key| {
                let field_type = spec
                    .mapping
                    .by_key(key)
                    .map(|s| s.field_type)
                    .unwrap_or_default();
                record
                    .lookup(key)
                    .map(|value| render_value(&value, field_type, locale))
                    .unwrap_or_default()
            })
            .collect();
        writer.write_row(&cells)?;
    }

    let bytes = writer.finish()?;
    tracing::debug!(
        rows = records.len(),
        columns = columns.len(),
        delimiter = %spec.delimiter,
        bytes = bytes.len(),
        "Serialized records"
    );
    Ok(bytes)
}

/// Output columns: the requested order, then (optionally) every extra
/// header seen on the records, in first-seen order
fn export_columns(records: &[Record], spec: &ExportSpec) -> Vec<String> {
    let mut columns = spec.field_order.clone();
    if spec.include_extras {
        for extra in records.iter().flat_map(|r| r.extras.iter()) {
            if !columns.contains(&extra.header) {
                columns.push(extra.header.clone());
            }
        }
    }
    columns
}

fn render_value(value: &FieldValue, field_type: FieldType, locale: NumberLocale) -> String {
    match value {
        FieldValue::Null => String::new(),
        FieldValue::Text(s) => s.clone(),
        FieldValue::Integer(n) => n.to_string(),
        FieldValue::Number(n) => {
            let decimal = match field_type {
                FieldType::Decimal => '.',
                _ => locale.decimal,
            };
            render_number(*n, decimal)
        }
    }
}

fn render_number(n: f64, decimal: char) -> String {
    if !n.is_finite() {
        return String::new();
    }
    if n.fract() == 0.0 && n.abs() < MAX_EXACT_INTEGRAL {
        return (n as i64).to_string();
    }
    let plain = n.to_string();
    if decimal == '.' {
        plain
    } else {
        plain.replace('.', &decimal.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::csv::{Delimiter, FieldMapping, FieldSpec};

    fn mapping() -> FieldMapping {
        FieldMapping::new(vec![
            FieldSpec::new("name", "Tên sản phẩm"),
            FieldSpec::new("price", "Giá hiện tại").typed(FieldType::NumericCurrency),
            FieldSpec::new("rating", "Đánh giá").typed(FieldType::Decimal),
        ])
        .unwrap()
    }

    fn as_text(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_header_uses_labels_and_bom() {
        let spec = ExportSpec::from_mapping(mapping());
        let out = as_text(serialize(&[], &spec).unwrap());
        assert_eq!(out, "\u{FEFF}Tên sản phẩm,Giá hiện tại,Đánh giá\n");
    }

    #[test]
    fn test_quoted_value_scenario() {
        let spec = ExportSpec::new(["name", "price"], mapping());
        let record = Record::new().with("name", "Son, đỏ").with("price", 150000.0);
        let out = as_text(serialize(&[record], &spec).unwrap());
        assert_eq!(out, "\u{FEFF}Tên sản phẩm,Giá hiện tại\n\"Son, đỏ\",150000\n");
    }

    #[test]
    fn test_unknown_key_and_missing_value() {
        let spec = ExportSpec::new(["name", "sku"], mapping());
        let record = Record::new().with("name", "Kem");
        let out = as_text(serialize(&[record], &spec).unwrap());
        assert_eq!(out, "\u{FEFF}Tên sản phẩm,sku\nKem,\n");
    }

    #[test]
    fn test_null_is_empty_cell() {
        let spec = ExportSpec::new(["name", "price"], mapping());
        let record = Record::new().with("name", "Kem").with("price", FieldValue::Null);
        let out = as_text(serialize(&[record], &spec).unwrap());
        assert!(out.ends_with("Kem,\n"));
    }

    #[test]
    fn test_number_separators() {
        let spec = ExportSpec::new(["price", "rating"], mapping()).with_delimiter(Delimiter::Semicolon);
        let record = Record::new().with("price", 12.5).with("rating", 4.5);
        let out = as_text(serialize(&[record], &spec).unwrap());
        assert!(out.ends_with("12,5;4.5\n"));
    }

    #[test]
    fn test_fraction_with_comma_delimiter_is_quoted() {
        let spec = ExportSpec::new(["price"], mapping());
        let record = Record::new().with("price", 0.25);
        let out = as_text(serialize(&[record], &spec).unwrap());
        assert!(out.ends_with("\"0,25\"\n"));
    }

    #[test]
    fn test_embedded_quotes_and_newlines() {
        let spec = ExportSpec::new(["name"], mapping());
        let record = Record::new().with("name", "Kem \"dưỡng\"\nẩm");
        let out = as_text(serialize(&[record], &spec).unwrap());
        assert!(out.ends_with("\"Kem \"\"dưỡng\"\"\nẩm\"\n"));
    }

    #[test]
    fn test_extras_appended_in_first_seen_order() {
        let spec = ExportSpec::new(["name"], mapping()).with_extras(true);
        let records = vec![
            Record::new().with("name", "A").with_extra("Kho", "K1"),
            Record::new()
                .with("name", "B")
                .with_extra("Ghi chú", "mới")
                .with_extra("Kho", "K2"),
        ];
        let out = as_text(serialize(&records, &spec).unwrap());
        assert_eq!(out, "\u{FEFF}Tên sản phẩm,Kho,Ghi chú\nA,K1,\nB,K2,mới\n");
    }

    #[test]
    fn test_extra_reachable_by_field_order() {
        let spec = ExportSpec::new(["Kho"], mapping());
        let record = Record::new().with_extra("Kho", "K1");
        let out = as_text(serialize(&[record], &spec).unwrap());
        assert!(out.ends_with("Kho\nK1\n"));
    }

    #[test]
    fn test_render_number() {
        assert_eq!(render_number(150000.0, ','), "150000");
        assert_eq!(render_number(-3.75, ','), "-3,75");
        assert_eq!(render_number(f64::NAN, ','), "");
    }
}
