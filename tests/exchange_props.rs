//! Property-based tests for import/export symmetry
//!
//! Round trip: records serialized under a spec parse back to the same records.
//! Quoting: a single escaped value tokenizes back to itself.

use proptest::prelude::*;

use tabex::{
    clean_numeric, escape_field, parse, serialize, tokenize, Delimiter, ExportSpec,
    FieldMapping, FieldSpec, FieldType, Record,
};

fn catalog_mapping() -> FieldMapping {
    FieldMapping::new(vec![
        FieldSpec::new("name", "Tên sản phẩm").required(),
        FieldSpec::new("brand", "Thương hiệu"),
        FieldSpec::new("price", "Giá hiện tại").typed(FieldType::NumericCurrency),
        FieldSpec::new("rating", "Đánh giá").typed(FieldType::Decimal),
        FieldSpec::new("stock", "Tồn kho").typed(FieldType::Integer),
    ])
    .unwrap()
}

fn delimiter_strategy() -> impl Strategy<Value = Delimiter> {
    prop_oneof![
        Just(Delimiter::Comma),
        Just(Delimiter::Semicolon),
        Just(Delimiter::Tab),
    ]
}

/// Text without leading/trailing whitespace; may contain delimiters,
/// quotes and embedded newlines
fn text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9đăâêôơưáàảãạéèóòúù ]{0,16}".prop_map(|s| s.trim().to_string()),
        "[a-zA-Z0-9 ,;\"\n]{0,16}".prop_map(|s| s.trim().to_string()),
        Just("Son, đỏ".to_string()),
        Just("Kem \"dưỡng\" ẩm".to_string()),
        Just("dòng 1\ndòng 2".to_string()),
        Just(String::new()),
    ]
}

fn name_strategy() -> impl Strategy<Value = String> {
    text_strategy().prop_filter("name must not be blank", |s| !s.is_empty())
}

fn record_strategy() -> impl Strategy<Value = Record> {
    (
        name_strategy(),
        text_strategy(),
        -1_000_000_000i64..1_000_000_000,
        0u32..=50,
        -1_000_000i64..1_000_000_000,
    )
        .prop_map(|(name, brand, cents, rating_tenths, stock)| {
            Record::new()
                .with("name", name)
                .with("brand", brand)
                .with("price", cents as f64 / 100.0)
                .with("rating", rating_tenths as f64 / 10.0)
                .with("stock", stock)
        })
}

/// Format a whole number with `.` thousands grouping
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// parse(serialize(R)) == R for records without ids or extras
    #[test]
    fn prop_export_then_import_round_trips(
        records in prop::collection::vec(record_strategy(), 0..8),
        delimiter in delimiter_strategy(),
    ) {
        let mapping = catalog_mapping();
        let spec = ExportSpec::from_mapping(mapping.clone()).with_delimiter(delimiter);

        let bytes = serialize(&records, &spec).unwrap();
        let result = parse(&bytes, &mapping).unwrap();

        prop_assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
        prop_assert_eq!(result.rows, records);
    }

    /// Escaping a value and tokenizing it as a one-field line is the identity
    #[test]
    fn prop_escaped_value_tokenizes_to_itself(
        value in text_strategy(),
        delimiter in delimiter_strategy(),
    ) {
        let escaped = escape_field(&value, delimiter).unwrap();
        let cells = tokenize(&escaped, delimiter).unwrap();
        prop_assert_eq!(cells, vec![value]);
    }

    /// Values with nothing special in them are written bare
    #[test]
    fn prop_plain_values_are_not_quoted(
        value in "[a-zA-Z0-9]{1,20}",
        delimiter in delimiter_strategy(),
    ) {
        prop_assert_eq!(escape_field(&value, delimiter).unwrap(), value);
    }

    /// Grouped currency amounts clean to their integer value
    #[test]
    fn prop_grouped_currency_cleans_to_amount(
        amount in 0u64..1_000_000_000_000,
        suffix in prop_oneof![Just("₫"), Just(" VNĐ"), Just(" đ"), Just("")],
    ) {
        let raw = format!("{}{}", group_thousands(amount), suffix);
        prop_assert_eq!(clean_numeric(&raw).unwrap(), amount as f64);
    }

    /// Cells with letters never clean silently
    #[test]
    fn prop_letters_are_rejected(word in "[g-zG-Z]{1,8}") {
        prop_assert!(clean_numeric(&word).is_err());
        prop_assert_eq!(clean_numeric(&word).unwrap_or_default(), 0.0);
    }
}
