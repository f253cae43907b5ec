// ============================================================
// VALUE COERCER
// ============================================================
// Turn raw cell text into canonical typed values

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::domain::csv::{FieldType, FieldValue, NumberLocale};

static CURRENCY_TOKENS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)vnđ|vnd|usd|eur|[₫$€£¥₩₹đ]").unwrap());

/// Why a cell could not be read as a number
#[derive(Debug, Clone, PartialEq)]
pub enum CoercionError {
    /// Letters or other stray characters remain after cleaning
    NotANumber(String),

    /// More than one decimal separator, e.g. `1,200,000` under a `,` decimal locale
    AmbiguousSeparators(String),

    /// Integer field holding a fractional value
    NotWhole(f64),

    /// Integer field outside the i64 range
    OutOfRange(String),
}

impl fmt::Display for CoercionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoercionError::NotANumber(raw) => write!(f, "not a number: '{}'", raw),
            CoercionError::AmbiguousSeparators(raw) => {
                write!(f, "more than one decimal separator in '{}'", raw)
            }
            CoercionError::NotWhole(value) => write!(f, "expected a whole number, got {}", value),
            CoercionError::OutOfRange(raw) => write!(f, "number out of range: '{}'", raw),
        }
    }
}

impl std::error::Error for CoercionError {}

/// Clean a locale-formatted number using the default locale
/// (`.` thousands separator, `,` decimal separator).
///
/// Currency glyphs and codes, `%` and whitespace are removed. Empty input is
/// `0`. Callers that want the best-effort value on failure use
/// `clean_numeric(raw).unwrap_or_default()`.
pub fn clean_numeric(raw: &str) -> Result<f64, CoercionError> {
    clean_numeric_with(raw, NumberLocale::default())
}

pub fn clean_numeric_with(raw: &str, locale: NumberLocale) -> Result<f64, CoercionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }

    let stripped = CURRENCY_TOKENS.replace_all(trimmed, "");
    let mut cleaned = String::with_capacity(stripped.len());
    let mut decimal_separators = 0;

    for c in stripped.chars() {
        if c.is_whitespace() || c == '%' || c == locale.grouping {
            continue;
        }
        if c == locale.decimal {
            decimal_separators += 1;
            cleaned.push('.');
        } else if c.is_ascii_digit() || c == '-' || c == '+' {
            cleaned.push(c);
        } else {
            return Err(CoercionError::NotANumber(raw.to_string()));
        }
    }

    if decimal_separators > 1 {
        return Err(CoercionError::AmbiguousSeparators(raw.to_string()));
    }
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return Err(CoercionError::NotANumber(raw.to_string()));
    }

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| CoercionError::NotANumber(raw.to_string()))
}

/// Outcome of coercing one cell: always a usable value, plus the
/// problem when the raw text had to be replaced
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced {
    pub value: FieldValue,
    pub error: Option<CoercionError>,
}

impl Coerced {
    fn ok(value: FieldValue) -> Self {
        Self { value, error: None }
    }

    fn failed(value: FieldValue, error: CoercionError) -> Self {
        Self {
            value,
            error: Some(error),
        }
    }
}

/// Coerces cells according to their field type
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueCoercer {
    locale: NumberLocale,
}

impl ValueCoercer {
    pub fn new(locale: NumberLocale) -> Self {
        Self { locale }
    }

    pub fn coerce(&self, raw: &str, field_type: FieldType) -> Coerced {
        match field_type {
            FieldType::Text => Coerced::ok(FieldValue::Text(raw.to_string())),
            FieldType::NumericCurrency | FieldType::NumericPercentage => {
                self.number(raw, self.locale)
            }
            FieldType::Decimal => self.number(raw, NumberLocale::english()),
            FieldType::Integer => self.integer(raw),
        }
    }

    fn number(&self, raw: &str, locale: NumberLocale) -> Coerced {
        match clean_numeric_with(raw, locale) {
            Ok(n) => Coerced::ok(FieldValue::Number(n)),
            Err(e) => Coerced::failed(FieldValue::Number(0.0), e),
        }
    }

    fn integer(&self, raw: &str) -> Coerced {
        let n = match clean_numeric_with(raw, self.locale) {
            Ok(n) => n,
            Err(e) => return Coerced::failed(FieldValue::Integer(0), e),
        };

        if n < i64::MIN as f64 || n > i64::MAX as f64 {
            return Coerced::failed(
                FieldValue::Integer(0),
                CoercionError::OutOfRange(raw.to_string()),
            );
        }

        let whole = n.trunc() as i64;
        if n.fract() != 0.0 {
            Coerced::failed(FieldValue::Integer(whole), CoercionError::NotWhole(n))
        } else {
            Coerced::ok(FieldValue::Integer(whole))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_with_grouping() {
        assert_eq!(clean_numeric("1.200.000₫").unwrap(), 1_200_000.0);
        assert_eq!(clean_numeric("150.000 VNĐ").unwrap(), 150_000.0);
        assert_eq!(clean_numeric("150.000 vnd").unwrap(), 150_000.0);
        assert_eq!(clean_numeric("$ 99").unwrap(), 99.0);
        assert_eq!(clean_numeric("1\u{a0}200\u{a0}000 đ").unwrap(), 1_200_000.0);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(clean_numeric("25%").unwrap(), 25.0);
        assert_eq!(clean_numeric("12,5 %").unwrap(), 12.5);
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(clean_numeric("").unwrap(), 0.0);
        assert_eq!(clean_numeric("   ").unwrap(), 0.0);
    }

    #[test]
    fn test_letters_are_rejected_with_zero_fallback() {
        let result = clean_numeric("abc");
        assert_eq!(result, Err(CoercionError::NotANumber("abc".to_string())));
        assert_eq!(clean_numeric("abc").unwrap_or_default(), 0.0);
        assert!(clean_numeric("12kg").is_err());
        assert!(clean_numeric("-").is_err());
    }

    #[test]
    fn test_negative_and_decimal() {
        assert_eq!(clean_numeric("-5").unwrap(), -5.0);
        assert_eq!(clean_numeric("1.234,56").unwrap(), 1234.56);
    }

    #[test]
    fn test_two_decimal_separators_are_ambiguous() {
        assert!(matches!(
            clean_numeric("1,200,000"),
            Err(CoercionError::AmbiguousSeparators(_))
        ));
    }

    #[test]
    fn test_english_locale() {
        let locale = NumberLocale::english();
        assert_eq!(clean_numeric_with("1,200,000.50", locale).unwrap(), 1_200_000.5);
        assert!(clean_numeric_with("1.200.000", locale).is_err());
    }

    #[test]
    fn test_coerce_text_is_verbatim() {
        let coercer = ValueCoercer::default();
        let out = coercer.coerce("Son, đỏ", FieldType::Text);
        assert_eq!(out.value, FieldValue::text("Son, đỏ"));
        assert!(out.error.is_none());
        assert_eq!(coercer.coerce("", FieldType::Text).value, FieldValue::text(""));
    }

    #[test]
    fn test_coerce_decimal_uses_point() {
        let coercer = ValueCoercer::default();
        assert_eq!(coercer.coerce("4.5", FieldType::Decimal).value, FieldValue::Number(4.5));
        assert_eq!(
            coercer.coerce("1.200.000", FieldType::NumericCurrency).value,
            FieldValue::Number(1_200_000.0)
        );
    }

    #[test]
    fn test_coerce_integer() {
        let coercer = ValueCoercer::default();
        assert_eq!(coercer.coerce("1.024", FieldType::Integer).value, FieldValue::Integer(1024));
        assert_eq!(coercer.coerce("", FieldType::Integer).value, FieldValue::Integer(0));

        let fractional = coercer.coerce("2,5", FieldType::Integer);
        assert_eq!(fractional.value, FieldValue::Integer(2));
        assert_eq!(fractional.error, Some(CoercionError::NotWhole(2.5)));

        let bad = coercer.coerce("n/a", FieldType::Integer);
        assert_eq!(bad.value, FieldValue::Integer(0));
        assert!(bad.error.is_some());
    }

    #[test]
    fn test_coerce_failure_defaults_to_zero() {
        let coercer = ValueCoercer::default();
        let out = coercer.coerce("liên hệ", FieldType::NumericCurrency);
        assert_eq!(out.value, FieldValue::Number(0.0));
        assert_eq!(out.error.unwrap().to_string(), "not a number: 'liên hệ'");
    }
}
