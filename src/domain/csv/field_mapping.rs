// ============================================================
// FIELD MAPPING
// ============================================================
// Internal key <-> display label table, with per-field coercion types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::error::{ExchangeError, Result};

/// Semantic type a column is coerced to on import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Verbatim text
    #[default]
    Text,

    /// Money amount in the mapping's locale ("1.200.000₫")
    NumericCurrency,

    /// Percentage, kept on the 0-100 scale ("25%" -> 25)
    NumericPercentage,

    /// Whole number in the mapping's locale
    Integer,

    /// Machine-formatted number with `.` as decimal point ("4.5")
    Decimal,
}

impl FieldType {
    pub fn is_numeric(&self) -> bool {
        !matches!(self, FieldType::Text)
    }
}

/// Separators used by locale-formatted numbers.
///
/// The default assumes the Vietnamese convention seen in the dashboard's
/// exports: `.` groups thousands and `,` marks decimals, so `1.200.000`
/// is one million two hundred thousand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberLocale {
    pub grouping: char,
    pub decimal: char,
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self {
            grouping: '.',
            decimal: ',',
        }
    }
}

impl NumberLocale {
    /// `1,200,000.50` style
    pub fn english() -> Self {
        Self {
            grouping: ',',
            decimal: '.',
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.grouping == self.decimal {
            return Err(format!(
                "grouping and decimal separators must differ (both '{}')",
                self.grouping
            ));
        }
        for c in [self.grouping, self.decimal] {
            if c.is_ascii_digit() || c == '-' || c == '+' {
                return Err(format!("'{}' cannot be used as a number separator", c));
            }
        }
        Ok(())
    }
}

/// One entry of a field mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Stable internal key (e.g. `price_current`)
    pub key: String,

    /// Column header used in files (e.g. `Giá hiện tại`)
    pub label: String,

    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    /// Empty values produce a row error
    #[serde(default)]
    pub required: bool,

    /// Raw text substituted for an empty cell or a missing column
    #[serde(default)]
    pub default: Option<String>,
}

impl FieldSpec {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            field_type: FieldType::Text,
            required: false,
            default: None,
        }
    }

    pub fn typed(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, raw: impl Into<String>) -> Self {
        self.default = Some(raw.into());
        self
    }
}

/// Immutable key/label table passed into every parse and export call
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    fields: Vec<FieldSpec>,
    by_key: HashMap<String, usize>,
    by_label: HashMap<String, usize>,
    identity_key: Option<String>,
    locale: NumberLocale,
}

impl FieldMapping {
    /// Build a mapping, rejecting duplicate keys and shared labels
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self> {
        let mut seen_keys: HashMap<&str, usize> = HashMap::new();
        let mut seen_labels: HashMap<&str, &str> = HashMap::new();

        for (idx, spec) in fields.iter().enumerate() {
            if spec.key.trim().is_empty() {
                return Err(ExchangeError::ConfigError(format!(
                    "field #{} has an empty key",
                    idx + 1
                )));
            }
            if seen_keys.insert(spec.key.as_str(), idx).is_some() {
                return Err(ExchangeError::MappingAmbiguity(format!(
                    "key '{}' is declared more than once",
                    spec.key
                )));
            }
            if let Some(other) = seen_labels.insert(spec.label.as_str(), spec.key.as_str()) {
                return Err(ExchangeError::MappingAmbiguity(format!(
                    "keys '{}' and '{}' both map to label '{}'",
                    other, spec.key, spec.label
                )));
            }
        }

        Ok(Self::assemble(fields))
    }

    /// Build a text-only mapping from `(key, label)` pairs
    pub fn from_pairs<K, L, I>(pairs: I) -> Result<Self>
    where
        K: Into<String>,
        L: Into<String>,
        I: IntoIterator<Item = (K, L)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(key, label)| FieldSpec::new(key, label))
                .collect(),
        )
    }

    fn assemble(fields: Vec<FieldSpec>) -> Self {
        let by_key = fields
            .iter()
            .enumerate()
            .map(|(idx, f)| (f.key.clone(), idx))
            .collect();
        let by_label = fields
            .iter()
            .enumerate()
            .map(|(idx, f)| (f.label.clone(), idx))
            .collect();

        Self {
            fields,
            by_key,
            by_label,
            identity_key: None,
            locale: NumberLocale::default(),
        }
    }

    /// Designate the key whose value identifies a record across imports
    pub fn with_identity_key(mut self, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if !self.by_key.contains_key(&key) {
            return Err(ExchangeError::ConfigError(format!(
                "identity key '{}' is not a mapped field",
                key
            )));
        }
        self.identity_key = Some(key);
        Ok(self)
    }

    pub fn with_locale(mut self, locale: NumberLocale) -> Result<Self> {
        locale.validate().map_err(ExchangeError::ConfigError)?;
        self.locale = locale;
        Ok(self)
    }

    /// Column set of the dashboard's product screen
    pub fn product_catalog() -> Self {
        use FieldType::*;

        let fields = vec![
            FieldSpec::new("product_id", "product_id"),
            FieldSpec::new("name", "Tên sản phẩm").required(),
            FieldSpec::new("brand", "Thương hiệu"),
            FieldSpec::new("category", "Danh mục"),
            FieldSpec::new("short_description", "Mô tả ngắn"),
            FieldSpec::new("description", "Mô tả chi tiết"),
            FieldSpec::new("image", "Ảnh"),
            FieldSpec::new("price_current", "Giá hiện tại").typed(NumericCurrency),
            FieldSpec::new("price_original", "Giá gốc").typed(NumericCurrency),
            FieldSpec::new("discount_percent", "Giảm giá (%)").typed(NumericPercentage),
            FieldSpec::new("rating", "Đánh giá").typed(Decimal),
            FieldSpec::new("reviews_count", "Số lượt đánh giá").typed(Integer),
            FieldSpec::new("monthly_sales", "Doanh số hàng tháng").typed(Integer),
            FieldSpec::new("sell_progress", "Tiến độ bán hàng").typed(NumericPercentage),
            FieldSpec::new("inventory_qty", "Tồn kho").typed(Integer),
            FieldSpec::new("status", "Trạng thái").with_default("AVAILABLE"),
        ];

        let mut mapping = Self::assemble(fields);
        mapping.identity_key = Some("product_id".to_string());
        mapping
    }

    /// Column set of the customer list
    pub fn customers() -> Self {
        Self::assemble(vec![
            FieldSpec::new("name", "Tên khách hàng").required(),
            FieldSpec::new("type", "Loại khách hàng"),
            FieldSpec::new("birth_date", "Ngày sinh"),
            FieldSpec::new("gender", "Giới tính"),
            FieldSpec::new("industry", "Ngành nghề"),
            FieldSpec::new("email", "Email"),
            FieldSpec::new("phone", "Số điện thoại"),
            FieldSpec::new("address", "Địa chỉ"),
            FieldSpec::new("social_media", "Mạng xã hội"),
            FieldSpec::new("source", "Nguồn khách hàng"),
            FieldSpec::new("notes", "Ghi chú"),
            FieldSpec::new("status", "Trạng thái"),
        ])
    }

    /// Column set of the order screen, keyed by order number
    pub fn orders() -> Self {
        let fields = vec![
            FieldSpec::new("order_id", "Mã đơn"),
            FieldSpec::new("customer_id", "Mã khách hàng"),
            FieldSpec::new("order_date", "Ngày đặt hàng"),
            FieldSpec::new("total_amount", "Tổng giá trị").typed(FieldType::NumericCurrency),
            FieldSpec::new("payment_method", "Phương thức thanh toán"),
            FieldSpec::new("status", "Trạng thái"),
        ];

        let mut mapping = Self::assemble(fields);
        mapping.identity_key = Some("order_id".to_string());
        mapping
    }

    pub fn employees() -> Self {
        Self::assemble(vec![
            FieldSpec::new("name", "Tên nhân viên").required(),
            FieldSpec::new("email", "Email"),
            FieldSpec::new("phone", "Số điện thoại"),
            FieldSpec::new("role", "Vai trò"),
            FieldSpec::new("status", "Trạng thái"),
        ])
    }

    /// Column set of the marketing campaign screen
    pub fn campaigns() -> Self {
        Self::assemble(vec![
            FieldSpec::new("name", "Tên chiến dịch").required(),
            FieldSpec::new("type", "Loại chiến dịch"),
            FieldSpec::new("budget", "Ngân sách").typed(FieldType::NumericCurrency),
            FieldSpec::new("start_date", "Ngày bắt đầu"),
            FieldSpec::new("end_date", "Ngày kết thúc"),
            FieldSpec::new("target_audience", "Đối tượng mục tiêu"),
            FieldSpec::new("data_source", "Nguồn dữ liệu"),
            FieldSpec::new("status", "Trạng thái"),
            FieldSpec::new("assignee", "Người phụ trách"),
            FieldSpec::new("expected_kpi", "KPI mong đợi"),
        ])
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldSpec> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.key.as_str())
    }

    pub fn by_key(&self, key: &str) -> Option<&FieldSpec> {
        self.by_key.get(key).map(|&idx| &self.fields[idx])
    }

    pub fn by_label(&self, label: &str) -> Option<&FieldSpec> {
        self.by_label.get(label).map(|&idx| &self.fields[idx])
    }

    /// Display label for a key, or `None` when the key is unmapped
    pub fn label_for(&self, key: &str) -> Option<&str> {
        self.by_key(key).map(|f| f.label.as_str())
    }

    pub fn identity_key(&self) -> Option<&str> {
        self.identity_key.as_deref()
    }

    pub fn locale(&self) -> NumberLocale {
        self.locale
    }
}
