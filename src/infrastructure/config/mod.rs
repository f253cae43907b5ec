// ============================================================
// MAPPING PROFILES
// ============================================================
// Load field mappings from TOML files

use std::path::Path;

use figment::providers::{Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::domain::csv::{FieldMapping, FieldSpec, NumberLocale};
use crate::domain::error::{ExchangeError, Result};

/// On-disk shape of a mapping profile
///
/// ```toml
/// identity_key = "product_id"
///
/// [number_locale]
/// grouping = "."
/// decimal = ","
///
/// [[fields]]
/// key = "name"
/// label = "Tên sản phẩm"
/// required = true
///
/// [[fields]]
/// key = "price_current"
/// label = "Giá hiện tại"
/// type = "numeric_currency"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingProfile {
    #[serde(default)]
    pub identity_key: Option<String>,

    #[serde(default)]
    pub number_locale: NumberLocale,

    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl MappingProfile {
    /// Validate into an immutable mapping
    pub fn into_mapping(self) -> Result<FieldMapping> {
        let mut mapping = FieldMapping::new(self.fields)?.with_locale(self.number_locale)?;
        if let Some(key) = self.identity_key {
            mapping = mapping.with_identity_key(key)?;
        }
        Ok(mapping)
    }
}

pub struct ConfigService;

impl ConfigService {
    /// Read a mapping profile from a TOML file
    pub fn load_mapping(path: &Path) -> Result<FieldMapping> {
        if !path.is_file() {
            return Err(ExchangeError::ConfigError(format!(
                "mapping profile not found: {}",
                path.display()
            )));
        }

        let profile: MappingProfile = Figment::new()
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| {
                ExchangeError::ConfigError(format!(
                    "invalid mapping profile {}: {}",
                    path.display(),
                    e
                ))
            })?;

        tracing::debug!(
            path = %path.display(),
            fields = profile.fields.len(),
            "Loaded mapping profile"
        );
        profile.into_mapping()
    }

    /// Read a mapping profile from TOML text
    pub fn mapping_from_str(toml: &str) -> Result<FieldMapping> {
        let profile: MappingProfile = Figment::new()
            .merge(Toml::string(toml))
            .extract()
            .map_err(|e| ExchangeError::ConfigError(format!("invalid mapping profile: {}", e)))?;

        profile.into_mapping()
    }
}
