//! Immutable registry configuration.
//!
//! # Responsibility
//! - Hold fee, size, duration and account constants for one registry.
//! - Load overrides from TOML.
//!
//! # Invariants
//! - A `RegistryConfig` handed to `Registry::new` has passed `validate()`.

use crate::model::account::AccountName;
use crate::model::quantity::Symbol;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub const SECONDS_IN_ONE_YEAR: i64 = 60 * 60 * 24 * 365;

/// Errors raised while loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read registry config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse registry config: {err}"),
            Self::Invalid(message) => write!(f, "invalid registry config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

/// Registry constants. Missing TOML keys fall back to [`Default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Account the registry itself receives deposits on.
    pub self_account: AccountName,
    /// Account registration fees are forwarded to.
    pub treasury_account: AccountName,
    pub currency_code: String,
    pub currency_precision: u8,
    /// Whole currency units charged per square meter.
    pub inf_per_sqm: u32,
    /// Maximum parcel side length in meters.
    pub max_land_length_m: u32,
    pub registration_secs: i64,
    /// Exact byte length of an external poly id.
    pub poly_id_len: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            self_account: AccountName::new("infiniverse1").expect("valid default account"),
            treasury_account: AccountName::new("infinicoinio").expect("valid default account"),
            currency_code: "INF".to_string(),
            currency_precision: 4,
            inf_per_sqm: 10,
            max_land_length_m: 100,
            registration_secs: SECONDS_IN_ONE_YEAR,
            poly_id_len: 11,
        }
    }
}

impl RegistryConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.currency_code.is_empty()
            || self.currency_code.len() > 7
            || !self.currency_code.chars().all(|c| c.is_ascii_uppercase())
        {
            return Err(ConfigError::Invalid(format!(
                "currency_code `{}` must be 1-7 uppercase letters",
                self.currency_code
            )));
        }
        if self.currency_precision > 18 {
            return Err(ConfigError::Invalid(
                "currency_precision must be at most 18".to_string(),
            ));
        }
        if self.max_land_length_m == 0 {
            return Err(ConfigError::Invalid(
                "max_land_length_m must be positive".to_string(),
            ));
        }
        if self.registration_secs <= 0 {
            return Err(ConfigError::Invalid(
                "registration_secs must be positive".to_string(),
            ));
        }
        if self.poly_id_len == 0 {
            return Err(ConfigError::Invalid(
                "poly_id_len must be positive".to_string(),
            ));
        }
        if self.self_account == self.treasury_account {
            return Err(ConfigError::Invalid(
                "self_account and treasury_account must differ".to_string(),
            ));
        }
        Ok(())
    }

    pub fn symbol(&self) -> Symbol {
        Symbol::new(self.currency_code.clone(), self.currency_precision)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, RegistryConfig, SECONDS_IN_ONE_YEAR};

    #[test]
    fn defaults_match_registry_constants() {
        let config = RegistryConfig::default();
        config.validate().expect("defaults are valid");
        assert_eq!(config.inf_per_sqm, 10);
        assert_eq!(config.max_land_length_m, 100);
        assert_eq!(config.registration_secs, SECONDS_IN_ONE_YEAR);
        assert_eq!(config.symbol().unit_scale(), Some(10_000));
        assert_eq!(config.treasury_account.as_str(), "infinicoinio");
    }

    #[test]
    fn from_toml_overrides_selected_keys() {
        let config = RegistryConfig::from_toml(
            r#"
            inf_per_sqm = 25
            treasury_account = "treasury"
            "#,
        )
        .expect("valid toml");
        assert_eq!(config.inf_per_sqm, 25);
        assert_eq!(config.treasury_account.as_str(), "treasury");
        assert_eq!(config.max_land_length_m, 100);
    }

    #[test]
    fn from_toml_rejects_bad_accounts_and_unknown_keys() {
        assert!(matches!(
            RegistryConfig::from_toml("treasury_account = \"Not Valid\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            RegistryConfig::from_toml("fee_rate = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn validate_rejects_zero_max_length() {
        let err = RegistryConfig::from_toml("max_land_length_m = 0").expect_err("must fail");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn from_toml_file_reads_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("registry.toml");
        std::fs::write(&path, "registration_secs = 60\n").expect("write config");
        let config = RegistryConfig::from_toml_file(&path).expect("load config");
        assert_eq!(config.registration_secs, 60);
    }
}
