//! Engine configuration.
//!
//! Defaults match the behaviour of the payment forms; each value can be
//! overridden through environment variables, optionally loaded from a
//! `.env` file.

use std::env;
use std::path::Path;

use crate::error::ConfigError;
use crate::utils::logging::{LogFormat, LOG_FORMAT_ENV};

pub const UNSUPPORTED_CARD_DIGITS_ENV: &str = "FORMGUARD_UNSUPPORTED_CARD_DIGITS";
pub const EXPIRY_YEAR_PREFIX_ENV: &str = "FORMGUARD_EXPIRY_YEAR_PREFIX";

/// Tunables of the validation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Digits an unrecognised card number may have before it is reported
    /// as not allowed.
    pub unsupported_card_digits: usize,
    /// Century prefix joined to two-digit expiry years.
    pub expiry_year_prefix: String,
    pub log_format: LogFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            unsupported_card_digits: 5,
            expiry_year_prefix: "20".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl EngineConfig {
    /// Reads overrides from the process environment after loading `.env`
    /// from the working directory, if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads the given env file into the process environment, then reads
    /// overrides from it.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenv::from_path(path.as_ref()).map_err(|e| ConfigError::EnvFile(e.to_string()))?;
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; unset keys keep their
    /// defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(UNSUPPORTED_CARD_DIGITS_ENV) {
            config.unsupported_card_digits =
                raw.trim()
                    .parse::<usize>()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: UNSUPPORTED_CARD_DIGITS_ENV,
                        value: raw.clone(),
                    })?;
        }

        if let Some(raw) = lookup(EXPIRY_YEAR_PREFIX_ENV) {
            let prefix = raw.trim();
            if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_digit()) {
                return Err(ConfigError::InvalidValue {
                    key: EXPIRY_YEAR_PREFIX_ENV,
                    value: raw,
                });
            }
            config.expiry_year_prefix = prefix.to_string();
        }

        if let Some(raw) = lookup(LOG_FORMAT_ENV) {
            config.log_format = LogFormat::parse(&raw).ok_or(ConfigError::InvalidValue {
                key: LOG_FORMAT_ENV,
                value: raw.clone(),
            })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn unset_keys_keep_defaults() {
        let config = EngineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            (UNSUPPORTED_CARD_DIGITS_ENV, "8"),
            (EXPIRY_YEAR_PREFIX_ENV, "21"),
            (LOG_FORMAT_ENV, "json"),
        ]))
        .unwrap();
        assert_eq!(config.unsupported_card_digits, 8);
        assert_eq!(config.expiry_year_prefix, "21");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_digit_threshold_is_rejected() {
        let err = EngineConfig::from_lookup(lookup_from(&[(UNSUPPORTED_CARD_DIGITS_ENV, "five")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: UNSUPPORTED_CARD_DIGITS_ENV,
                value: "five".to_string(),
            }
        );
    }

    #[test]
    fn non_numeric_year_prefix_is_rejected() {
        assert!(EngineConfig::from_lookup(lookup_from(&[(EXPIRY_YEAR_PREFIX_ENV, "2x")])).is_err());
        assert!(EngineConfig::from_lookup(lookup_from(&[(EXPIRY_YEAR_PREFIX_ENV, "")])).is_err());
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        assert!(EngineConfig::from_lookup(lookup_from(&[(LOG_FORMAT_ENV, "xml")])).is_err());
    }
}
