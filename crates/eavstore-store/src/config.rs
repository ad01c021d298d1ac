//! Store configuration
//!
//! Loaded from a TOML file or from `EAVSTORE_*` environment variables:
//!
//! ```toml
//! database = "eav.db"
//! foreign_keys = true
//! journal_mode = "WAL"
//! unparsable_values = "store_missing"
//! ```

use eavstore_core::errors::{ExError, ExErrorKind};
use eavstore_core::UnparsablePolicy;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::errors::{io_error, Result};

pub const ENV_DATABASE: &str = "EAVSTORE_DATABASE";
pub const ENV_FOREIGN_KEYS: &str = "EAVSTORE_FOREIGN_KEYS";
pub const ENV_UNPARSABLE_VALUES: &str = "EAVSTORE_UNPARSABLE_VALUES";

/// Path that selects an in-memory database
pub const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{var} must be {expected}, got '{value}'")]
    BadEnv {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl From<ConfigError> for ExError {
    fn from(err: ConfigError) -> Self {
        ExError::new(ExErrorKind::InvalidInput)
            .with_op("load_config")
            .with_message(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Database file path, or `:memory:`
    pub database: String,

    /// Enforce REFERENCES clauses (`PRAGMA foreign_keys`)
    pub foreign_keys: bool,

    /// `PRAGMA journal_mode` for file databases
    pub journal_mode: String,

    /// Policy for caller text that does not parse as the attribute's type
    pub unparsable_values: UnparsablePolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: IN_MEMORY.to_string(),
            foreign_keys: true,
            journal_mode: "WAL".to_string(),
            unparsable_values: UnparsablePolicy::default(),
        }
    }
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn is_in_memory(&self) -> bool {
        self.database == IN_MEMORY
    }

    /// Parse a TOML document; absent keys take their defaults
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ConfigError::from(e).into())
    }

    /// # Errors
    ///
    /// Returns `Io` when the file cannot be read, `InvalidInput` when it does
    /// not parse.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| io_error("load_config", e))?;
        Self::from_toml_str(&text)
    }

    /// Read `EAVSTORE_*` variables over the defaults
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when a variable is set to an unusable value.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(database) = var(ENV_DATABASE) {
            config.database = database;
        }

        if let Some(value) = var(ENV_FOREIGN_KEYS) {
            config.foreign_keys = match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => true,
                "0" | "false" | "off" | "no" => false,
                _ => {
                    return Err(ConfigError::BadEnv {
                        var: ENV_FOREIGN_KEYS,
                        expected: "a boolean",
                        value,
                    }
                    .into())
                }
            };
        }

        if let Some(value) = var(ENV_UNPARSABLE_VALUES) {
            config.unparsable_values = match value.as_str() {
                "store_missing" => UnparsablePolicy::StoreMissing,
                "reject" => UnparsablePolicy::Reject,
                _ => {
                    return Err(ConfigError::BadEnv {
                        var: ENV_UNPARSABLE_VALUES,
                        expected: "store_missing or reject",
                        value,
                    }
                    .into())
                }
            };
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert!(config.is_in_memory());
        assert!(config.foreign_keys);
        assert_eq!(config.journal_mode, "WAL");
        assert_eq!(config.unparsable_values, UnparsablePolicy::StoreMissing);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = StoreConfig::from_toml_str("database = \"eav.db\"\n").unwrap();
        assert_eq!(config.database, "eav.db");
        assert!(config.foreign_keys);
    }

    #[test]
    fn test_toml_policy_spelling() {
        let config = StoreConfig::from_toml_str("unparsable_values = \"reject\"").unwrap();
        assert_eq!(config.unparsable_values, UnparsablePolicy::Reject);
    }

    #[test]
    fn test_unknown_toml_key_rejected() {
        let err = StoreConfig::from_toml_str("databse = \"typo.db\"").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    }

    #[test]
    fn test_env_overrides() {
        let config = StoreConfig::from_vars(vars(&[
            (ENV_DATABASE, "/tmp/eav.db"),
            (ENV_FOREIGN_KEYS, "off"),
            (ENV_UNPARSABLE_VALUES, "reject"),
        ]))
        .unwrap();
        assert_eq!(config.database, "/tmp/eav.db");
        assert!(!config.foreign_keys);
        assert_eq!(config.unparsable_values, UnparsablePolicy::Reject);
    }

    #[test]
    fn test_bad_env_value() {
        let err = StoreConfig::from_vars(vars(&[(ENV_FOREIGN_KEYS, "sometimes")])).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
        assert!(err.message().contains(ENV_FOREIGN_KEYS));
    }
}
