//! core::config::schema
//!
//! Configuration file schema.
//!
//! # Validation
//!
//! Values are validated after parsing: the path prefix must stay inside
//! the home directory. The owner address is kept as written; `fix-address`
//! is its only reader and parses it when used.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::address::Network;

/// Tool configuration file.
///
/// # Example
///
/// ```toml
/// repo_path = "/srv/lotusminer"
/// path_prefix = "filecoin"
/// owner_address = "f01000"
/// network = "mainnet"
/// debug = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Repository location
    pub repo_path: Option<PathBuf>,

    /// Home sub-directory holding the default repository
    pub path_prefix: Option<String>,

    /// Owner address used when `fix-address` is given none
    pub owner_address: Option<String>,

    /// Network addresses are rendered for
    pub network: Option<Network>,

    /// Debug logging default
    pub debug: Option<bool>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(prefix) = &self.path_prefix {
            validate_path_prefix(prefix)?;
        }

        Ok(())
    }
}

/// A path prefix must be relative and free of `..`.
pub(crate) fn validate_path_prefix(prefix: &str) -> Result<(), ConfigError> {
    let escapes = Path::new(prefix)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(ConfigError::InvalidValue(format!(
            "invalid path_prefix '{}': must be a relative path inside the home directory",
            prefix
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let config: FileConfig = toml::from_str(
            r#"
            repo_path = "/srv/miner"
            path_prefix = "filecoin"
            owner_address = "f01000"
            network = "testnet"
            debug = true
            "#,
        )
        .unwrap();

        assert_eq!(config.repo_path, Some(PathBuf::from("/srv/miner")));
        assert_eq!(config.network, Some(Network::Testnet));
        assert_eq!(config.debug, Some(true));
        config.validate().unwrap();
    }

    #[test]
    fn empty_config_is_default() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn unknown_fields_rejected() {
        let result: Result<FileConfig, _> = toml::from_str("miner_path = \"/x\"");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_network_rejected() {
        let result: Result<FileConfig, _> = toml::from_str("network = \"devnet\"");
        assert!(result.is_err());
    }

    #[test]
    fn owner_not_checked_at_load() {
        let config = FileConfig {
            owner_address: Some("not-an-address".into()),
            ..Default::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn escaping_prefix_rejected() {
        assert!(validate_path_prefix("../elsewhere").is_err());
        assert!(validate_path_prefix("/abs").is_err());
        assert!(validate_path_prefix("a/b").is_ok());
    }
}
