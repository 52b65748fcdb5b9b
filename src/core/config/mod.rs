//! core::config
//!
//! Configuration loading and resolution.
//!
//! # Overview
//!
//! Every input that used to be read ad hoc from the environment is resolved
//! once, up front, into a [`Settings`] value that is passed explicitly to
//! the command handlers.
//!
//! # Repository Path Precedence
//!
//! Highest first:
//! 1. `--repo <PATH>` CLI flag
//! 2. `$LOTUS_MINER_PATH`
//! 3. `repo_path` in the config file
//! 4. `~/<prefix>/.lotusminer`, prefix from `$LOTUS_PATH_PREFIX` or
//!    `path_prefix` in the config file (empty when unset)
//!
//! # Config File Location
//!
//! 1. `$FILMINERCTL_CONFIG` if set
//! 2. `~/.filminerctl/config.toml`
//!
//! A missing file is not an error; defaults apply.
//!
//! # Example
//!
//! ```no_run
//! use filminerctl::core::config::{CliOverrides, Config, EnvVars};
//!
//! let env = EnvVars::from_process();
//! let config = Config::load(&env).unwrap();
//! let settings = config.resolve(&CliOverrides::default(), &env).unwrap();
//! println!("repository: {}", settings.repo_path.display());
//! ```

pub mod schema;

pub use schema::FileConfig;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::address::Network;

/// Repository path variable.
pub const ENV_MINER_PATH: &str = "LOTUS_MINER_PATH";

/// Home sub-directory variable for the default repository path.
pub const ENV_PATH_PREFIX: &str = "LOTUS_PATH_PREFIX";

/// Owner address fallback variable.
pub const ENV_OWNER_ADDRESS: &str = "LOTUS_MINER_OWNER";

/// Config file location variable.
pub const ENV_CONFIG: &str = "FILMINERCTL_CONFIG";

/// Directory name of the default repository.
const DEFAULT_REPO_DIR: &str = ".lotusminer";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found; set {} or pass --repo", ENV_MINER_PATH)]
    NoHomeDir,
}

/// Snapshot of the environment variables this tool reads.
///
/// Captured once in `main` so resolution itself never touches the process
/// environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVars {
    /// `$LOTUS_MINER_PATH`
    pub miner_path: Option<String>,
    /// `$LOTUS_PATH_PREFIX`
    pub path_prefix: Option<String>,
    /// `$LOTUS_MINER_OWNER`
    pub owner_address: Option<String>,
    /// `$FILMINERCTL_CONFIG`
    pub config_path: Option<String>,
    /// Home directory
    pub home: Option<PathBuf>,
}

impl EnvVars {
    /// Capture the current process environment.
    ///
    /// Empty variables count as unset.
    pub fn from_process() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            miner_path: var(ENV_MINER_PATH),
            path_prefix: var(ENV_PATH_PREFIX),
            owner_address: var(ENV_OWNER_ADDRESS),
            config_path: var(ENV_CONFIG),
            home: dirs::home_dir(),
        }
    }
}

/// Values supplied on the command line that take part in resolution.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// `--repo`
    pub repo: Option<PathBuf>,
    /// `--testnet`
    pub testnet: bool,
    /// `--debug`
    pub debug: bool,
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Repository to open.
    pub repo_path: PathBuf,
    /// Owner address fallback, unparsed.
    ///
    /// Only `fix-address` reads it, and parses it there.
    pub owner_address: Option<String>,
    /// Network addresses are rendered for.
    pub network: Network,
    /// Debug logging enabled.
    pub debug: bool,
}

/// Loaded configuration file.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents (defaults when no file was found).
    pub file: FileConfig,
    /// Path the file was loaded from.
    path: Option<PathBuf>,
}

impl Config {
    /// Load the config file from its standard location.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed
    /// or validated. Missing files are not an error.
    pub fn load(env: &EnvVars) -> Result<Self, ConfigError> {
        let Some(path) = Self::config_path(env) else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let file = Self::read_file_config(&path)?;
        file.validate()?;
        tracing::debug!(path = %path.display(), "loaded config file");

        Ok(Self {
            file,
            path: Some(path),
        })
    }

    /// Where the config file is looked up.
    pub fn config_path(env: &EnvVars) -> Option<PathBuf> {
        if let Some(path) = &env.config_path {
            return Some(PathBuf::from(path));
        }
        env.home
            .as_ref()
            .map(|home| home.join(".filminerctl").join("config.toml"))
    }

    fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the path the config was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Resolve the settings for one invocation.
    ///
    /// # Errors
    ///
    /// - `ConfigError::InvalidValue` for a path prefix coming from the
    ///   environment that escapes the home directory
    /// - `ConfigError::NoHomeDir` when the default path is needed but no
    ///   home directory is known
    pub fn resolve(&self, cli: &CliOverrides, env: &EnvVars) -> Result<Settings, ConfigError> {
        let repo_path = self.repo_path(cli, env)?;

        let owner_address = env
            .owner_address
            .clone()
            .or_else(|| self.file.owner_address.clone());

        let network = if cli.testnet {
            Network::Testnet
        } else {
            self.file.network.unwrap_or_default()
        };

        Ok(Settings {
            repo_path,
            owner_address,
            network,
            debug: cli.debug || self.file.debug.unwrap_or(false),
        })
    }

    fn repo_path(&self, cli: &CliOverrides, env: &EnvVars) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &cli.repo {
            return Ok(path.clone());
        }
        if let Some(path) = &env.miner_path {
            return Ok(PathBuf::from(path));
        }
        if let Some(path) = &self.file.repo_path {
            return Ok(path.clone());
        }

        let home = env.home.as_ref().ok_or(ConfigError::NoHomeDir)?;
        let prefix = env
            .path_prefix
            .as_deref()
            .or(self.file.path_prefix.as_deref());

        let mut path = home.clone();
        if let Some(prefix) = prefix {
            schema::validate_path_prefix(prefix)?;
            path.push(prefix);
        }
        path.push(DEFAULT_REPO_DIR);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn env_with_home(home: &Path) -> EnvVars {
        EnvVars {
            home: Some(home.to_path_buf()),
            ..Default::default()
        }
    }

    #[test]
    fn default_repo_path_under_home() {
        let env = env_with_home(Path::new("/home/op"));
        let settings = Config::default()
            .resolve(&CliOverrides::default(), &env)
            .unwrap();

        assert_eq!(settings.repo_path, PathBuf::from("/home/op/.lotusminer"));
        assert_eq!(settings.network, Network::Mainnet);
        assert!(settings.owner_address.is_none());
        assert!(!settings.debug);
    }

    #[test]
    fn path_prefix_from_env() {
        let env = EnvVars {
            path_prefix: Some("filecoin".into()),
            ..env_with_home(Path::new("/home/op"))
        };
        let settings = Config::default()
            .resolve(&CliOverrides::default(), &env)
            .unwrap();

        assert_eq!(
            settings.repo_path,
            PathBuf::from("/home/op/filecoin/.lotusminer")
        );
    }

    #[test]
    fn env_path_prefix_overrides_file() {
        let config = Config {
            file: FileConfig {
                path_prefix: Some("from-file".into()),
                ..Default::default()
            },
            path: None,
        };
        let env = EnvVars {
            path_prefix: Some("from-env".into()),
            ..env_with_home(Path::new("/h"))
        };

        let settings = config.resolve(&CliOverrides::default(), &env).unwrap();
        assert_eq!(settings.repo_path, PathBuf::from("/h/from-env/.lotusminer"));
    }

    #[test]
    fn repo_path_precedence() {
        let config = Config {
            file: FileConfig {
                repo_path: Some(PathBuf::from("/from/file")),
                ..Default::default()
            },
            path: None,
        };
        let mut env = env_with_home(Path::new("/h"));

        let settings = config.resolve(&CliOverrides::default(), &env).unwrap();
        assert_eq!(settings.repo_path, PathBuf::from("/from/file"));

        env.miner_path = Some("/from/env".into());
        let settings = config.resolve(&CliOverrides::default(), &env).unwrap();
        assert_eq!(settings.repo_path, PathBuf::from("/from/env"));

        let cli = CliOverrides {
            repo: Some(PathBuf::from("/from/flag")),
            ..Default::default()
        };
        let settings = config.resolve(&cli, &env).unwrap();
        assert_eq!(settings.repo_path, PathBuf::from("/from/flag"));
    }

    #[test]
    fn no_home_without_explicit_path() {
        let err = Config::default()
            .resolve(&CliOverrides::default(), &EnvVars::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::NoHomeDir));
    }

    #[test]
    fn owner_address_env_overrides_file() {
        let config = Config {
            file: FileConfig {
                owner_address: Some("f01000".into()),
                ..Default::default()
            },
            path: None,
        };
        let mut env = env_with_home(Path::new("/h"));

        let settings = config.resolve(&CliOverrides::default(), &env).unwrap();
        assert_eq!(settings.owner_address.as_deref(), Some("f01000"));

        env.owner_address = Some("f02000".into());
        let settings = config.resolve(&CliOverrides::default(), &env).unwrap();
        assert_eq!(settings.owner_address.as_deref(), Some("f02000"));
    }

    #[test]
    fn malformed_owner_env_is_kept_raw() {
        let env = EnvVars {
            owner_address: Some("garbage".into()),
            ..env_with_home(Path::new("/h"))
        };
        let settings = Config::default()
            .resolve(&CliOverrides::default(), &env)
            .unwrap();
        assert_eq!(settings.owner_address.as_deref(), Some("garbage"));
    }

    #[test]
    fn escaping_env_prefix_rejected() {
        let env = EnvVars {
            path_prefix: Some("../../etc".into()),
            ..env_with_home(Path::new("/h"))
        };
        assert!(Config::default()
            .resolve(&CliOverrides::default(), &env)
            .is_err());
    }

    #[test]
    fn network_and_debug_flags() {
        let config = Config {
            file: FileConfig {
                network: Some(Network::Mainnet),
                debug: Some(true),
                ..Default::default()
            },
            path: None,
        };
        let cli = CliOverrides {
            testnet: true,
            ..Default::default()
        };

        let settings = config
            .resolve(&cli, &env_with_home(Path::new("/h")))
            .unwrap();
        assert_eq!(settings.network, Network::Testnet);
        assert!(settings.debug);
    }

    #[test]
    fn load_missing_file_is_default() {
        let temp = TempDir::new().unwrap();
        let env = env_with_home(temp.path());

        let config = Config::load(&env).unwrap();
        assert!(config.loaded_from().is_none());
        assert_eq!(config.file, FileConfig::default());
    }

    #[test]
    fn load_from_env_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");
        fs::write(&path, "repo_path = \"/srv/miner\"\nnetwork = \"testnet\"\n").unwrap();

        let env = EnvVars {
            config_path: Some(path.display().to_string()),
            ..Default::default()
        };
        let config = Config::load(&env).unwrap();

        assert_eq!(config.loaded_from(), Some(path.as_path()));
        assert_eq!(config.file.network, Some(Network::Testnet));
    }

    #[test]
    fn load_from_home_default_location() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".filminerctl");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), "owner_address = \"f01000\"\n").unwrap();

        let config = Config::load(&env_with_home(temp.path())).unwrap();
        assert_eq!(config.file.owner_address.as_deref(), Some("f01000"));
    }

    #[test]
    fn load_invalid_toml_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.toml");
        fs::write(&path, "repo_path = [unclosed").unwrap();

        let env = EnvVars {
            config_path: Some(path.display().to_string()),
            ..Default::default()
        };
        let err = Config::load(&env).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn load_invalid_value_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.toml");
        fs::write(&path, "path_prefix = \"../outside\"\n").unwrap();

        let env = EnvVars {
            config_path: Some(path.display().to_string()),
            ..Default::default()
        };
        assert!(matches!(
            Config::load(&env),
            Err(ConfigError::InvalidValue(_))
        ));
    }
}
