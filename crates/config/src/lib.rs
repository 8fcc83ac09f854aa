#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for depbuild
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (`--config <PATH>` or `./depbuild.toml`)
//! - Environment variables (`DEPBUILD_*`)
//! - CLI flags (applied by the binary)

pub mod constants;
pub mod core;

pub use crate::core::{NetworkConfig, PathsConfig, ToolchainConfig};

use depbuild_errors::{ConfigError, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub toolchain: ToolchainConfig,

    #[serde(default)]
    pub network: NetworkConfig,
}

impl Config {
    /// Get the default config file path (`depbuild.toml` in the working directory)
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathBuf::from(constants::CONFIG_FILE_NAME)
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::ReadError {
                path: path.display().to_string(),
                message: e.to_string(),
            },
        })?;

        debug!(path = %path.display(), "loaded configuration file");

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path();

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// An explicitly given path must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        self.merge_env_from(|key| std::env::var(key).ok())
    }

    /// Merge values produced by an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an empty or unparsable value.
    pub fn merge_env_from<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| -> Result<Option<String>, Error> {
            match lookup(key) {
                Some(value) if value.trim().is_empty() => Err(ConfigError::InvalidValue {
                    field: key.to_string(),
                    value,
                }
                .into()),
                other => Ok(other),
            }
        };

        if let Some(root) = non_empty(constants::ENV_ROOT)? {
            self.paths.root = Some(PathBuf::from(root));
        }

        if let Some(version) = non_empty(constants::ENV_MACOS_MIN_VERSION)? {
            self.toolchain.macos_min_version = version;
        }

        if let Some(make) = non_empty(constants::ENV_MAKE)? {
            self.toolchain.make = make;
        }

        if let Some(cmake) = non_empty(constants::ENV_CMAKE)? {
            self.toolchain.cmake = Some(cmake);
        }

        if let Some(timeout) = non_empty(constants::ENV_NETWORK_TIMEOUT)? {
            self.network.timeout = timeout.parse().map_err(|_| ConfigError::InvalidValue {
                field: constants::ENV_NETWORK_TIMEOUT.to_string(),
                value: timeout,
            })?;
        }

        Ok(())
    }

    /// Absolute root directory, defaulting to the working directory
    ///
    /// Relative roots are resolved against the working directory once here;
    /// `tar` and `configure` run in other directories and need absolute paths.
    #[must_use]
    pub fn root_path(&self) -> PathBuf {
        let root = self.paths.root.clone().unwrap_or_default();
        if root.is_absolute() {
            return root;
        }
        match std::env::current_dir() {
            Ok(cwd) if root.as_os_str().is_empty() || root == Path::new(".") => cwd,
            Ok(cwd) => cwd.join(root),
            Err(_) => root,
        }
    }

    /// Directory that holds downloads and extracted source trees
    #[must_use]
    pub fn build_dir(&self) -> PathBuf {
        self.root_path()
            .join(format!("build_{}_dependencies", self.paths.platform))
    }

    /// Install prefix handed to every `configure`/`cmake` invocation
    #[must_use]
    pub fn prefix_dir(&self) -> PathBuf {
        self.root_path()
            .join(format!("dependencies_{}", self.paths.platform))
    }

    /// SDK used as `-isysroot` when present
    #[must_use]
    pub fn sdk_path(&self) -> PathBuf {
        self.root_path()
            .join(format!("MacOSX{}.sdk", self.toolchain.macos_min_version))
    }
}
