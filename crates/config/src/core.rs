//! Configuration sections

use crate::constants;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the build and prefix trees live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root under which `build_<platform>_dependencies` and
    /// `dependencies_<platform>` are created. Defaults to the working directory.
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default = "default_platform")]
    pub platform: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: None,
            platform: default_platform(),
        }
    }
}

/// Compiler and tool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainConfig {
    #[serde(default = "default_macos_min_version")]
    pub macos_min_version: String,
    #[serde(default = "default_make")]
    pub make: String,
    /// Explicit CMake executable; auto-detected when unset
    #[serde(default)]
    pub cmake: Option<String>,
    #[serde(default = "default_frameworks")]
    pub frameworks: Vec<String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            macos_min_version: default_macos_min_version(),
            make: default_make(),
            cmake: None,
            frameworks: default_frameworks(),
        }
    }
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64, // seconds
    /// Identity for the first attempt; the client default when unset
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default = "default_browser_user_agent")]
    pub browser_user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            user_agent: None,
            browser_user_agent: default_browser_user_agent(),
        }
    }
}

// Default value functions for serde
fn default_platform() -> String {
    constants::DEFAULT_PLATFORM.to_string()
}

fn default_macos_min_version() -> String {
    constants::DEFAULT_MACOS_MIN_VERSION.to_string()
}

fn default_make() -> String {
    constants::DEFAULT_MAKE.to_string()
}

fn default_frameworks() -> Vec<String> {
    constants::DEFAULT_FRAMEWORKS
        .iter()
        .map(|f| (*f).to_string())
        .collect()
}

fn default_timeout() -> u64 {
    600 // source tarballs can be large
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_browser_user_agent() -> String {
    constants::BROWSER_USER_AGENT.to_string()
}
