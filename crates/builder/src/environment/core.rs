//! Core `BuildEnvironment` struct and construction

use super::toolchain::{detect_cmake, CmakeTool};
use super::variables;
use depbuild_config::Config;
use depbuild_errors::Error;
use depbuild_events::{AppEvent, BuildEvent, EventEmitter, EventSender};
use depbuild_platform::ProcessOperations;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Everything a package build needs to know about where and how to build
///
/// Built once before the first package and never mutated afterwards.
#[derive(Clone, Debug)]
pub struct BuildEnvironment {
    build_dir: PathBuf,
    prefix: PathBuf,
    compiler_flags: String,
    linker_flags: String,
    env_vars: BTreeMap<String, String>,
    make: String,
    cmake: CmakeTool,
}

impl BuildEnvironment {
    /// Assemble an environment from configuration without touching the disk
    ///
    /// `inherited` is the environment the child processes would otherwise
    /// see; the build variables are laid over it. The SDK flag is added only
    /// when the SDK directory exists under the root.
    #[must_use]
    pub fn new<I>(config: &Config, inherited: I, cmake: CmakeTool) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let build_dir = config.build_dir();
        let prefix = config.prefix_dir();

        let sdk = config.sdk_path();
        let common = variables::common_flags(
            &config.toolchain.macos_min_version,
            sdk.is_dir().then_some(sdk.as_path()),
        );
        let compiler_flags = variables::compiler_flags(&common, &prefix.join("include"));
        let linker_flags =
            variables::linker_flags(&common, &prefix.join("lib"), &config.toolchain.frameworks);
        let env_vars = variables::child_environment(
            inherited,
            &prefix.join("bin"),
            &compiler_flags,
            &linker_flags,
        );

        Self {
            build_dir,
            prefix,
            compiler_flags,
            linker_flags,
            env_vars,
            make: config.toolchain.make.clone(),
            cmake,
        }
    }

    /// Prepare the environment for a real run
    ///
    /// Creates the build directory and the prefix layout, inherits the
    /// current process environment and settles on a CMake: the configured
    /// one if any, else whatever [`detect_cmake`] finds.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the directories cannot be created.
    pub async fn prepare(
        config: &Config,
        runner: &dyn ProcessOperations,
        tx: &EventSender,
    ) -> Result<Self, Error> {
        let cmake = match &config.toolchain.cmake {
            Some(configured) => CmakeTool::Detected(configured.clone()),
            None => detect_cmake(runner).await,
        };

        tx.emit(AppEvent::Build(BuildEvent::ToolchainDetected {
            tool: "cmake".to_string(),
            path: match &cmake {
                CmakeTool::Detected(path) => Some(path.clone()),
                CmakeTool::Bootstrap => None,
            },
        }));

        let inherited = std::env::vars_os().filter_map(|(key, value)| {
            Some((key.into_string().ok()?, value.into_string().ok()?))
        });
        let env = Self::new(config, inherited, cmake);
        env.create_directories().await?;

        info!(
            build_dir = %env.build_dir.display(),
            prefix = %env.prefix.display(),
            "build environment ready"
        );
        debug!(cflags = %env.compiler_flags, ldflags = %env.linker_flags, "compiler flags");

        Ok(env)
    }

    /// Create the build directory and `<prefix>/{bin,include,lib}`
    ///
    /// # Errors
    ///
    /// Returns an error naming the first directory that cannot be created.
    pub async fn create_directories(&self) -> Result<(), Error> {
        for dir in [
            self.build_dir.clone(),
            self.bin_dir(),
            self.include_dir(),
            self.lib_dir(),
        ] {
            fs::create_dir_all(&dir)
                .await
                .map_err(|e| Error::io_with_path(&e, &dir))?;
        }
        Ok(())
    }

    /// Directory holding downloaded archives and extracted trees
    #[must_use]
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Install prefix shared by all packages
    #[must_use]
    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    #[must_use]
    pub fn bin_dir(&self) -> PathBuf {
        self.prefix.join("bin")
    }

    #[must_use]
    pub fn include_dir(&self) -> PathBuf {
        self.prefix.join("include")
    }

    #[must_use]
    pub fn lib_dir(&self) -> PathBuf {
        self.prefix.join("lib")
    }

    /// Value of `CPPFLAGS`, `CFLAGS`, `CXXFLAGS`, `OBJCFLAGS` and `OBJCXXFLAGS`
    #[must_use]
    pub fn compiler_flags(&self) -> &str {
        &self.compiler_flags
    }

    /// Value of `LDFLAGS`
    #[must_use]
    pub fn linker_flags(&self) -> &str {
        &self.linker_flags
    }

    /// Complete environment handed to every build command
    #[must_use]
    pub fn env_vars(&self) -> &BTreeMap<String, String> {
        &self.env_vars
    }

    #[must_use]
    pub fn make(&self) -> &str {
        &self.make
    }

    #[must_use]
    pub fn cmake(&self) -> &CmakeTool {
        &self.cmake
    }

    /// Whether CMake has to be built before anything else
    #[must_use]
    pub fn needs_cmake_bootstrap(&self) -> bool {
        self.cmake.needs_bootstrap()
    }
}
